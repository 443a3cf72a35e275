//! Macro Tag Labeler
//!
//! Two modes share the filtering primitives in [`TagFilter`] but never share
//! scores:
//! - **Identity** ([`identity`]): seed-centric, stable "this artist is…"
//!   description from the artist's own profile.
//! - **Exploration** ([`exploration`]): set-centric lift over a candidate set;
//!   permissive and never an identity claim about one artist.
//!
//! Labels are derived per query and never stored.

pub mod exploration;
pub mod identity;

use atlas_common::config::LabelConfig;
use atlas_common::ArtistId;
use serde::Serialize;
use uuid::Uuid;

use crate::tags::{TagFilter, TagProfile, TagProfileIndex, TagReferenceIndex};

/// Which mode produced a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Identity,
    Exploration,
}

/// What a label describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum LabelSubject {
    Artist(ArtistId),
    /// Candidate set of one query
    CandidateSet(Uuid),
}

/// Query-time macro tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroTag {
    pub subject: LabelSubject,
    pub tag: String,
    pub score: f32,
    /// Identity only: `score / top score`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay: Option<f32>,
    pub kind: LabelKind,
}

/// Both labeler modes with their configuration
#[derive(Debug, Clone)]
pub struct MacroTagLabeler {
    filter: TagFilter,
    identity_top: usize,
    exploration_top: usize,
    min_coverage: usize,
    set_size: usize,
}

impl MacroTagLabeler {
    pub fn new(filter: TagFilter, config: &LabelConfig) -> Self {
        Self {
            filter,
            identity_top: config.identity_top,
            exploration_top: config.exploration_top,
            min_coverage: config.exploration_min_coverage,
            set_size: config.exploration_set_size,
        }
    }

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    /// Maximum candidates fed to exploration mode
    pub fn exploration_set_size(&self) -> usize {
        self.set_size
    }

    pub fn identity(&self, profile: &TagProfile, refs: &TagReferenceIndex) -> Vec<MacroTag> {
        identity::identity_labels(profile, refs, &self.filter, self.identity_top)
    }

    /// Exploration labels over the first `exploration_set_size` members
    pub fn exploration(
        &self,
        set_id: Uuid,
        members: &[ArtistId],
        profiles: &TagProfileIndex,
        refs: &TagReferenceIndex,
    ) -> Vec<MacroTag> {
        let members = &members[..members.len().min(self.set_size)];
        exploration::exploration_labels(
            set_id,
            members,
            profiles,
            refs,
            &self.filter,
            self.min_coverage,
            self.exploration_top,
        )
    }
}
