//! Cold-Start Resolver
//!
//! Classifies each seed before retrieval:
//! - `TasteEnabled`: the seed (or its canonical id) is a taste graph source
//! - `ContextOnly`: canonical mapping succeeds but the artist has no taste
//!   edges; it contributes identity labels and geo, never candidates
//! - `Unresolved`: canonical mapping fails; excluded from everything

use atlas_common::ArtistId;
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

use crate::identity::CanonicalResolver;
use crate::taste::TasteGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedState {
    TasteEnabled,
    ContextOnly,
    Unresolved,
}

/// Outcome of resolving one requested seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedResolution {
    pub requested: ArtistId,
    pub canonical: Option<ArtistId>,
    pub state: SeedState,
}

/// Seeds split by state, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedPartition {
    pub resolutions: Vec<SeedResolution>,
    /// Canonical ids of taste-enabled seeds, deduplicated
    pub taste_enabled: Vec<ArtistId>,
    /// Canonical ids of context-only seeds, deduplicated
    pub context_only: Vec<ArtistId>,
    pub unresolved: Vec<ArtistId>,
}

impl SeedPartition {
    /// Resolved canonical ids: taste-enabled first, then context-only
    pub fn resolved(&self) -> impl Iterator<Item = ArtistId> + '_ {
        self.taste_enabled.iter().chain(self.context_only.iter()).copied()
    }
}

pub struct ColdStartResolver<'a> {
    identity: &'a dyn CanonicalResolver,
    taste: &'a TasteGraph,
}

impl<'a> ColdStartResolver<'a> {
    pub fn new(identity: &'a dyn CanonicalResolver, taste: &'a TasteGraph) -> Self {
        Self { identity, taste }
    }

    pub fn resolve(&self, seed: ArtistId) -> SeedResolution {
        if self.taste.is_source(seed) {
            return SeedResolution {
                requested: seed,
                canonical: Some(seed),
                state: SeedState::TasteEnabled,
            };
        }

        match self.identity.canonicalize(seed) {
            None => SeedResolution {
                requested: seed,
                canonical: None,
                state: SeedState::Unresolved,
            },
            Some(canonical) if self.taste.is_source(canonical) => SeedResolution {
                requested: seed,
                canonical: Some(canonical),
                state: SeedState::TasteEnabled,
            },
            Some(canonical) => SeedResolution {
                requested: seed,
                canonical: Some(canonical),
                state: SeedState::ContextOnly,
            },
        }
    }

    /// Deduplicate (first occurrence wins) and classify every seed
    pub fn partition(&self, seeds: &[ArtistId]) -> SeedPartition {
        let mut requested_seen = HashSet::new();
        let mut canonical_seen = HashSet::new();
        let mut partition = SeedPartition::default();

        for &seed in seeds {
            if !requested_seen.insert(seed) {
                continue;
            }
            let resolution = self.resolve(seed);
            match (resolution.state, resolution.canonical) {
                (SeedState::TasteEnabled, Some(id)) if canonical_seen.insert(id) => {
                    partition.taste_enabled.push(id)
                }
                (SeedState::ContextOnly, Some(id)) if canonical_seen.insert(id) => {
                    warn!(artist_id = %id, "Seed has no taste edges, using context only");
                    partition.context_only.push(id)
                }
                (SeedState::Unresolved, _) => {
                    warn!(artist_id = %seed, "Seed could not be resolved");
                    partition.unresolved.push(seed)
                }
                _ => {}
            }
            partition.resolutions.push(resolution);
        }
        partition
    }
}
