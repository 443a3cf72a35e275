//! Query result types
//!
//! Built per query and discarded; nothing here is persisted.

use atlas_common::ArtistId;
use serde::Serialize;
use uuid::Uuid;

use super::buckets::TasteBuckets;
use crate::cold_start::{SeedPartition, SeedResolution, SeedState};
use crate::geo::GeoLabel;
use crate::labels::MacroTag;
use crate::structure::EdgeTypeSet;
use crate::tag_cloud::CloudTag;

/// One recommended artist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub artist_id: ArtistId,
    /// Max taste similarity to any supporting seed
    pub base_score: f32,
    /// Rerank nudge; 0 when reranking is off
    pub structure_boost: f32,
    pub final_score: f32,
    pub seed_support_count: usize,
    pub supporting_seed_ids: Vec<ArtistId>,
    /// Structure types connecting the candidate to any taste-enabled seed
    pub reasons: EdgeTypeSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoLabel>,
}

/// Context surfaced for one requested seed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedReport {
    pub requested: ArtistId,
    pub canonical: Option<ArtistId>,
    pub state: SeedState,
    pub identity_labels: Vec<MacroTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoLabel>,
}

impl SeedReport {
    pub fn bare(resolution: &SeedResolution) -> Self {
        Self {
            requested: resolution.requested,
            canonical: resolution.canonical,
            state: resolution.state,
            identity_labels: Vec::new(),
            geo: None,
        }
    }
}

/// Seed counts by state.
///
/// Resolved seeds are counted once per canonical artist, so a seed and a
/// redirect to it count as one. Unresolved seeds are counted per distinct
/// requested id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub taste_enabled: usize,
    pub context_only: usize,
    pub unresolved: usize,
}

impl SeedSummary {
    pub fn tally(partition: &SeedPartition) -> Self {
        Self {
            taste_enabled: partition.taste_enabled.len(),
            context_only: partition.context_only.len(),
            unresolved: partition.unresolved.len(),
        }
    }
}

/// Complete answer to one `retrieve` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub query_id: Uuid,
    pub snapshot_version: Uuid,
    pub candidates: Vec<ScoredCandidate>,
    pub seeds: Vec<SeedReport>,
    pub seed_summary: SeedSummary,
    /// Labels of the ranked candidate set, not of any single artist
    pub exploration_labels: Vec<MacroTag>,
    pub tag_cloud: Vec<CloudTag>,
    /// Final candidates grouped under the seeds' dominant tags
    pub buckets: TasteBuckets,
    pub reranked: bool,
    /// Some per-seed lookups did not finish within the query budget
    pub partial: bool,
}
