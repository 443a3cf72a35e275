//! Deterministic merge of per-seed contributions
//!
//! Max similarity and set union are order-independent, and contributions are
//! sorted by seed before anything is accumulated, so completion order of the
//! per-seed tasks never shows in the output.

use atlas_common::ArtistId;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::structure::EdgeTypeSet;
use crate::taste::TasteEdge;

/// What one taste-enabled seed's lookup produced
#[derive(Debug, Clone)]
pub struct SeedContribution {
    pub seed: ArtistId,
    /// Outgoing taste edges of the seed
    pub neighbors: Vec<TasteEdge>,
    /// Undirected structure neighbors of the seed
    pub structure: BTreeMap<ArtistId, EdgeTypeSet>,
}

/// Candidate after dedup, before scoring
#[derive(Debug, Clone, PartialEq)]
pub struct MergedCandidate {
    pub artist_id: ArtistId,
    pub base_score: f32,
    pub supporting_seeds: BTreeSet<ArtistId>,
    pub reasons: EdgeTypeSet,
}

/// Union taste candidates across seeds, ascending by artist id.
///
/// Artists in `exclude` (the seeds themselves) never become candidates.
/// Reasons are gathered from every contribution, not only supporting seeds.
pub fn merge_contributions(
    mut contributions: Vec<SeedContribution>,
    exclude: &HashSet<ArtistId>,
) -> Vec<MergedCandidate> {
    contributions.sort_by_key(|c| c.seed);

    let mut pool: BTreeMap<ArtistId, MergedCandidate> = BTreeMap::new();
    for contribution in &contributions {
        for edge in &contribution.neighbors {
            if exclude.contains(&edge.dst) {
                continue;
            }
            let candidate = pool.entry(edge.dst).or_insert_with(|| MergedCandidate {
                artist_id: edge.dst,
                base_score: 0.0,
                supporting_seeds: BTreeSet::new(),
                reasons: EdgeTypeSet::empty(),
            });
            candidate.base_score = candidate.base_score.max(edge.similarity);
            candidate.supporting_seeds.insert(contribution.seed);
        }
    }

    for candidate in pool.values_mut() {
        for contribution in &contributions {
            if let Some(types) = contribution.structure.get(&candidate.artist_id) {
                candidate.reasons = candidate.reasons.union(*types);
            }
        }
    }

    pool.into_values().collect()
}
