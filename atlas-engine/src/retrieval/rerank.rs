//! Structure rerank and final list assembly
//!
//! `boost = max(type_weight over reasons)`; types never stack.
//! `final = min(1, base + boost)`. Because the boost is additive and capped
//! at the largest type weight, a candidate can only overtake another whose
//! base score is less than that weight ahead of it.

use atlas_common::config::PerTypeWeights;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::merge::MergedCandidate;
use super::result::ScoredCandidate;
use crate::structure::EdgeTypeSet;
use crate::tags::TagProfileIndex;

pub struct Reranker<'a> {
    weights: &'a PerTypeWeights,
    enabled: bool,
}

impl<'a> Reranker<'a> {
    pub fn new(weights: &'a PerTypeWeights, enabled: bool) -> Self {
        Self { weights, enabled }
    }

    pub fn boost(&self, reasons: EdgeTypeSet) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        reasons
            .strongest(self.weights)
            .map(|(_, weight)| weight)
            .unwrap_or(0.0)
    }

    /// Score and sort: final desc, support count desc, artist id asc
    pub fn rank(&self, merged: Vec<MergedCandidate>) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = merged
            .into_iter()
            .map(|m| {
                let structure_boost = self.boost(m.reasons);
                ScoredCandidate {
                    artist_id: m.artist_id,
                    base_score: m.base_score,
                    structure_boost,
                    final_score: (m.base_score + structure_boost).min(1.0),
                    seed_support_count: m.supporting_seeds.len(),
                    supporting_seed_ids: m.supporting_seeds.into_iter().collect(),
                    reasons: m.reasons,
                    geo: None,
                }
            })
            .collect();
        scored.sort_by(ranking_order);
        scored
    }
}

fn ranking_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.final_score
        .total_cmp(&a.final_score)
        .then(b.seed_support_count.cmp(&a.seed_support_count))
        .then(a.artist_id.cmp(&b.artist_id))
}

/// Take the first `limit` ranked candidates, optionally skipping any whose
/// primary tag is already held by `max_per_primary_tag` kept candidates.
/// Never reorders.
pub fn assemble_final(
    ranked: &[ScoredCandidate],
    limit: usize,
    max_per_primary_tag: Option<usize>,
    profiles: &TagProfileIndex,
) -> Vec<ScoredCandidate> {
    let mut per_tag: HashMap<&str, usize> = HashMap::new();
    let mut kept = Vec::with_capacity(limit.min(ranked.len()));

    for candidate in ranked {
        if kept.len() >= limit {
            break;
        }
        if let Some(max) = max_per_primary_tag {
            let primary = profiles
                .get(candidate.artist_id)
                .and_then(|p| p.primary_tag());
            if let Some(tag) = primary {
                let seen = per_tag.entry(tag).or_insert(0);
                if *seen >= max {
                    continue;
                }
                *seen += 1;
            }
        }
        kept.push(candidate.clone());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::EdgeType;
    use crate::tags::{TagEntry, TagProfile};
    use atlas_common::ArtistId;
    use std::collections::BTreeSet;

    fn merged(id: u64, base: f32, seeds: &[u64], reasons: &[EdgeType]) -> MergedCandidate {
        MergedCandidate {
            artist_id: ArtistId(id),
            base_score: base,
            supporting_seeds: seeds.iter().map(|s| ArtistId(*s)).collect::<BTreeSet<_>>(),
            reasons: reasons.iter().copied().collect(),
        }
    }

    #[test]
    fn test_boosts_do_not_stack() {
        let weights = PerTypeWeights::default();
        let ranked = Reranker::new(&weights, true)
            .rank(vec![merged(5, 0.30, &[1], &[EdgeType::Members, EdgeType::Labels])]);

        assert_eq!(ranked[0].structure_boost, 0.15);
        assert!((ranked[0].final_score - ranked[0].base_score - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_final_score_is_capped_at_one() {
        let weights = PerTypeWeights::default();
        let ranked = Reranker::new(&weights, true).rank(vec![merged(5, 0.95, &[1], &[EdgeType::Credits])]);
        assert_eq!(ranked[0].final_score, 1.0);
    }

    #[test]
    fn test_disabled_rerank_keeps_reasons() {
        let weights = PerTypeWeights::default();
        let ranked = Reranker::new(&weights, false).rank(vec![merged(5, 0.4, &[1], &[EdgeType::Members])]);
        assert_eq!(ranked[0].structure_boost, 0.0);
        assert_eq!(ranked[0].final_score, 0.4);
        assert!(ranked[0].reasons.contains(EdgeType::Members));
    }

    #[test]
    fn test_ties_break_on_support_then_id() {
        let weights = PerTypeWeights::default();
        let ranked = Reranker::new(&weights, true).rank(vec![
            merged(9, 0.5, &[1], &[]),
            merged(8, 0.5, &[1], &[]),
            merged(7, 0.5, &[1, 2], &[]),
        ]);
        let ids: Vec<u64> = ranked.iter().map(|c| c.artist_id.0).collect();
        assert_eq!(ids, vec![7, 8, 9]);
    }

    #[test]
    fn test_primary_tag_cap_skips_without_reordering() {
        let mut profiles = TagProfileIndex::default();
        for (id, tag) in [(1, "djent"), (2, "djent"), (3, "djent"), (4, "ambient")] {
            profiles.insert(TagProfile::from_entries(
                ArtistId(id),
                vec![TagEntry {
                    name: tag.to_string(),
                    count: 1,
                    weight: 1.0,
                    rank: 0,
                }],
            ));
        }
        let weights = PerTypeWeights::default();
        let ranked = Reranker::new(&weights, true).rank(vec![
            merged(1, 0.9, &[9], &[]),
            merged(2, 0.8, &[9], &[]),
            merged(3, 0.7, &[9], &[]),
            merged(4, 0.6, &[9], &[]),
        ]);

        let capped = assemble_final(&ranked, 3, Some(2), &profiles);
        let ids: Vec<u64> = capped.iter().map(|c| c.artist_id.0).collect();
        assert_eq!(ids, vec![1, 2, 4]);

        let plain = assemble_final(&ranked, 3, None, &profiles);
        assert_eq!(plain.len(), 3);
        assert_eq!(plain[2].artist_id, ArtistId(3));
    }
}
