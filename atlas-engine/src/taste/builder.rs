//! Offline taste graph construction
//!
//! Tags are interned to dense ids (name order) and each profile is stored as a
//! tag-id-sorted slice so pair scoring is a linear merge. Per-artist neighbor
//! selection is independent across artists and runs on the rayon pool; results
//! are collected in artist-id order, so the output never depends on scheduling.

use atlas_common::config::TasteConfig;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

use super::graph::{neighbor_order, TasteEdge, TasteGraph};
use super::similarity::jaccard_sorted;
use crate::error::BuildError;
use crate::tags::{TagProfileIndex, TagReferenceIndex};
use crate::topk::top_k_by;

/// How many carriers each tag contributed to pairing
#[derive(Debug, Clone, Default)]
pub struct HubReport {
    considered: HashMap<String, usize>,
    capped_tags: usize,
}

impl HubReport {
    pub fn from_considered(considered: HashMap<String, usize>, capped_tags: usize) -> Self {
        Self {
            considered,
            capped_tags,
        }
    }

    /// Artists paired under `tag` (0 for unknown tags)
    pub fn considered(&self, tag: &str) -> usize {
        self.considered.get(tag).copied().unwrap_or(0)
    }

    /// Tags whose carrier list was truncated
    pub fn capped_tags(&self) -> usize {
        self.capped_tags
    }

    pub fn max_considered(&self) -> usize {
        self.considered.values().copied().max().unwrap_or(0)
    }

    pub fn verify(&self, cap: usize) -> Result<(), BuildError> {
        for (tag, &considered) in &self.considered {
            if considered > cap {
                return Err(BuildError::TagHubCapExceeded {
                    tag: tag.clone(),
                    considered,
                    cap,
                });
            }
        }
        Ok(())
    }
}

/// Output of one build pass
#[derive(Debug, Clone)]
pub struct TasteBuild {
    pub graph: TasteGraph,
    pub hub_report: HubReport,
    /// Profiled artists left with no outgoing edge
    pub isolated: usize,
}

/// Taste graph builder
#[derive(Debug, Clone)]
pub struct TasteGraphBuilder {
    neighbors: usize,
    tag_hub_cap: usize,
}

impl TasteGraphBuilder {
    pub fn new(neighbors: usize, tag_hub_cap: usize) -> Self {
        Self {
            neighbors,
            tag_hub_cap,
        }
    }

    pub fn from_config(config: &TasteConfig) -> Self {
        Self::new(config.neighbors, config.tag_hub_cap)
    }

    pub fn build(&self, profiles: &TagProfileIndex, refs: &TagReferenceIndex) -> TasteBuild {
        let artists = profiles.artist_ids();

        let mut names: Vec<&str> = profiles
            .iter()
            .flat_map(|p| p.entries().iter().map(|e| e.name.as_str()))
            .collect();
        names.sort_unstable();
        names.dedup();
        let tag_ids: HashMap<&str, u32> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, i as u32))
            .collect();
        let idf: Vec<f32> = names.iter().map(|name| refs.idf(name)).collect();

        // Profiles as (tag id, weight), indexed by position in `artists`
        let compact: Vec<Vec<(u32, f32)>> = artists
            .iter()
            .map(|&id| {
                let mut tags: Vec<(u32, f32)> = profiles
                    .get(id)
                    .map(|p| {
                        p.entries()
                            .iter()
                            .filter_map(|e| tag_ids.get(e.name.as_str()).map(|&t| (t, e.weight)))
                            .collect()
                    })
                    .unwrap_or_default();
                tags.sort_unstable_by_key(|(t, _)| *t);
                tags
            })
            .collect();

        // Inverted index, each carrier list capped to the heaviest carriers
        let mut carriers: Vec<Vec<(u32, f32)>> = vec![Vec::new(); names.len()];
        for (pos, tags) in compact.iter().enumerate() {
            for &(tag, weight) in tags {
                carriers[tag as usize].push((pos as u32, weight));
            }
        }

        let mut considered = HashMap::with_capacity(names.len());
        let mut capped_tags = 0;
        let mut admitted: Vec<Vec<u32>> = vec![Vec::new(); artists.len()];
        let mut capped: Vec<Vec<u32>> = Vec::with_capacity(names.len());
        for (tag, list) in carriers.into_iter().enumerate() {
            if list.len() > self.tag_hub_cap {
                capped_tags += 1;
                debug!(
                    tag = names[tag],
                    carriers = list.len(),
                    cap = self.tag_hub_cap,
                    "Hub-capping tag"
                );
            }
            let kept = top_k_by(list, self.tag_hub_cap, |a, b| {
                b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
            });
            let mut positions: Vec<u32> = kept.into_iter().map(|(pos, _)| pos).collect();
            positions.sort_unstable();
            for &pos in &positions {
                admitted[pos as usize].push(tag as u32);
            }
            considered.insert(names[tag].to_string(), positions.len());
            capped.push(positions);
        }

        let per_artist: Vec<Vec<TasteEdge>> = (0..artists.len())
            .into_par_iter()
            .map(|pos| {
                let mut candidates: Vec<u32> = admitted[pos]
                    .iter()
                    .flat_map(|&tag| capped[tag as usize].iter().copied())
                    .filter(|&other| other as usize != pos)
                    .collect();
                candidates.sort_unstable();
                candidates.dedup();

                let scored: Vec<TasteEdge> = candidates
                    .into_iter()
                    .filter_map(|other| {
                        let pair = jaccard_sorted(&compact[pos], &compact[other as usize], &idf);
                        (pair.similarity > 0.0).then(|| TasteEdge {
                            src: artists[pos],
                            dst: artists[other as usize],
                            similarity: pair.similarity,
                            overlap: pair.overlap,
                        })
                    })
                    .collect();
                top_k_by(scored, self.neighbors, neighbor_order)
            })
            .collect();

        let isolated = per_artist.iter().filter(|edges| edges.is_empty()).count();
        let graph = TasteGraph::from_edges(per_artist.into_iter().flatten());

        info!(
            artists = artists.len(),
            tags = names.len(),
            hub_capped_tags = capped_tags,
            edges = graph.edge_count(),
            isolated,
            "Taste graph built"
        );

        TasteBuild {
            graph,
            hub_report: HubReport::from_considered(considered, capped_tags),
            isolated,
        }
    }
}
