//! Unified, hub-capped structure graph
//!
//! # Build
//! Per edge type, independently:
//! 1. Drop self-relations
//! 2. Deduplicate by unordered pair (max weight; a pair recorded in both
//!    orientations becomes undirected)
//! 3. Mutual hub cap: every node ranks its neighbors of this type by weight
//!    desc, then artist id asc, and keeps the top `cap`. A pair survives only
//!    if both endpoints keep it, so the undirected lookup never exceeds the cap.
//!
//! Survivors from all types are then unified into one adjacency keyed by
//! artist, holding for each neighbor the [`EdgeTypeSet`] connecting them.
//! Orientation is retained on [`StructureEdge`] but every lookup is undirected.

use atlas_common::config::PerTypeCaps;
use atlas_common::ArtistId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

use super::edge_type::{EdgeType, EdgeTypeSet};
use crate::error::BuildError;
use crate::topk::top_k_by;

fn default_weight() -> f32 {
    1.0
}

/// Raw relation record from ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub artist_a: ArtistId,
    pub artist_b: ArtistId,
    pub edge_type: EdgeType,
    /// Free-form provenance (label name, event id, ...)
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub directed: bool,
}

/// Stored structure edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureEdge {
    pub src: ArtistId,
    pub dst: ArtistId,
    pub edge_type: EdgeType,
    pub directed: bool,
    pub weight: f32,
}

/// Kept / dropped edge counts per type
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructureStats {
    pub kept: BTreeMap<EdgeType, usize>,
    pub dropped_by_cap: BTreeMap<EdgeType, usize>,
}

/// Structure graph with undirected typed lookup
#[derive(Debug, Clone, Default)]
pub struct StructureGraph {
    edges: Vec<StructureEdge>,
    adjacency: HashMap<ArtistId, BTreeMap<ArtistId, EdgeTypeSet>>,
    stats: StructureStats,
}

struct PairAgg {
    src: ArtistId,
    dst: ArtistId,
    weight: f32,
    directed: bool,
}

impl StructureGraph {
    /// Build from raw relation records, applying per-type mutual caps
    pub fn build(records: &[RelationRecord], caps: &PerTypeCaps) -> Self {
        let mut by_type: BTreeMap<EdgeType, Vec<&RelationRecord>> = BTreeMap::new();
        for record in records {
            if record.artist_a == record.artist_b {
                debug!(artist_id = %record.artist_a, edge_type = %record.edge_type, "Dropping self relation");
                continue;
            }
            by_type.entry(record.edge_type).or_default().push(record);
        }

        let mut edges = Vec::new();
        let mut stats = StructureStats::default();
        for (edge_type, group) in by_type {
            let cap = edge_type.cap(caps);
            let pairs = dedupe_pairs(&group);
            let survivors = mutual_cap(&pairs, cap);
            let dropped = pairs.len() - survivors.len();

            if dropped > 0 {
                debug!(%edge_type, dropped, cap, "Hub-capped structure relations");
            }
            stats.kept.insert(edge_type, survivors.len());
            stats.dropped_by_cap.insert(edge_type, dropped);

            edges.extend(survivors.into_iter().map(|key| {
                let agg = &pairs[&key];
                StructureEdge {
                    src: agg.src,
                    dst: agg.dst,
                    edge_type,
                    directed: agg.directed,
                    weight: agg.weight,
                }
            }));
        }

        let mut graph = Self::from_edges(edges);
        graph.stats = stats;
        info!(
            artists = graph.adjacency.len(),
            edges = graph.edges.len(),
            "Structure graph built"
        );
        graph
    }

    /// Assemble from stored edges without applying caps.
    ///
    /// Used for snapshot reload and fixtures; [`StructureGraph::verify`]
    /// decides whether the result may be published.
    pub fn from_edges(edges: Vec<StructureEdge>) -> Self {
        let mut adjacency: HashMap<ArtistId, BTreeMap<ArtistId, EdgeTypeSet>> = HashMap::new();
        let mut stats = StructureStats::default();
        for edge in &edges {
            adjacency
                .entry(edge.src)
                .or_default()
                .entry(edge.dst)
                .or_default()
                .insert(edge.edge_type);
            adjacency
                .entry(edge.dst)
                .or_default()
                .entry(edge.src)
                .or_default()
                .insert(edge.edge_type);
            *stats.kept.entry(edge.edge_type).or_insert(0) += 1;
        }
        Self {
            edges,
            adjacency,
            stats,
        }
    }

    /// Types connecting `a` and `b` in either direction
    pub fn connecting_types(&self, a: ArtistId, b: ArtistId) -> EdgeTypeSet {
        self.adjacency
            .get(&a)
            .and_then(|neighbors| neighbors.get(&b))
            .copied()
            .unwrap_or_default()
    }

    /// Undirected neighbors of `artist`, ascending by id
    pub fn neighbors(&self, artist: ArtistId) -> Option<&BTreeMap<ArtistId, EdgeTypeSet>> {
        self.adjacency.get(&artist)
    }

    pub fn contains(&self, artist: ArtistId) -> bool {
        self.adjacency.contains_key(&artist)
    }

    /// Undirected neighbor count of one type
    pub fn degree(&self, artist: ArtistId, edge_type: EdgeType) -> usize {
        self.neighbors(artist)
            .map(|n| n.values().filter(|set| set.contains(edge_type)).count())
            .unwrap_or(0)
    }

    pub fn edges(&self) -> &[StructureEdge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn artists(&self) -> impl Iterator<Item = ArtistId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn stats(&self) -> &StructureStats {
        &self.stats
    }

    /// Reject self-loops and any node over its per-type cap
    pub fn verify(&self, caps: &PerTypeCaps) -> Result<(), BuildError> {
        for (&artist, neighbors) in &self.adjacency {
            if neighbors.contains_key(&artist) {
                return Err(BuildError::SelfLoop(artist));
            }
            let mut degree = [0usize; 5];
            for set in neighbors.values() {
                for t in set.iter() {
                    degree[t as usize] += 1;
                }
            }
            for t in EdgeType::ALL {
                let cap = t.cap(caps);
                if degree[t as usize] > cap {
                    return Err(BuildError::StructureCapExceeded {
                        artist,
                        edge_type: t,
                        degree: degree[t as usize],
                        cap,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Collapse records to unordered pairs keyed `(low, high)`
fn dedupe_pairs(group: &[&RelationRecord]) -> HashMap<(ArtistId, ArtistId), PairAgg> {
    let mut pairs: HashMap<(ArtistId, ArtistId), PairAgg> = HashMap::new();
    for record in group {
        let (a, b) = (record.artist_a, record.artist_b);
        let key = (a.min(b), a.max(b));
        let weight = if record.weight.is_finite() { record.weight } else { 0.0 };
        pairs
            .entry(key)
            .and_modify(|agg| {
                agg.weight = agg.weight.max(weight);
                if !record.directed || (agg.src, agg.dst) != (a, b) {
                    agg.directed = false;
                }
            })
            .or_insert(PairAgg {
                src: a,
                dst: b,
                weight,
                directed: record.directed,
            });
    }
    pairs
}

/// Pairs kept by both endpoints' top-`cap` lists, in ascending key order
fn mutual_cap(
    pairs: &HashMap<(ArtistId, ArtistId), PairAgg>,
    cap: usize,
) -> Vec<(ArtistId, ArtistId)> {
    let mut incident: HashMap<ArtistId, Vec<(ArtistId, f32)>> = HashMap::new();
    for (&(lo, hi), agg) in pairs {
        incident.entry(lo).or_default().push((hi, agg.weight));
        incident.entry(hi).or_default().push((lo, agg.weight));
    }

    let mut kept: HashSet<(ArtistId, ArtistId)> = HashSet::new();
    for (node, list) in incident {
        let top = top_k_by(list, cap, |a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        kept.extend(top.into_iter().map(|(other, _)| (node, other)));
    }

    let mut survivors: Vec<(ArtistId, ArtistId)> = pairs
        .keys()
        .filter(|(lo, hi)| kept.contains(&(*lo, *hi)) && kept.contains(&(*hi, *lo)))
        .copied()
        .collect();
    survivors.sort_unstable();
    survivors
}
