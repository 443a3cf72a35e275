//! Immutable taste graph storage

use atlas_common::ArtistId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::BuildError;

/// Directed similarity edge `src → dst`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TasteEdge {
    pub src: ArtistId,
    pub dst: ArtistId,
    pub similarity: f32,
    /// Shared tag count, used only as a tie-break
    #[serde(default)]
    pub overlap: u16,
}

/// Best-first neighbor ordering
pub(crate) fn neighbor_order(a: &TasteEdge, b: &TasteEdge) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then(b.overlap.cmp(&a.overlap))
        .then(a.dst.cmp(&b.dst))
}

/// Outgoing adjacency, best neighbor first.
///
/// Artists without outgoing edges are not sources; they are absent from the
/// map entirely and must go through the cold-start path.
#[derive(Debug, Clone, Default)]
pub struct TasteGraph {
    adjacency: HashMap<ArtistId, Vec<TasteEdge>>,
}

impl TasteGraph {
    /// Group edges by source and order each list best-first.
    ///
    /// No truncation happens here: [`TasteGraph::verify`] rejects lists over
    /// the cap instead of silently hiding them.
    pub fn from_edges(edges: impl IntoIterator<Item = TasteEdge>) -> Self {
        let mut adjacency: HashMap<ArtistId, Vec<TasteEdge>> = HashMap::new();
        for edge in edges {
            adjacency.entry(edge.src).or_default().push(edge);
        }
        for list in adjacency.values_mut() {
            list.sort_by(neighbor_order);
        }
        Self { adjacency }
    }

    /// Outgoing edges of `src` (empty for non-sources)
    pub fn neighbors(&self, src: ArtistId) -> &[TasteEdge] {
        self.adjacency.get(&src).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when `artist` has at least one outgoing edge
    pub fn is_source(&self, artist: ArtistId) -> bool {
        self.adjacency.contains_key(&artist)
    }

    pub fn similarity(&self, src: ArtistId, dst: ArtistId) -> Option<f32> {
        self.neighbors(src)
            .iter()
            .find(|e| e.dst == dst)
            .map(|e| e.similarity)
    }

    pub fn source_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn edges(&self) -> impl Iterator<Item = &TasteEdge> {
        self.adjacency.values().flatten()
    }

    /// Integrity check run before a snapshot may be published
    pub fn verify(&self, max_out_degree: usize) -> Result<(), BuildError> {
        for (&src, list) in &self.adjacency {
            if list.len() > max_out_degree {
                return Err(BuildError::OutDegreeExceeded {
                    artist: src,
                    degree: list.len(),
                    cap: max_out_degree,
                });
            }
            for edge in list {
                if edge.dst == src {
                    return Err(BuildError::SelfLoop(src));
                }
                if !(0.0..=1.0).contains(&edge.similarity) {
                    return Err(BuildError::SimilarityOutOfRange {
                        src,
                        dst: edge.dst,
                        similarity: edge.similarity,
                    });
                }
            }
        }
        Ok(())
    }
}
