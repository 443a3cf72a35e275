//! Taste Graph
//!
//! Directed, capped, IDF-weighted Jaccard similarity graph over artist tag
//! profiles. This graph is the only source of "sounds like" claims: nothing but
//! tag profiles and tag reference counts contributes to a similarity value.
//!
//! # Pipeline
//! 1. Inverted index tag → carriers, each list capped to the `tag_hub_cap`
//!    highest-weight carriers (hub control)
//! 2. Candidate pairs = artists co-listed under at least one capped tag
//! 3. Score pairs with [`idf_weighted_jaccard`]
//! 4. Keep each artist's top `neighbors` edges (ties: larger tag overlap, then
//!    lower target id)
//!
//! Top-k truncation is per source, so `A → B` may exist without `B → A`.

pub mod builder;
pub mod graph;
pub mod similarity;

pub use builder::{HubReport, TasteBuild, TasteGraphBuilder};
pub use graph::{TasteEdge, TasteGraph};
pub use similarity::{idf_weighted_jaccard, PairSimilarity};
