//! Structure Graph
//!
//! Typed relations between artists (members, credits, labels, events,
//! country). Explanatory only: retrieval consults it for `reasons` and the
//! rerank nudge, never to generate candidates.

pub mod edge_type;
pub mod graph;

pub use edge_type::{EdgeType, EdgeTypeSet};
pub use graph::{RelationRecord, StructureEdge, StructureGraph, StructureStats};
