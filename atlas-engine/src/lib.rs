//! # Atlas Engine
//!
//! Hybrid taste/structure artist recommendation engine.
//!
//! **Architecture:**
//! - Offline: tag profiles → tag reference index → taste graph; relation
//!   records → structure graph; areas → geo resolver. All bundled into a
//!   verified, versioned [`EngineSnapshot`].
//! - Online: [`HybridRetrievalEngine::retrieve`] reads the live snapshot from a
//!   [`SnapshotStore`] and never mutates it.
//!
//! **Signal separation:**
//! - Taste graph: the only candidate source and the only "sounds like" claim
//! - Structure graph: reasons and an additive, non-stacking rerank nudge
//! - Geo and macro labels: display context, never scored

pub mod cold_start;
pub mod error;
pub mod geo;
pub mod identity;
pub mod labels;
pub mod retrieval;
pub mod snapshot;
pub mod structure;
pub mod tag_cloud;
pub mod tags;
pub mod taste;
pub mod topk;

pub use error::{BuildError, QueryError};
pub use retrieval::{HybridRetrievalEngine, RecommendationResult, RetrievalOptions};
pub use snapshot::{BuildStats, EngineSnapshot, SnapshotInputs, SnapshotParts, SnapshotStore};
