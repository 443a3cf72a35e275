//! Query-time retrieval: seed resolution, taste candidates, structure
//! reasons and rerank, labels and geo.

pub mod buckets;
pub mod engine;
pub mod merge;
pub mod rerank;
pub mod result;

pub use buckets::{BucketStrength, TasteBucket, TasteBuckets};
pub use engine::{HybridRetrievalEngine, RetrievalOptions};
pub use result::{RecommendationResult, ScoredCandidate, SeedReport, SeedSummary};
