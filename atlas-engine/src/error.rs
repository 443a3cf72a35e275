//! Error types for atlas-engine
//!
//! Two families:
//! - [`BuildError`]: snapshot integrity failures. Always fatal for the build;
//!   a snapshot that fails verification is never published.
//! - [`QueryError`]: malformed requests. Degraded data (unknown seeds, missing
//!   geo, timeouts) is never an error; it is reported inside the result.

use atlas_common::ArtistId;
use thiserror::Error;

use crate::structure::EdgeType;

/// Snapshot build / verification failure
#[derive(Debug, Error)]
pub enum BuildError {
    /// An artist retains more taste neighbors than allowed
    #[error("artist {artist} has {degree} taste edges (cap {cap})")]
    OutDegreeExceeded {
        artist: ArtistId,
        degree: usize,
        cap: usize,
    },

    /// A tag paired more artists than the hub cap allows
    #[error("tag '{tag}' considered {considered} artists for similarity (cap {cap})")]
    TagHubCapExceeded {
        tag: String,
        considered: usize,
        cap: usize,
    },

    /// A node exceeds the per-type structure cap
    #[error("artist {artist} has {degree} {edge_type} neighbors (cap {cap})")]
    StructureCapExceeded {
        artist: ArtistId,
        edge_type: EdgeType,
        degree: usize,
        cap: usize,
    },

    /// A taste edge carries a similarity outside [0, 1]
    #[error("taste edge {src} -> {dst} has similarity {similarity} outside [0, 1]")]
    SimilarityOutOfRange {
        src: ArtistId,
        dst: ArtistId,
        similarity: f32,
    },

    /// An edge points back at its own source
    #[error("self-loop on artist {0}")]
    SelfLoop(ArtistId),

    /// A tag profile breaks the rank / size invariants
    #[error("invalid tag profile for artist {artist}: {reason}")]
    InvalidProfile { artist: ArtistId, reason: String },

    /// Configuration cannot produce a valid snapshot
    #[error("configuration error: {0}")]
    Config(#[from] atlas_common::Error),
}

/// Rejected retrieval request
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("at least one seed artist is required")]
    NoSeeds,

    #[error("limit must be greater than zero")]
    ZeroLimit,
}
