//! Test Helper Utilities
//!
//! Shared fixture builders for atlas-engine integration tests

#![allow(unused_imports)]

pub mod fixtures;

// Re-export commonly used items
pub use fixtures::{
    engine_for, metal_parts, profile, relation, store_for, taste_edge, CONTEXT_ONLY, LABELMATE,
    MESHUGGAH, OLD_MESHUGGAH_ID, TASTE_MATCH, TESSERACT, UNKNOWN,
};
