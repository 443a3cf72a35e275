//! # Atlas Common Library
//!
//! Shared code for the Atlas recommendation engine and its tooling:
//! - Error type and result alias
//! - Artist and area identifiers
//! - Tag / artist name normalization
//! - Layered configuration loading (CLI → ENV → TOML → defaults)

pub mod config;
pub mod error;
pub mod ids;
pub mod text;

pub use error::{Error, Result};
pub use ids::{AreaId, ArtistId};
