//! Tag Profile Index
//!
//! Read-only tag data the rest of the engine consumes:
//! - [`TagProfileIndex`]: per-artist ranked tag profiles (≤15 entries each)
//! - [`TagReferenceIndex`]: global per-tag reference counts and IDF weights
//! - [`TagFilter`]: filtering primitives shared by both label modes

pub mod filter;
pub mod profile;
pub mod reference;

pub use filter::TagFilter;
pub use profile::{ArtistTags, RawTag, TagEntry, TagProfile, TagProfileIndex};
pub use reference::TagReferenceIndex;
