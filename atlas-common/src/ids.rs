//! Identifier newtypes
//!
//! Artist and area identities are stable integers assigned upstream. The
//! engine treats them as opaque graph node keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical artist identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(pub u64);

/// Area (city / subdivision / country) identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(pub u64);

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ArtistId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for ArtistId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(ArtistId)
    }
}

/// Parse a seed list such as `"[1, 2 3]"` or `"1,2,3"`.
///
/// Accepts comma and/or whitespace separators and optional surrounding
/// brackets. Returns an error for an empty list or any non-integer token.
pub fn parse_artist_ids(input: &str) -> crate::Result<Vec<ArtistId>> {
    let cleaned = input.trim().trim_start_matches('[').trim_end_matches(']');
    let tokens: Vec<&str> = cleaned
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(crate::Error::InvalidInput(
            "seed list must contain at least one integer".to_string(),
        ));
    }

    tokens
        .into_iter()
        .map(|t| {
            t.parse::<ArtistId>()
                .map_err(|_| crate::Error::InvalidInput(format!("seed '{}' is not an integer", t)))
        })
        .collect()
}
