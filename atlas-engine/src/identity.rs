//! Canonical artist identity
//!
//! Maps a listener-supplied artist reference to the canonical id the graphs
//! are keyed by. Merged artists leave redirects behind; a redirect chain is
//! followed up to [`MAX_REDIRECT_HOPS`] and must end at a known artist.

use atlas_common::text::normalize_name;
use atlas_common::ArtistId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Longest redirect chain followed before giving up
pub const MAX_REDIRECT_HOPS: usize = 8;

/// Canonical identity lookup used at the cold-start boundary
pub trait CanonicalResolver: Send + Sync {
    /// Canonical id for `artist`, or `None` when it cannot be mapped
    fn canonicalize(&self, artist: ArtistId) -> Option<ArtistId>;
}

/// Merged artist id → surviving id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub from: ArtistId,
    pub to: ArtistId,
}

/// Display name of a canonical artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistName {
    pub artist_id: ArtistId,
    pub name: String,
}

/// Redirect table, known ids and a normalized name index
#[derive(Debug, Clone, Default)]
pub struct IdentityDirectory {
    known: HashSet<ArtistId>,
    redirects: HashMap<ArtistId, ArtistId>,
    by_name: HashMap<String, ArtistId>,
    names: HashMap<ArtistId, String>,
}

impl IdentityDirectory {
    pub fn new(
        known: impl IntoIterator<Item = ArtistId>,
        redirects: Vec<Redirect>,
        names: Vec<ArtistName>,
    ) -> Self {
        let mut by_name: HashMap<String, ArtistId> = HashMap::new();
        let mut display: HashMap<ArtistId, String> = HashMap::new();
        for entry in names {
            let key = normalize_name(&entry.name);
            if key.is_empty() {
                continue;
            }
            // Homonyms: the lowest id wins so lookups are stable
            by_name
                .entry(key)
                .and_modify(|id| *id = (*id).min(entry.artist_id))
                .or_insert(entry.artist_id);
            display.insert(entry.artist_id, entry.name);
        }

        Self {
            known: known.into_iter().collect(),
            redirects: redirects.into_iter().map(|r| (r.from, r.to)).collect(),
            by_name,
            names: display,
        }
    }

    pub fn is_known(&self, artist: ArtistId) -> bool {
        self.known.contains(&artist)
    }

    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    /// Look up an artist by name, then canonicalize
    pub fn resolve_name(&self, name: &str) -> Option<ArtistId> {
        let key = normalize_name(name);
        let found = self.by_name.get(&key).copied();
        if found.is_none() {
            debug!(name = %key, "No artist with this name");
        }
        found.and_then(|id| self.canonicalize(id))
    }

    pub fn name_of(&self, artist: ArtistId) -> Option<&str> {
        self.names.get(&artist).map(String::as_str)
    }
}

impl CanonicalResolver for IdentityDirectory {
    fn canonicalize(&self, artist: ArtistId) -> Option<ArtistId> {
        let mut current = artist;
        for _ in 0..=MAX_REDIRECT_HOPS {
            match self.redirects.get(&current) {
                Some(&next) if next != current => current = next,
                _ => return self.known.contains(&current).then_some(current),
            }
        }
        warn!(artist_id = %artist, "Redirect chain too long or cyclic");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> IdentityDirectory {
        IdentityDirectory::new(
            [ArtistId(1), ArtistId(2), ArtistId(3)],
            vec![
                Redirect { from: ArtistId(10), to: ArtistId(11) },
                Redirect { from: ArtistId(11), to: ArtistId(2) },
                Redirect { from: ArtistId(20), to: ArtistId(21) },
                Redirect { from: ArtistId(21), to: ArtistId(20) },
            ],
            vec![
                ArtistName { artist_id: ArtistId(1), name: "Meshuggah".into() },
                ArtistName { artist_id: ArtistId(3), name: "Low".into() },
                ArtistName { artist_id: ArtistId(2), name: "LOW".into() },
            ],
        )
    }

    #[test]
    fn test_known_artist_maps_to_itself() {
        assert_eq!(directory().canonicalize(ArtistId(1)), Some(ArtistId(1)));
    }

    #[test]
    fn test_redirect_chain_followed() {
        assert_eq!(directory().canonicalize(ArtistId(10)), Some(ArtistId(2)));
    }

    #[test]
    fn test_unknown_and_cyclic_fail() {
        assert_eq!(directory().canonicalize(ArtistId(99)), None);
        assert_eq!(directory().canonicalize(ArtistId(20)), None);
    }

    #[test]
    fn test_resolve_name_normalizes_and_breaks_ties() {
        let dir = directory();
        assert_eq!(dir.resolve_name("  meshuggah "), Some(ArtistId(1)));
        assert_eq!(dir.resolve_name("low"), Some(ArtistId(2)));
        assert_eq!(dir.resolve_name("Tesseract"), None);
        assert_eq!(dir.name_of(ArtistId(3)), Some("Low"));
    }
}
