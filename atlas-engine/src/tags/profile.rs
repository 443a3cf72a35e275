//! Per-artist tag profiles
//!
//! # Normalization
//! Raw tags arrive from ingestion as (name, count, optional weight):
//! 1. Normalize names (trim, collapse whitespace, lowercase); drop empty names
//! 2. Drop non-positive counts and non-sonic metadata tags
//! 3. Merge duplicates (sum counts, keep the larger explicit weight)
//! 4. Default missing weights to `count / max_count` within the artist
//! 5. Order by weight desc, count desc, name asc; keep the first `cap`
//! 6. Assign dense ranks 1..k in that order

use atlas_common::text::normalize_name;
use atlas_common::ArtistId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use super::TagFilter;
use crate::error::BuildError;

/// Tag as delivered by ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTag {
    pub name: String,
    pub count: i64,
    #[serde(default)]
    pub weight: Option<f32>,
}

/// Raw tags for one artist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistTags {
    pub artist_id: ArtistId,
    pub tags: Vec<RawTag>,
}

/// One ranked profile entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagEntry {
    pub name: String,
    pub count: u32,
    pub weight: f32,
    pub rank: u16,
}

/// Ranked, capped tag profile of one artist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagProfile {
    artist_id: ArtistId,
    entries: Vec<TagEntry>,
}

/// Ordering used for both ranking and truncation
fn entry_order(a: &TagEntry, b: &TagEntry) -> Ordering {
    b.weight
        .total_cmp(&a.weight)
        .then(b.count.cmp(&a.count))
        .then(a.name.cmp(&b.name))
}

impl TagProfile {
    /// Build a profile from raw ingestion tags
    pub fn from_raw(artist_id: ArtistId, raw: &[RawTag], cap: usize, filter: &TagFilter) -> Self {
        // name -> (count sum, explicit weight)
        let mut merged: BTreeMap<String, (u64, Option<f32>)> = BTreeMap::new();
        for tag in raw {
            let name = normalize_name(&tag.name);
            if name.is_empty() || tag.count <= 0 || filter.is_non_sonic(&name) {
                continue;
            }
            let slot = merged.entry(name).or_insert((0, None));
            slot.0 += tag.count as u64;
            if let Some(w) = tag.weight.filter(|w| w.is_finite()) {
                slot.1 = Some(slot.1.map_or(w, |prev| prev.max(w)));
            }
        }

        let max_count = merged.values().map(|(c, _)| *c).max().unwrap_or(0);
        let mut entries: Vec<TagEntry> = merged
            .into_iter()
            .filter_map(|(name, (count, weight))| {
                let weight = weight.unwrap_or(count as f32 / max_count.max(1) as f32);
                if weight <= 0.0 {
                    return None;
                }
                Some(TagEntry {
                    name,
                    count: count.min(u32::MAX as u64) as u32,
                    weight,
                    rank: 0,
                })
            })
            .collect();

        entries = crate::topk::top_k_by(entries, cap, entry_order);
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = (i + 1) as u16;
        }

        Self { artist_id, entries }
    }

    /// Build from already-ranked entries (snapshot reload, fixtures).
    ///
    /// Entries are re-sorted and re-ranked; use [`TagProfile::verify`] to
    /// enforce the size cap.
    pub fn from_entries(artist_id: ArtistId, mut entries: Vec<TagEntry>) -> Self {
        entries.sort_by(entry_order);
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = (i + 1) as u16;
        }
        Self { artist_id, entries }
    }

    pub fn artist_id(&self) -> ArtistId {
        self.artist_id
    }

    /// Entries in rank order
    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, tag: &str) -> Option<&TagEntry> {
        self.entries.iter().find(|e| e.name == tag)
    }

    /// Rank-1 tag, if any
    pub fn primary_tag(&self) -> Option<&str> {
        self.entries.first().map(|e| e.name.as_str())
    }

    /// Check size cap and dense rank ordering
    pub fn verify(&self, cap: usize) -> Result<(), BuildError> {
        if self.entries.len() > cap {
            return Err(BuildError::InvalidProfile {
                artist: self.artist_id,
                reason: format!("{} entries exceeds cap {}", self.entries.len(), cap),
            });
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.rank as usize != i + 1 {
                return Err(BuildError::InvalidProfile {
                    artist: self.artist_id,
                    reason: format!("rank {} at position {}", entry.rank, i + 1),
                });
            }
            if let Some(next) = self.entries.get(i + 1) {
                if entry_order(entry, next) != Ordering::Less {
                    return Err(BuildError::InvalidProfile {
                        artist: self.artist_id,
                        reason: format!("'{}' is not ordered before '{}'", entry.name, next.name),
                    });
                }
            }
        }
        Ok(())
    }
}

/// All artist profiles, keyed by artist
#[derive(Debug, Clone, Default)]
pub struct TagProfileIndex {
    profiles: HashMap<ArtistId, TagProfile>,
}

impl TagProfileIndex {
    /// Normalize every artist's raw tags. Artists left with no tags are omitted.
    pub fn from_raw(records: &[ArtistTags], cap: usize, filter: &TagFilter) -> Self {
        let mut index = Self::default();
        for record in records {
            let profile = TagProfile::from_raw(record.artist_id, &record.tags, cap, filter);
            index.insert(profile);
        }
        index
    }

    /// Insert a profile; empty profiles are ignored
    pub fn insert(&mut self, profile: TagProfile) {
        if !profile.is_empty() {
            self.profiles.insert(profile.artist_id, profile);
        }
    }

    pub fn get(&self, artist: ArtistId) -> Option<&TagProfile> {
        self.profiles.get(&artist)
    }

    pub fn contains(&self, artist: ArtistId) -> bool {
        self.profiles.contains_key(&artist)
    }

    /// Number of artists with at least one tag
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagProfile> {
        self.profiles.values()
    }

    /// Artist ids in ascending order
    pub fn artist_ids(&self) -> Vec<ArtistId> {
        let mut ids: Vec<ArtistId> = self.profiles.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn verify(&self, cap: usize) -> Result<(), BuildError> {
        for profile in self.profiles.values() {
            profile.verify(cap)?;
        }
        Ok(())
    }
}
