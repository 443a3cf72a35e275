//! Global tag reference counts and IDF weights
//!
//! `idf(tag) = ln(1 + N / max(1, ref_count))` where `N` is the number of
//! artists with at least one tag. Reference counts are always the full,
//! pre-truncation counts: hub capping in the taste builder limits which artists
//! are *paired* under a tag, it never lowers the tag's weight.

use std::collections::HashMap;

use super::TagProfileIndex;

/// Per-tag global reference counts
#[derive(Debug, Clone, Default)]
pub struct TagReferenceIndex {
    total_artists: usize,
    ref_counts: HashMap<String, u32>,
}

impl TagReferenceIndex {
    /// Count, for each tag, how many profiled artists carry it
    pub fn from_profiles(profiles: &TagProfileIndex) -> Self {
        let mut ref_counts: HashMap<String, u32> = HashMap::new();
        for profile in profiles.iter() {
            for entry in profile.entries() {
                *ref_counts.entry(entry.name.clone()).or_insert(0) += 1;
            }
        }
        Self {
            total_artists: profiles.len(),
            ref_counts,
        }
    }

    /// Use counts supplied by ingestion
    pub fn from_counts(total_artists: usize, ref_counts: HashMap<String, u32>) -> Self {
        Self {
            total_artists,
            ref_counts,
        }
    }

    /// Raise counts to externally observed global values.
    ///
    /// Ingestion may know of carriers beyond the capped profiles; the larger
    /// count wins so a tag is never made to look rarer than it is.
    pub fn merge_external(&mut self, external: &HashMap<String, u32>) {
        for (tag, &count) in external {
            let slot = self.ref_counts.entry(tag.clone()).or_insert(0);
            *slot = (*slot).max(count);
        }
    }

    pub fn into_counts(self) -> HashMap<String, u32> {
        self.ref_counts
    }

    pub fn total_artists(&self) -> usize {
        self.total_artists
    }

    /// Global reference count (0 for unknown tags)
    pub fn ref_count(&self, tag: &str) -> u32 {
        self.ref_counts.get(tag).copied().unwrap_or(0)
    }

    pub fn idf(&self, tag: &str) -> f32 {
        let n = self.total_artists as f32;
        let df = self.ref_count(tag).max(1) as f32;
        (1.0 + n / df).ln()
    }

    /// Share of all artists carrying the tag
    pub fn global_frequency(&self, tag: &str) -> f32 {
        if self.total_artists == 0 {
            return 0.0;
        }
        self.ref_count(tag) as f32 / self.total_artists as f32
    }

    pub fn tag_count(&self) -> usize {
        self.ref_counts.len()
    }
}
