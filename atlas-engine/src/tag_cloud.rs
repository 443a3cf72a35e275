//! Seed tag cloud
//!
//! Sums raw tag counts across the resolved seeds and normalizes by the largest
//! sum. Counts are not rescaled per seed, so heavily tagged seeds weigh more.
//! Descriptive output only.

use atlas_common::ArtistId;
use serde::Serialize;
use std::collections::HashMap;

use crate::tags::TagProfileIndex;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudTag {
    pub name: String,
    pub raw_count: u64,
    /// `raw_count / max raw_count`, rounded to 4 decimals
    pub score: f64,
}

pub fn build_tag_cloud(seeds: &[ArtistId], profiles: &TagProfileIndex) -> Vec<CloudTag> {
    let mut sums: HashMap<&str, u64> = HashMap::new();
    for profile in seeds.iter().filter_map(|id| profiles.get(*id)) {
        for entry in profile.entries() {
            *sums.entry(entry.name.as_str()).or_insert(0) += u64::from(entry.count);
        }
    }

    let Some(max) = sums.values().copied().max().filter(|m| *m > 0) else {
        return Vec::new();
    };

    let mut cloud: Vec<CloudTag> = sums
        .into_iter()
        .map(|(name, raw_count)| CloudTag {
            name: name.to_string(),
            raw_count,
            score: ((raw_count as f64 / max as f64) * 10_000.0).round() / 10_000.0,
        })
        .collect();
    cloud.sort_by(|a, b| b.raw_count.cmp(&a.raw_count).then_with(|| a.name.cmp(&b.name)));
    cloud
}
