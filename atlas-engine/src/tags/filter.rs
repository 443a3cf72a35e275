//! Tag filtering primitives
//!
//! Shared by profile ingestion (non-sonic metadata tags) and both macro label
//! modes (geographic / demographic adjectives, ultra-generic suppression).
//! All comparisons run on normalized tag names.

use atlas_common::config::AtlasConfig;
use atlas_common::text::normalize_name;
use std::collections::HashSet;

/// Configured tag filter sets
#[derive(Debug, Clone)]
pub struct TagFilter {
    non_sonic: HashSet<String>,
    geo_adjectives: HashSet<String>,
    ultra_generic_threshold: u32,
}

impl TagFilter {
    pub fn new<I, J>(non_sonic: I, geo_adjectives: J, ultra_generic_threshold: u32) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        J: IntoIterator,
        J::Item: AsRef<str>,
    {
        Self {
            non_sonic: non_sonic.into_iter().map(|t| normalize_name(t.as_ref())).collect(),
            geo_adjectives: geo_adjectives
                .into_iter()
                .map(|t| normalize_name(t.as_ref()))
                .collect(),
            ultra_generic_threshold,
        }
    }

    pub fn from_config(config: &AtlasConfig) -> Self {
        Self::new(
            &config.taste.non_sonic_tags,
            &config.labels.geo_adjectives,
            config.labels.ultra_generic_threshold,
        )
    }

    /// Listener-metadata tags such as "seen live" that say nothing about sound
    pub fn is_non_sonic(&self, tag: &str) -> bool {
        self.non_sonic.contains(tag)
    }

    /// Nationality, place or demographic tags
    pub fn is_geo_adjective(&self, tag: &str) -> bool {
        self.geo_adjectives.contains(tag)
    }

    /// Tags carried by so many artists they describe nobody in particular
    pub fn is_ultra_generic(&self, ref_count: u32) -> bool {
        ref_count > self.ultra_generic_threshold
    }

    /// Both label modes drop these before any scoring
    pub fn is_label_excluded(&self, tag: &str) -> bool {
        self.is_geo_adjective(tag) || self.is_non_sonic(tag)
    }
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::from_config(&AtlasConfig::default())
    }
}
