//! Taste buckets
//!
//! Groups the final candidate list under the seeds' dominant tags.
//!
//! # Stages
//! 1. Include: walk the seed tag cloud (label-excluded tags removed) in order,
//!    skip tags below `min_share` of the total weight, stop once the included
//!    shares reach `cumulative_target`
//! 2. Aggregate: each candidate joins the bucket of its primary tag, or
//!    "other" when that tag was not included or it has no profile
//! 3. Rank: included order, empty tag buckets hidden, "other" last and only
//!    when non-empty
//!
//! Buckets only regroup the ranked list; they never change a score or an
//! ordering within a bucket.

use atlas_common::config::BucketConfig;
use atlas_common::ArtistId;
use serde::Serialize;
use std::collections::HashMap;

use super::result::ScoredCandidate;
use crate::tag_cloud::CloudTag;
use crate::tags::{TagFilter, TagProfileIndex};

const OTHER_LABEL: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BucketStrength {
    Strong,
    Moderate,
    Weak,
}

impl BucketStrength {
    pub fn from_count(count: usize, config: &BucketConfig) -> Self {
        if count >= config.strong_threshold {
            Self::Strong
        } else if count >= config.moderate_threshold {
            Self::Moderate
        } else {
            Self::Weak
        }
    }
}

/// One group of final candidates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TasteBucket {
    /// Grouping tag; `None` for the catch-all bucket
    pub tag: Option<String>,
    pub label: String,
    /// Summed seed count of the tag (0 for "other")
    pub weight: u64,
    /// Share of the filtered seed tag weight, rounded to 4 decimals
    pub weight_share: f64,
    /// Candidates in final rank order
    pub candidates: Vec<ArtistId>,
    /// Absent on the catch-all bucket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<BucketStrength>,
}

/// Consistency counters over one bucketing pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketValidation {
    pub bucket_count: usize,
    pub candidate_total: usize,
    pub has_other: bool,
    /// Every final candidate landed in exactly one shown bucket
    pub ok: bool,
    pub included_tag_count: usize,
    pub hidden_empty_bucket_count: usize,
    pub cum_share_final: f64,
    pub min_share_included: Option<f64>,
    pub total_weight: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TasteBuckets {
    pub buckets: Vec<TasteBucket>,
    pub validation: BucketValidation,
}

struct IncludedTag<'a> {
    name: &'a str,
    weight: u64,
    share: f64,
}

struct Inclusion<'a> {
    tags: Vec<IncludedTag<'a>>,
    total_weight: u64,
    cum_share: f64,
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn include_tags<'a>(cloud: &'a [CloudTag], filter: &TagFilter, config: &BucketConfig) -> Inclusion<'a> {
    let eligible: Vec<&CloudTag> = cloud
        .iter()
        .filter(|t| !filter.is_label_excluded(&t.name))
        .collect();
    let total_weight: u64 = eligible.iter().map(|t| t.raw_count).sum();

    let mut tags = Vec::new();
    let mut cum_share = 0.0;
    if total_weight == 0 {
        return Inclusion {
            tags,
            total_weight,
            cum_share,
        };
    }

    for tag in eligible {
        let share = tag.raw_count as f64 / total_weight as f64;
        if share < config.min_share {
            continue;
        }
        tags.push(IncludedTag {
            name: tag.name.as_str(),
            weight: tag.raw_count,
            share,
        });
        cum_share += share;
        if cum_share >= config.cumulative_target {
            break;
        }
    }

    Inclusion {
        tags,
        total_weight,
        cum_share,
    }
}

/// Group `candidates` (already ranked and truncated) into taste buckets
pub fn bucket_candidates(
    cloud: &[CloudTag],
    candidates: &[ScoredCandidate],
    profiles: &TagProfileIndex,
    filter: &TagFilter,
    config: &BucketConfig,
) -> TasteBuckets {
    let inclusion = include_tags(cloud, filter, config);

    let slot_of: HashMap<&str, usize> = inclusion
        .tags
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name, i))
        .collect();
    let mut grouped: Vec<Vec<ArtistId>> = vec![Vec::new(); inclusion.tags.len()];
    let mut other: Vec<ArtistId> = Vec::new();
    for candidate in candidates {
        let slot = profiles
            .get(candidate.artist_id)
            .and_then(|p| p.primary_tag())
            .and_then(|tag| slot_of.get(tag).copied());
        match slot {
            Some(i) => grouped[i].push(candidate.artist_id),
            None => other.push(candidate.artist_id),
        }
    }

    let mut buckets = Vec::with_capacity(grouped.len() + 1);
    let mut hidden = 0;
    for (tag, members) in inclusion.tags.iter().zip(grouped) {
        if members.is_empty() {
            hidden += 1;
            continue;
        }
        buckets.push(TasteBucket {
            tag: Some(tag.name.to_string()),
            label: tag.name.to_string(),
            weight: tag.weight,
            weight_share: round4(tag.share),
            strength: Some(BucketStrength::from_count(members.len(), config)),
            candidates: members,
        });
    }
    let has_other = !other.is_empty();
    if has_other {
        buckets.push(TasteBucket {
            tag: None,
            label: OTHER_LABEL.to_string(),
            weight: 0,
            weight_share: 0.0,
            candidates: other,
            strength: None,
        });
    }

    let candidate_total: usize = buckets.iter().map(|b| b.candidates.len()).sum();
    let validation = BucketValidation {
        bucket_count: buckets.len(),
        candidate_total,
        has_other,
        ok: candidate_total == candidates.len(),
        included_tag_count: inclusion.tags.len(),
        hidden_empty_bucket_count: hidden,
        cum_share_final: round4(inclusion.cum_share),
        min_share_included: inclusion
            .tags
            .iter()
            .map(|t| t.share)
            .reduce(f64::min)
            .map(round4),
        total_weight: inclusion.total_weight,
    };

    TasteBuckets { buckets, validation }
}
