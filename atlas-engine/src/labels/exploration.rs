//! Exploration labels
//!
//! ```text
//! lift(t) = (count_in_set(t) / set_size) / (ref_count(t) / N_total)
//! ```
//! A tag qualifies only when it covers at least `min_coverage` distinct
//! artists of the set, whatever its lift.

use atlas_common::ArtistId;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{LabelKind, LabelSubject, MacroTag};
use crate::tags::{TagFilter, TagProfileIndex, TagReferenceIndex};

pub fn exploration_labels(
    set_id: Uuid,
    members: &[ArtistId],
    profiles: &TagProfileIndex,
    refs: &TagReferenceIndex,
    filter: &TagFilter,
    min_coverage: usize,
    top: usize,
) -> Vec<MacroTag> {
    if members.is_empty() {
        return Vec::new();
    }

    // Distinct-artist coverage per tag; members are already unique
    let mut coverage: BTreeMap<&str, usize> = BTreeMap::new();
    for profile in members.iter().filter_map(|id| profiles.get(*id)) {
        for entry in profile.entries() {
            if !filter.is_label_excluded(&entry.name) {
                *coverage.entry(entry.name.as_str()).or_insert(0) += 1;
            }
        }
    }

    let set_size = members.len() as f32;
    let total = refs.total_artists().max(1) as f32;
    let mut lifted: Vec<(&str, usize, f32)> = coverage
        .into_iter()
        .filter(|(_, count)| *count >= min_coverage)
        .map(|(tag, count)| {
            let in_set = count as f32 / set_size;
            let global = refs.ref_count(tag).max(1) as f32 / total;
            (tag, count, in_set / global)
        })
        .collect();

    lifted.sort_by(|a, b| {
        b.2.total_cmp(&a.2)
            .then(b.1.cmp(&a.1))
            .then(a.0.cmp(b.0))
    });
    lifted.truncate(top);

    lifted
        .into_iter()
        .map(|(tag, _, lift)| MacroTag {
            subject: LabelSubject::CandidateSet(set_id),
            tag: tag.to_string(),
            score: lift,
            decay: None,
            kind: LabelKind::Exploration,
        })
        .collect()
}
