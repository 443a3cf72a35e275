//! Identity labels
//!
//! Staged: filter → score → rank.
//! - filter: geo/demographic adjectives, non-sonic tags, ultra-generic tags
//! - score: `tag_count / global_ref_count(tag)`
//! - rank: score desc, tag name asc; keep `top`; decay = `score / score_1`

use std::cmp::Ordering;

use super::{LabelKind, LabelSubject, MacroTag};
use crate::tags::{TagFilter, TagProfile, TagReferenceIndex};

pub fn identity_labels(
    profile: &TagProfile,
    refs: &TagReferenceIndex,
    filter: &TagFilter,
    top: usize,
) -> Vec<MacroTag> {
    let mut scored: Vec<(&str, f32)> = profile
        .entries()
        .iter()
        .filter(|e| !filter.is_label_excluded(&e.name))
        .filter_map(|e| {
            let ref_count = refs.ref_count(&e.name);
            if filter.is_ultra_generic(ref_count) {
                return None;
            }
            Some((e.name.as_str(), e.count as f32 / ref_count.max(1) as f32))
        })
        .filter(|(_, score)| *score > 0.0)
        .collect();

    scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(b.0),
        other => other,
    });
    scored.truncate(top);

    let lead = scored.first().map(|(_, s)| *s).unwrap_or(1.0);
    let subject = LabelSubject::Artist(profile.artist_id());
    scored
        .into_iter()
        .map(|(tag, score)| MacroTag {
            subject,
            tag: tag.to_string(),
            score,
            decay: Some(score / lead),
            kind: LabelKind::Identity,
        })
        .collect()
}
