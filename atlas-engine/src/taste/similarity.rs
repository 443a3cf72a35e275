//! IDF-weighted Jaccard similarity
//!
//! ```text
//! sim(A,B) = Σ_{t ∈ A∩B} idf(t)·min(w_A(t), w_B(t))
//!          / Σ_{t ∈ A∪B} idf(t)·max(w_A(t), w_B(t))
//! ```
//! where a tag missing from one side contributes weight 0 on that side.

use crate::tags::{TagProfile, TagReferenceIndex};

/// Similarity plus the number of shared tags (used as a tie-break)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairSimilarity {
    pub similarity: f32,
    pub overlap: u16,
}

impl PairSimilarity {
    pub const NONE: PairSimilarity = PairSimilarity {
        similarity: 0.0,
        overlap: 0,
    };
}

/// Similarity between two ranked profiles
pub fn idf_weighted_jaccard(
    a: &TagProfile,
    b: &TagProfile,
    refs: &TagReferenceIndex,
) -> PairSimilarity {
    let mut numerator = 0.0f32;
    let mut denominator = 0.0f32;
    let mut overlap = 0u16;

    for entry in a.entries() {
        let idf = refs.idf(&entry.name);
        match b.get(&entry.name) {
            Some(other) => {
                numerator += idf * entry.weight.min(other.weight);
                denominator += idf * entry.weight.max(other.weight);
                overlap += 1;
            }
            None => denominator += idf * entry.weight,
        }
    }
    for entry in b.entries() {
        if a.get(&entry.name).is_none() {
            denominator += refs.idf(&entry.name) * entry.weight;
        }
    }

    finish(numerator, denominator, overlap)
}

/// Same formula over profiles pre-sorted by interned tag id.
///
/// `idf` is indexed by tag id. Used by the batch builder.
pub(crate) fn jaccard_sorted(a: &[(u32, f32)], b: &[(u32, f32)], idf: &[f32]) -> PairSimilarity {
    let mut numerator = 0.0f32;
    let mut denominator = 0.0f32;
    let mut overlap = 0u16;
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let (ta, wa) = a[i];
        let (tb, wb) = b[j];
        if ta == tb {
            let w = idf[ta as usize];
            numerator += w * wa.min(wb);
            denominator += w * wa.max(wb);
            overlap += 1;
            i += 1;
            j += 1;
        } else if ta < tb {
            denominator += idf[ta as usize] * wa;
            i += 1;
        } else {
            denominator += idf[tb as usize] * wb;
            j += 1;
        }
    }
    for &(t, w) in &a[i..] {
        denominator += idf[t as usize] * w;
    }
    for &(t, w) in &b[j..] {
        denominator += idf[t as usize] * w;
    }

    finish(numerator, denominator, overlap)
}

fn finish(numerator: f32, denominator: f32, overlap: u16) -> PairSimilarity {
    if overlap == 0 || denominator <= 0.0 {
        return PairSimilarity::NONE;
    }
    PairSimilarity {
        similarity: (numerator / denominator).clamp(0.0, 1.0),
        overlap,
    }
}
