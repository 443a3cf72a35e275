//! Bounded top-k selection
//!
//! Used wherever a fan-out is capped: per-tag hub lists, per-type structure
//! neighbors and per-artist taste neighbors. Selection is a partial sort
//! (`select_nth_unstable_by`, linear on average) followed by a sort of the `k`
//! survivors only.

use std::cmp::Ordering;

/// Keep the `k` best items, ordered best-first.
///
/// `better` must be a total order where `Ordering::Less` means "ranks ahead".
/// With a total order the output is deterministic regardless of input order.
pub fn top_k_by<T, F>(mut items: Vec<T>, k: usize, mut better: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if k == 0 {
        return Vec::new();
    }
    if items.len() > k {
        items.select_nth_unstable_by(k - 1, &mut better);
        items.truncate(k);
    }
    items.sort_by(&mut better);
    items
}
