//! Index-pair normalization over ordered sequences.

/// Result of extracting a range from a sequence.
///
/// A range collapsing to one position yields the element itself rather than a one-element
/// sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubSlice<T> {
    /// `from == to` after normalization.
    Single(T),
    /// Inclusive sub-sequence in original order.
    Range(Vec<T>),
}

/// Normalize a possibly negative, possibly out-of-bounds index into `[0, len - 1]`.
///
/// Negative indexes count from the end (`-1` is the last element). `len` must be non-zero.
pub fn normalize_index(pos: isize, len: usize) -> usize {
    let last = len.saturating_sub(1);
    if pos < 0 {
        len.checked_sub(pos.unsigned_abs()).unwrap_or(0)
    } else {
        pos.unsigned_abs().min(last)
    }
}

/// Extract the inclusive range `[from, to]` of `items`.
///
/// Both indexes are normalized independently and swapped when `from > to`. Returns `None`
/// for an empty sequence.
pub fn sub_slice<T>(from: isize, to: isize, mut items: Vec<T>) -> Option<SubSlice<T>> {
    if items.is_empty() {
        return None;
    }
    let len = items.len();
    let (mut from, mut to) = (normalize_index(from, len), normalize_index(to, len));
    if from > to {
        std::mem::swap(&mut from, &mut to);
    }
    if from == to {
        return Some(SubSlice::Single(items.swap_remove(from)));
    }
    items.truncate(to + 1);
    items.drain(..from);
    Some(SubSlice::Range(items))
}
