//! Dense Ordering Primitives
//!
//! Pure sequence operations that keep the `order` of sibling elements equal
//! to exactly 0..n-1. The reorder service commits with these and the client
//! mirror predicts with them, so both sides place an element identically.

/// An element with a zero-based position among its siblings
pub trait Ordered {
    /// Identity used to find the element inside a sequence
    type Key: Copy + PartialEq;

    fn key(&self) -> Self::Key;
    fn order(&self) -> i32;
    fn set_order(&mut self, order: i32);
}

/// Clamp an arbitrary requested index into `[0, len]`.
///
/// `len` itself is valid so that inserting at the very end is always allowed.
pub fn clamp_index(index: i64, len: usize) -> usize {
    if index <= 0 {
        0
    } else {
        (index as u64).min(len as u64) as usize
    }
}

/// Find the current position of `key` in `seq`
pub fn position_of<T: Ordered>(seq: &[T], key: T::Key) -> Option<usize> {
    seq.iter().position(|e| e.key() == key)
}

/// Move `key` to `target` within a single sequence.
///
/// The element is removed first, the index is clamped into the remaining
/// length, the element is inserted there and the whole sequence is
/// renumbered. Returns the final index, or `None` when `key` is absent.
pub fn reposition<T: Ordered>(seq: &mut Vec<T>, key: T::Key, target: i64) -> Option<usize> {
    let from = position_of(seq, key)?;
    let moving = seq.remove(from);
    let index = clamp_index(target, seq.len());
    seq.insert(index, moving);
    renumber(seq);
    Some(index)
}

/// Move `key` out of `source` and into `target` at `target_index`.
///
/// Both sequences are renumbered. Returns the final index in `target`, or
/// `None` when `key` is not in `source`.
pub fn transfer<T: Ordered>(
    source: &mut Vec<T>,
    target: &mut Vec<T>,
    key: T::Key,
    target_index: i64,
) -> Option<usize> {
    let from = position_of(source, key)?;
    let moving = source.remove(from);
    let index = clamp_index(target_index, target.len());
    target.insert(index, moving);
    renumber(source);
    renumber(target);
    Some(index)
}

/// Rewrite every element's order to its position. Returns how many changed.
pub fn renumber<T: Ordered>(seq: &mut [T]) -> usize {
    let mut changed = 0;
    for (pos, element) in seq.iter_mut().enumerate() {
        let pos = pos as i32;
        if element.order() != pos {
            element.set_order(pos);
            changed += 1;
        }
    }
    changed
}

/// Stable sort by current order; ties keep their relative position
pub fn sort_by_order<T: Ordered>(seq: &mut [T]) {
    seq.sort_by_key(|e| e.order());
}

/// True when `orders` is exactly the set {0, .., n-1}
pub fn is_dense<I: IntoIterator<Item = i32>>(orders: I) -> bool {
    let mut seen: Vec<i32> = orders.into_iter().collect();
    seen.sort_unstable();
    seen.iter()
        .enumerate()
        .all(|(pos, order)| i64::from(*order) == pos as i64)
}
