//! Common traits for mergeable priority queues
//!
//! This module provides the error type shared by every queue in the crate and
//! the [`MeldableHeap`] trait implemented by each storage strategy:
//!
//! - [`PairingQueue`](crate::pairing::PairingQueue): boxed nodes, O(1) merge
//! - [`ArenaPairingQueue`](crate::arena::ArenaPairingQueue): slotmap arena,
//!   small-to-large merge (feature `arena-storage`)
//!
//! Unlike `BinaryHeap`, the ordering is not taken from `Ord` directly but from
//! a [`Compare`] strategy value owned by the queue. Comparators may fail, so
//! every operation that compares elements returns a `Result`.

use crate::compare::Compare;
use thiserror::Error;

/// Error type for queue operations
///
/// `E` is the error type of the queue's comparator. For the natural orderings
/// it is [`Infallible`](std::convert::Infallible), so only
/// [`ContainerIsEmpty`](QueueError::ContainerIsEmpty) can actually occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError<E> {
    /// `top` or `pop` was called on an empty queue
    #[error("container is empty")]
    ContainerIsEmpty,
    /// The comparator failed; the queue was left exactly as before the call
    #[error("comparator failed: {0}")]
    Compare(E),
}

/// Error type of a queue whose comparator is `C`
pub type CompareError<T, C> = QueueError<<C as Compare<T>>::Error>;

/// Base trait for mergeable priority queues
///
/// The element exposed by [`peek`](MeldableHeap::peek) is the one the
/// comparator orders last: with the default [`Less`](crate::compare::Less)
/// strategy that is the maximum.
///
/// # Failure guarantee
///
/// [`push`](MeldableHeap::push), [`pop`](MeldableHeap::pop) and
/// [`merge`](MeldableHeap::merge) either succeed or leave every queue involved
/// exactly as it was, including when the comparator fails midway.
///
/// # Example
///
/// ```rust
/// use rust_meldable_heaps::MeldableHeap;
/// use rust_meldable_heaps::pairing::PairingQueue;
///
/// fn drain_all<H: MeldableHeap<i32>>(heap: &mut H) -> Vec<i32> {
///     let mut out = Vec::new();
///     while let Ok(value) = heap.pop() {
///         out.push(value);
///     }
///     out
/// }
///
/// let mut queue: PairingQueue<i32> = [4, 9, 1].into_iter().collect();
/// assert_eq!(drain_all(&mut queue), vec![9, 4, 1]);
/// ```
pub trait MeldableHeap<T> {
    /// The ordering strategy of this queue
    type Comparator: Compare<T>;

    /// Returns the number of elements in the queue
    fn len(&self) -> usize;

    /// Returns true if the queue is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the highest-priority element, if any
    ///
    /// # Time Complexity
    /// O(1)
    fn peek(&self) -> Option<&T>;

    /// Returns the highest-priority element
    ///
    /// # Errors
    /// [`QueueError::ContainerIsEmpty`] if the queue is empty.
    fn top(&self) -> Result<&T, CompareError<T, Self::Comparator>> {
        self.peek().ok_or(QueueError::ContainerIsEmpty)
    }

    /// Inserts an element
    ///
    /// # Errors
    /// [`QueueError::Compare`] if the comparator fails. The element is dropped
    /// and the queue is unchanged.
    ///
    /// # Time Complexity
    /// O(1) worst case.
    fn push(&mut self, value: T) -> Result<(), CompareError<T, Self::Comparator>>;

    /// Removes and returns the highest-priority element
    ///
    /// # Errors
    /// [`QueueError::ContainerIsEmpty`] if the queue is empty,
    /// [`QueueError::Compare`] if the comparator fails (the queue is unchanged).
    ///
    /// # Time Complexity
    /// O(log n) amortized.
    fn pop(&mut self) -> Result<T, CompareError<T, Self::Comparator>>;

    /// Moves every element of `other` into this queue, leaving `other` empty
    ///
    /// # Errors
    /// [`QueueError::Compare`] if the comparator fails; both queues are
    /// unchanged.
    ///
    /// # Time Complexity
    /// O(1) for [`PairingQueue`](crate::pairing::PairingQueue), O(min(n, m))
    /// for [`ArenaPairingQueue`](crate::arena::ArenaPairingQueue).
    fn merge(&mut self, other: &mut Self) -> Result<(), CompareError<T, Self::Comparator>>;

    /// Removes every element
    fn clear(&mut self);

    /// Walks the whole tree and checks that no child is ordered after its
    /// parent and that the node count matches [`len`](MeldableHeap::len)
    ///
    /// # Errors
    /// Propagates a comparator failure.
    fn verify_heap_property(&self) -> Result<bool, <Self::Comparator as Compare<T>>::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn test_error_display() {
        let empty: QueueError<Infallible> = QueueError::ContainerIsEmpty;
        assert_eq!(empty.to_string(), "container is empty");

        let failed: QueueError<&str> = QueueError::Compare("values are unordered");
        assert_eq!(failed.to_string(), "comparator failed: values are unordered");
    }
}
