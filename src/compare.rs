//! Comparator strategies
//!
//! A queue holds its ordering as a value implementing [`Compare`]. The
//! comparator answers one question, "is `a` ordered before `b`?", and the
//! element ordered *last* is the one the queue exposes at the top. With the
//! default [`Less`] strategy the queue therefore behaves as a max-priority
//! queue, like `std::collections::BinaryHeap`.
//!
//! Comparators are allowed to fail. The error type is part of the strategy,
//! so the natural orderings use [`Infallible`] and closures can pick any
//! error they like:
//!
//! ```rust
//! use rust_meldable_heaps::pairing::PairingQueue;
//!
//! #[derive(Debug, PartialEq)]
//! struct Unordered;
//!
//! let cmp = |a: &f64, b: &f64| a.partial_cmp(b).map(|o| o.is_lt()).ok_or(Unordered);
//! let mut queue = PairingQueue::with_comparator(cmp);
//! queue.push(1.5).unwrap();
//! queue.push(2.5).unwrap();
//! assert_eq!(queue.top(), Ok(&2.5));
//! assert!(queue.push(f64::NAN).is_err());
//! assert_eq!(queue.len(), 2);
//! ```

use std::convert::Infallible;

/// A strict weak ordering over `T` that may fail
pub trait Compare<T> {
    /// Error reported when two values cannot be compared
    type Error;

    /// Returns `true` if `a` is ordered strictly before `b`, meaning `b` has
    /// the higher priority.
    fn less(&self, a: &T, b: &T) -> Result<bool, Self::Error>;
}

/// Natural ascending order; the queue exposes its largest element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Less;

impl<T: Ord> Compare<T> for Less {
    type Error = Infallible;

    #[inline]
    fn less(&self, a: &T, b: &T) -> Result<bool, Infallible> {
        Ok(a < b)
    }
}

/// Reversed natural order; the queue exposes its smallest element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Greater;

impl<T: Ord> Compare<T> for Greater {
    type Error = Infallible;

    #[inline]
    fn less(&self, a: &T, b: &T) -> Result<bool, Infallible> {
        Ok(a > b)
    }
}

impl<T, E, F> Compare<T> for F
where
    F: Fn(&T, &T) -> Result<bool, E>,
{
    type Error = E;

    #[inline]
    fn less(&self, a: &T, b: &T) -> Result<bool, E> {
        self(a, b)
    }
}
