//! Mergeable Priority Queues for Rust
//!
//! This crate provides pairing-heap priority queues that can be merged in
//! O(1) and that keep a strong failure guarantee when the user-supplied
//! ordering fails partway through an operation.
//!
//! # Features
//!
//! - **Pairing Queue**: O(1) insert, peek and merge; O(log n) amortized pop
//! - **Arena Pairing Queue**: the same algorithm over a `slotmap` arena; flat
//!   copies and drops, O(min(n, m)) merge (feature `arena-storage`)
//! - **Fallible comparators**: the ordering is a [`Compare`] strategy value
//!   that may return an error; `push`, `pop` and `merge` leave every queue
//!   untouched when it does
//! - **No recursion**: trees may be as deep as the element count; copying and
//!   dropping use explicit work lists
//!
//! # Example
//!
//! ```rust
//! use rust_meldable_heaps::pairing::PairingQueue;
//! use rust_meldable_heaps::QueueError;
//!
//! let mut a: PairingQueue<i32> = [5, 3, 8, 1].into_iter().collect();
//! let mut b: PairingQueue<i32> = [10, 2].into_iter().collect();
//!
//! a.merge(&mut b).unwrap();
//! assert_eq!(a.top(), Ok(&10));
//! assert_eq!(a.len(), 6);
//! assert_eq!(b.len(), 0);
//! assert_eq!(b.pop(), Err(QueueError::ContainerIsEmpty));
//! ```

#[cfg(feature = "arena-storage")]
pub mod arena;
pub mod compare;
pub mod pairing;
mod sweep;
pub mod traits;

// Re-export the main types for convenience
pub use compare::{Compare, Greater, Less};
pub use traits::{CompareError, MeldableHeap, QueueError};
