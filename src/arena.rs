//! Arena-backed Pairing Heap priority queue
//!
//! Same algorithm as [`PairingQueue`](crate::pairing::PairingQueue), but the
//! nodes live in a [`SlotMap`] and the child/sibling edges are generational
//! keys instead of boxes.
//!
//! # Characteristics
//! - Contiguous node storage (better cache locality, one allocation for many nodes)
//! - Deep copies are a flat clone of the arena; keys stay valid in the copy
//! - Dropping the queue drops the arena, so no tree walk is ever needed
//! - Merging moves the nodes of the smaller arena into the larger one, which
//!   costs O(min(n, m)) instead of O(1)
//!
//! # Feature Flag
//! Requires the `arena-storage` feature (enabled by default).

use crate::compare::{Compare, Less};
use crate::sweep;
use crate::traits::{CompareError, MeldableHeap, QueueError};
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use smallvec::SmallVec;
use std::convert::Infallible;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

new_key_type! {
    /// Arena key of a queue node
    pub struct NodeKey;
}

#[derive(Debug, Clone)]
struct ArenaNode<T> {
    value: T,
    child: Option<NodeKey>,
    sibling: Option<NodeKey>,
}

/// Pairing heap priority queue storing its nodes in a slotmap arena
///
/// # Example
///
/// ```rust
/// use rust_meldable_heaps::arena::ArenaPairingQueue;
///
/// let mut a: ArenaPairingQueue<i32> = [5, 3, 8, 1].into_iter().collect();
/// let mut b: ArenaPairingQueue<i32> = [10, 2].into_iter().collect();
/// a.merge(&mut b).unwrap();
///
/// assert_eq!(a.top(), Ok(&10));
/// assert_eq!(a.len(), 6);
/// assert!(b.is_empty());
/// ```
pub struct ArenaPairingQueue<T, C = Less> {
    nodes: SlotMap<NodeKey, ArenaNode<T>>,
    root: Option<NodeKey>,
    cmp: C,
}

impl<T: Ord> ArenaPairingQueue<T, Less> {
    /// Creates an empty max-priority queue using natural ordering
    pub fn new() -> Self {
        Self::with_comparator(Less)
    }
}

impl<T, C> ArenaPairingQueue<T, C> {
    /// Creates an empty queue ordered by `cmp`
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            cmp,
        }
    }

    /// Creates an empty queue with room for `capacity` nodes
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
            root: None,
            cmp,
        }
    }

    /// Returns the comparator this queue orders by
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns the number of elements in the queue
    ///
    /// Every live arena slot is a node reachable from the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of nodes the arena can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns the highest-priority element, if any
    pub fn peek(&self) -> Option<&T> {
        self.root
            .and_then(|root| self.nodes.get(root))
            .map(|node| &node.value)
    }

    /// Removes every element, keeping the arena's allocation
    pub fn clear(&mut self) {
        if !self.nodes.is_empty() {
            tracing::trace!(released = self.nodes.len(), "clearing arena queue");
        }
        self.nodes.clear();
        self.root = None;
    }

    /// Iterates over all elements in pre-order (child before sibling)
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            stack: self.root.into_iter().collect(),
            remaining: self.nodes.len(),
        }
    }

    fn children(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        std::iter::successors(self.nodes[key].child, move |&k| self.nodes[k].sibling)
    }

    /// Makes `loser` the new leftmost child of `winner`
    fn adopt(&mut self, winner: NodeKey, loser: NodeKey) {
        let previous = self.nodes[winner].child.replace(loser);
        self.nodes[loser].sibling = previous;
    }

    /// Moves every node of `donor` into this arena and returns the donor's
    /// root under its new key
    fn absorb(
        &mut self,
        donor: &mut SlotMap<NodeKey, ArenaNode<T>>,
        donor_root: NodeKey,
    ) -> Option<NodeKey> {
        let mut remap: SecondaryMap<NodeKey, NodeKey> = SecondaryMap::with_capacity(donor.len());
        let mut moved = Vec::with_capacity(donor.len());
        for (old, node) in donor.drain() {
            let new = self.nodes.insert(node);
            remap.insert(old, new);
            moved.push(new);
        }
        for key in moved {
            let node = &mut self.nodes[key];
            node.child = node.child.and_then(|k| remap.get(k).copied());
            node.sibling = node.sibling.and_then(|k| remap.get(k).copied());
        }
        remap.get(donor_root).copied()
    }
}

impl<T> ArenaPairingQueue<T, Less> {
    /// Creates an empty natural-order queue with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, Less)
    }
}

impl<T, C: Compare<T>> ArenaPairingQueue<T, C> {
    /// Returns the highest-priority element
    ///
    /// # Errors
    /// [`QueueError::ContainerIsEmpty`] if the queue is empty.
    pub fn top(&self) -> Result<&T, CompareError<T, C>> {
        self.peek().ok_or(QueueError::ContainerIsEmpty)
    }

    /// Inserts an element
    ///
    /// # Errors
    /// [`QueueError::Compare`] if the comparator fails; nothing is inserted.
    pub fn push(&mut self, value: T) -> Result<(), CompareError<T, C>> {
        let new_wins = match self.peek() {
            Some(top) => sweep::right_wins(&self.cmp, top, &value).map_err(QueueError::Compare)?,
            None => false,
        };

        let key = self.nodes.insert(ArenaNode {
            value,
            child: None,
            sibling: None,
        });
        self.root = match self.root {
            None => Some(key),
            Some(root) if new_wins => {
                self.adopt(key, root);
                Some(key)
            }
            Some(root) => {
                self.adopt(root, key);
                Some(root)
            }
        };
        Ok(())
    }

    /// Removes and returns the highest-priority element
    ///
    /// # Errors
    /// [`QueueError::ContainerIsEmpty`] if the queue is empty,
    /// [`QueueError::Compare`] if the comparator fails (the queue is unchanged).
    pub fn pop(&mut self) -> Result<T, CompareError<T, C>> {
        let root = self.root.ok_or(QueueError::ContainerIsEmpty)?;

        let siblings: Vec<NodeKey> = self.children(root).collect();
        let plan = {
            let values: Vec<&T> = siblings.iter().map(|&k| &self.nodes[k].value).collect();
            sweep::plan_pairing_sweep(&self.cmp, &values).map_err(QueueError::Compare)?
        };

        for &key in &siblings {
            self.nodes[key].sibling = None;
        }
        if let Some(plan) = &plan {
            for link in &plan.links {
                self.adopt(siblings[link.winner], siblings[link.loser]);
            }
        }

        self.root = plan.map(|plan| siblings[plan.root]);
        self.nodes
            .remove(root)
            .map(|node| node.value)
            .ok_or(QueueError::ContainerIsEmpty)
    }

    /// Moves every element of `other` into this queue
    ///
    /// The smaller arena is drained into the larger one; `other` ends up empty
    /// either way. This queue's comparator decides the new top.
    ///
    /// # Errors
    /// [`QueueError::Compare`] if the comparator fails; both queues are
    /// unchanged.
    pub fn merge(&mut self, other: &mut Self) -> Result<(), CompareError<T, C>> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            mem::swap(&mut self.nodes, &mut other.nodes);
            mem::swap(&mut self.root, &mut other.root);
            return Ok(());
        }

        let (Some(a), Some(b)) = (self.peek(), other.peek()) else {
            return Ok(());
        };
        let mut donor_wins = sweep::right_wins(&self.cmp, a, b).map_err(QueueError::Compare)?;

        // keep the larger arena, drain the smaller one
        if other.nodes.len() > self.nodes.len() {
            mem::swap(&mut self.nodes, &mut other.nodes);
            mem::swap(&mut self.root, &mut other.root);
            donor_wins = !donor_wins;
        }

        let absorbed = other.nodes.len();
        let kept_root = self.root;
        let donor_root = match other.root.take() {
            Some(root) => self.absorb(&mut other.nodes, root),
            None => None,
        };
        self.root = match (kept_root, donor_root) {
            (Some(kept), Some(donor)) if donor_wins => {
                self.adopt(donor, kept);
                Some(donor)
            }
            (Some(kept), Some(donor)) => {
                self.adopt(kept, donor);
                Some(kept)
            }
            (kept, donor) => kept.or(donor),
        };
        tracing::trace!(absorbed, len = self.nodes.len(), "merged arena queues");
        Ok(())
    }

    /// Checks the heap property over the whole arena
    ///
    /// Returns `Ok(false)` if some node's child is ordered after it, or if
    /// some arena slot is not reachable from the root exactly once.
    ///
    /// # Errors
    /// Propagates a comparator failure.
    pub fn verify_heap_property(&self) -> Result<bool, C::Error> {
        let mut seen: SecondaryMap<NodeKey, ()> = SecondaryMap::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeKey> = self.root.into_iter().collect();
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                return Ok(false);
            };
            if seen.insert(key, ()).is_some() {
                return Ok(false);
            }
            for child in self.children(key) {
                if self.cmp.less(&node.value, &self.nodes[child].value)? {
                    return Ok(false);
                }
            }
            stack.extend(node.sibling);
            stack.extend(node.child);
        }
        Ok(seen.len() == self.nodes.len())
    }
}

impl<T, C: Compare<T, Error = Infallible>> ArenaPairingQueue<T, C> {
    fn push_infallible(&mut self, value: T) {
        if let Err(QueueError::Compare(never)) = self.push(value) {
            match never {}
        }
    }

    /// Consumes the queue and returns its elements, highest priority first
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.len());
        loop {
            match self.pop() {
                Ok(value) => sorted.push(value),
                Err(QueueError::ContainerIsEmpty) => break,
                Err(QueueError::Compare(never)) => match never {},
            }
        }
        sorted
    }
}

impl<T, C: Compare<T>> MeldableHeap<T> for ArenaPairingQueue<T, C> {
    type Comparator = C;

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn peek(&self) -> Option<&T> {
        ArenaPairingQueue::peek(self)
    }

    fn push(&mut self, value: T) -> Result<(), CompareError<T, C>> {
        ArenaPairingQueue::push(self, value)
    }

    fn pop(&mut self) -> Result<T, CompareError<T, C>> {
        ArenaPairingQueue::pop(self)
    }

    fn merge(&mut self, other: &mut Self) -> Result<(), CompareError<T, C>> {
        ArenaPairingQueue::merge(self, other)
    }

    fn clear(&mut self) {
        ArenaPairingQueue::clear(self)
    }

    fn verify_heap_property(&self) -> Result<bool, C::Error> {
        ArenaPairingQueue::verify_heap_property(self)
    }
}

impl<T: Clone, C: Clone> Clone for ArenaPairingQueue<T, C> {
    fn clone(&self) -> Self {
        tracing::trace!(len = self.nodes.len(), "copying arena queue");
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            cmp: self.cmp.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        tracing::trace!(len = source.nodes.len(), "copying arena queue");
        self.nodes.clone_from(&source.nodes);
        self.root = source.root;
        self.cmp.clone_from(&source.cmp);
    }
}

impl<T, C: Default> Default for ArenaPairingQueue<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: fmt::Debug, C> fmt::Debug for ArenaPairingQueue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaPairingQueue")
            .field("len", &self.nodes.len())
            .field("top", &self.peek())
            .field("elements", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T, C> FromIterator<T> for ArenaPairingQueue<T, C>
where
    C: Compare<T, Error = Infallible> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut queue = Self::with_capacity_and_comparator(iter.size_hint().0, C::default());
        queue.extend(iter);
        queue
    }
}

impl<T, C: Compare<T, Error = Infallible>> Extend<T> for ArenaPairingQueue<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_infallible(value);
        }
    }
}

impl<'a, T, C> IntoIterator for &'a ArenaPairingQueue<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Pre-order iterator over the elements of an [`ArenaPairingQueue`]
pub struct Iter<'a, T> {
    nodes: &'a SlotMap<NodeKey, ArenaNode<T>>,
    stack: SmallVec<[NodeKey; 16]>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.nodes.get(self.stack.pop()?)?;
        self.stack.extend(node.sibling);
        self.stack.extend(node.child);
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
