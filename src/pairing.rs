//! Pairing Heap priority queue with boxed nodes
//!
//! A pairing heap is a self-adjusting heap-ordered forest with:
//! - O(1) worst-case insert, peek and merge
//! - O(log n) amortized pop
//!
//! No rank or balance metadata is stored. Every node owns its leftmost child
//! and its next sibling, so the forest is encoded as a binary tree of
//! `Option<Box<Node>>` edges. Inserting and merging are a single meld; popping
//! runs the two-pass pairing sweep over the root's children.
//!
//! Trees can become as deep as the number of elements (pushing in ascending
//! order builds a single child chain), so cloning and dropping walk the tree
//! with explicit work lists instead of recursion.
//!
//! # Failure guarantee
//!
//! Comparators are fallible. `push` and `merge` compare once before touching
//! any edge. `pop` plans the whole sweep with
//! [`plan_pairing_sweep`](crate::sweep) over borrowed values and only relinks
//! once the plan is complete, so a failing comparator leaves the queue as it
//! was.

use crate::compare::{Compare, Less};
use crate::sweep::{self, SweepPlan};
use crate::traits::{CompareError, MeldableHeap, QueueError};
use smallvec::SmallVec;
use std::convert::Infallible;
use std::fmt;
use std::iter::FusedIterator;

struct Node<T> {
    value: T,
    child: Option<Box<Node<T>>>,
    sibling: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn leaf(value: T) -> Box<Self> {
        Box::new(Node {
            value,
            child: None,
            sibling: None,
        })
    }

    /// Makes `loser` the new leftmost child
    fn adopt(&mut self, mut loser: Box<Node<T>>) {
        debug_assert!(loser.sibling.is_none());
        loser.sibling = self.child.take();
        self.child = Some(loser);
    }

    fn children(&self) -> impl Iterator<Item = &Node<T>> {
        std::iter::successors(self.child.as_deref(), |node| node.sibling.as_deref())
    }
}

/// Melds two trees whose winner has already been decided
///
/// Never calls the comparator, so it cannot fail.
fn meld<T>(
    a: Option<Box<Node<T>>>,
    b: Option<Box<Node<T>>>,
    b_wins: bool,
) -> Option<Box<Node<T>>> {
    match (a, b) {
        (Some(a), Some(b)) => {
            let (mut winner, loser) = if b_wins { (b, a) } else { (a, b) };
            winner.adopt(loser);
            Some(winner)
        }
        (a, None) => a,
        (None, b) => b,
    }
}

/// Detaches the sibling chain starting at `first` and applies a sweep plan to it
fn apply_plan<T>(first: Option<Box<Node<T>>>, plan: &SweepPlan) -> Option<Box<Node<T>>> {
    let mut slots: Vec<Option<Box<Node<T>>>> = Vec::with_capacity(plan.links.len() + 1);
    let mut next = first;
    while let Some(mut node) = next {
        next = node.sibling.take();
        slots.push(Some(node));
    }

    for link in &plan.links {
        let loser = slots[link.loser].take();
        if let (Some(winner), Some(loser)) = (slots[link.winner].as_mut(), loser) {
            winner.adopt(loser);
        }
    }

    slots[plan.root].take()
}

/// Which edge of the parent entry a cloned node hangs from
#[derive(Clone, Copy)]
enum Edge {
    Child,
    Sibling,
}

/// Deep-copies a tree without recursion
///
/// The source is flattened in pre-order while recording the position of
/// every node's child and sibling. Both edges always point at later entries,
/// so the copy is assembled from the back.
fn clone_tree<T: Clone>(root: &Node<T>) -> Box<Node<T>> {
    struct Entry<'a, T> {
        node: &'a Node<T>,
        child: Option<usize>,
        sibling: Option<usize>,
    }

    let mut entries: Vec<Entry<'_, T>> = Vec::new();
    let mut stack: Vec<(&Node<T>, Option<(usize, Edge)>)> = vec![(root, None)];
    while let Some((node, parent)) = stack.pop() {
        let idx = entries.len();
        match parent {
            Some((p, Edge::Child)) => entries[p].child = Some(idx),
            Some((p, Edge::Sibling)) => entries[p].sibling = Some(idx),
            None => {}
        }
        entries.push(Entry {
            node,
            child: None,
            sibling: None,
        });
        if let Some(sibling) = node.sibling.as_deref() {
            stack.push((sibling, Some((idx, Edge::Sibling))));
        }
        if let Some(child) = node.child.as_deref() {
            stack.push((child, Some((idx, Edge::Child))));
        }
    }

    let mut built: Vec<Option<Box<Node<T>>>> = Vec::with_capacity(entries.len());
    built.resize_with(entries.len(), || None);
    let mut copy = Node::leaf(root.value.clone());
    for (idx, entry) in entries.iter().enumerate().rev() {
        let child = entry.child.and_then(|c| built[c].take());
        let sibling = entry.sibling.and_then(|s| built[s].take());
        if idx == 0 {
            copy.child = child;
            copy.sibling = sibling;
        } else {
            built[idx] = Some(Box::new(Node {
                value: entry.node.value.clone(),
                child,
                sibling,
            }));
        }
    }
    copy
}

/// Releases a tree without recursion
fn release_tree<T>(root: Option<Box<Node<T>>>) {
    let mut stack: Vec<Box<Node<T>>> = root.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        if let Some(child) = node.child.take() {
            stack.push(child);
        }
        if let Some(sibling) = node.sibling.take() {
            stack.push(sibling);
        }
    }
}

/// Pairing heap priority queue
///
/// `C` is the ordering strategy; the element it orders last is at the top.
/// The default [`Less`] makes this a max-priority queue.
///
/// # Example
///
/// ```rust
/// use rust_meldable_heaps::pairing::PairingQueue;
/// use rust_meldable_heaps::QueueError;
///
/// let mut queue: PairingQueue<i32> = PairingQueue::new();
/// assert_eq!(queue.top(), Err(QueueError::ContainerIsEmpty));
///
/// for value in [5, 3, 8, 1] {
///     queue.push(value).unwrap();
/// }
/// assert_eq!(queue.top(), Ok(&8));
/// assert_eq!(queue.pop(), Ok(8));
/// assert_eq!(queue.top(), Ok(&5));
/// ```
pub struct PairingQueue<T, C = Less> {
    root: Option<Box<Node<T>>>,
    len: usize,
    cmp: C,
}

impl<T: Ord> PairingQueue<T, Less> {
    /// Creates an empty max-priority queue using natural ordering
    pub fn new() -> Self {
        Self::with_comparator(Less)
    }
}

impl<T, C> PairingQueue<T, C> {
    /// Creates an empty queue ordered by `cmp`
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            root: None,
            len: 0,
            cmp,
        }
    }

    /// Returns the comparator this queue orders by
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns the number of elements in the queue
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the highest-priority element, if any
    pub fn peek(&self) -> Option<&T> {
        self.root.as_deref().map(|root| &root.value)
    }

    /// Removes every element
    pub fn clear(&mut self) {
        if self.len > 0 {
            tracing::trace!(released = self.len, "clearing pairing queue");
        }
        release_tree(self.root.take());
        self.len = 0;
    }

    /// Iterates over all elements in pre-order (child before sibling)
    ///
    /// The order is deterministic for a given sequence of operations but is
    /// not sorted by priority.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: self.root.as_deref().into_iter().collect(),
            remaining: self.len,
        }
    }
}

impl<T, C: Compare<T>> PairingQueue<T, C> {
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
    /// [`QueueError::Compare`] if the comparator fails against the current
    /// top. The element is dropped and the queue is unchanged.
    pub fn push(&mut self, value: T) -> Result<(), CompareError<T, C>> {
        let new_wins = match self.root.as_deref() {
            Some(root) => sweep::right_wins(&self.cmp, &root.value, &value)
                .map_err(QueueError::Compare)?,
            None => false,
        };
        self.root = meld(self.root.take(), Some(Node::leaf(value)), new_wins);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the highest-priority element
    ///
    /// # Errors
    /// [`QueueError::ContainerIsEmpty`] if the queue is empty.
    /// [`QueueError::Compare`] if the comparator fails while pairing the
    /// children of the old top; the queue is unchanged.
    pub fn pop(&mut self) -> Result<T, CompareError<T, C>> {
        let mut root = self.root.take().ok_or(QueueError::ContainerIsEmpty)?;

        let planned = {
            let siblings: Vec<&T> = root.children().map(|node| &node.value).collect();
            sweep::plan_pairing_sweep(&self.cmp, &siblings)
        };
        let plan = match planned {
            Ok(plan) => plan,
            Err(err) => {
                self.root = Some(root);
                return Err(QueueError::Compare(err));
            }
        };

        let children = root.child.take();
        self.root = match plan {
            Some(plan) => apply_plan(children, &plan),
            None => children,
        };
        self.len -= 1;
        Ok(root.value)
    }

    /// Moves every element of `other` into this queue
    ///
    /// `other` is left as an empty queue that shares nothing with `self`.
    /// This queue's comparator decides the new top.
    ///
    /// # Errors
    /// [`QueueError::Compare`] if the comparator fails; both queues are
    /// unchanged.
    ///
    /// # Time Complexity
    /// O(1)
    pub fn merge(&mut self, other: &mut Self) -> Result<(), CompareError<T, C>> {
        let other_wins = match (self.root.as_deref(), other.root.as_deref()) {
            (Some(a), Some(b)) => {
                sweep::right_wins(&self.cmp, &a.value, &b.value).map_err(QueueError::Compare)?
            }
            _ => false,
        };

        let absorbed = other.len;
        self.root = meld(self.root.take(), other.root.take(), other_wins);
        self.len += absorbed;
        other.len = 0;
        tracing::trace!(absorbed, len = self.len, "merged pairing queues");
        Ok(())
    }

    /// Checks the heap property over the whole tree
    ///
    /// Returns `Ok(false)` if some node's child is ordered after it, or if
    /// the node count disagrees with [`len`](Self::len).
    ///
    /// # Errors
    /// Propagates a comparator failure.
    pub fn verify_heap_property(&self) -> Result<bool, C::Error> {
        let mut count = 0usize;
        let mut stack: Vec<&Node<T>> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            for child in node.children() {
                if self.cmp.less(&node.value, &child.value)? {
                    return Ok(false);
                }
            }
            if let Some(child) = node.child.as_deref() {
                stack.push(child);
            }
            if let Some(sibling) = node.sibling.as_deref() {
                stack.push(sibling);
            }
        }
        Ok(count == self.len)
    }
}

impl<T, C: Compare<T, Error = Infallible>> PairingQueue<T, C> {
    fn push_infallible(&mut self, value: T) {
        if let Err(QueueError::Compare(never)) = self.push(value) {
            match never {}
        }
    }

    /// Consumes the queue and returns its elements, highest priority first
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.len);
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

impl<T, C: Compare<T>> MeldableHeap<T> for PairingQueue<T, C> {
    type Comparator = C;

    fn len(&self) -> usize {
        self.len
    }

    fn peek(&self) -> Option<&T> {
        PairingQueue::peek(self)
    }

    fn push(&mut self, value: T) -> Result<(), CompareError<T, C>> {
        PairingQueue::push(self, value)
    }

    fn pop(&mut self) -> Result<T, CompareError<T, C>> {
        PairingQueue::pop(self)
    }

    fn merge(&mut self, other: &mut Self) -> Result<(), CompareError<T, C>> {
        PairingQueue::merge(self, other)
    }

    fn clear(&mut self) {
        PairingQueue::clear(self)
    }

    fn verify_heap_property(&self) -> Result<bool, C::Error> {
        PairingQueue::verify_heap_property(self)
    }
}

impl<T, C> Drop for PairingQueue<T, C> {
    fn drop(&mut self) {
        release_tree(self.root.take());
    }
}

impl<T: Clone, C: Clone> Clone for PairingQueue<T, C> {
    fn clone(&self) -> Self {
        tracing::trace!(len = self.len, "deep-copying pairing queue");
        Self {
            root: self.root.as_deref().map(clone_tree),
            len: self.len,
            cmp: self.cmp.clone(),
        }
    }

    /// Assignment: releases this queue's nodes, then copies `source`
    fn clone_from(&mut self, source: &Self) {
        self.clear();
        tracing::trace!(len = source.len, "deep-copying pairing queue");
        self.root = source.root.as_deref().map(clone_tree);
        self.len = source.len;
        self.cmp = source.cmp.clone();
    }
}

impl<T, C: Default> Default for PairingQueue<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: fmt::Debug, C> fmt::Debug for PairingQueue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairingQueue")
            .field("len", &self.len)
            .field("top", &self.peek())
            .field("elements", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T, C> FromIterator<T> for PairingQueue<T, C>
where
    C: Compare<T, Error = Infallible> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Self::default();
        queue.extend(iter);
        queue
    }
}

impl<T, C: Compare<T, Error = Infallible>> Extend<T> for PairingQueue<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_infallible(value);
        }
    }
}

impl<'a, T, C> IntoIterator for &'a PairingQueue<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Pre-order iterator over the elements of a [`PairingQueue`]
pub struct Iter<'a, T> {
    stack: SmallVec<[&'a Node<T>; 16]>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.stack.pop()?;
        if let Some(sibling) = node.sibling.as_deref() {
            self.stack.push(sibling);
        }
        if let Some(child) = node.child.as_deref() {
            self.stack.push(child);
        }
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Greater;
    use std::cell::Cell;

    /// Pre-order (value, has child, has sibling); determines the tree shape
    fn shape<T: Clone, C>(queue: &PairingQueue<T, C>) -> Vec<(T, bool, bool)> {
        let mut out = Vec::new();
        let mut stack: Vec<&Node<T>> = queue.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            out.push((node.value.clone(), node.child.is_some(), node.sibling.is_some()));
            if let Some(sibling) = node.sibling.as_deref() {
                stack.push(sibling);
            }
            if let Some(child) = node.child.as_deref() {
                stack.push(child);
            }
        }
        out
    }

    #[test]
    fn test_basic_operations() {
        let mut queue = PairingQueue::new();
        assert!(queue.is_empty());

        for value in [5, 3, 8, 1] {
            queue.push(value).unwrap();
        }
        assert_eq!(queue.len(), 4);

        let mut tops = Vec::new();
        while let Some(&top) = queue.peek() {
            tops.push(top);
            queue.pop().unwrap();
        }
        assert_eq!(tops, vec![8, 5, 3, 1]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_empty_errors() {
        let mut queue: PairingQueue<i32> = PairingQueue::new();
        assert_eq!(queue.top(), Err(QueueError::ContainerIsEmpty));
        assert_eq!(queue.pop(), Err(QueueError::ContainerIsEmpty));

        queue.push(4).unwrap();
        assert_eq!(queue.top(), Ok(&4));
        assert_eq!(queue.pop(), Ok(4));
    }

    #[test]
    fn test_min_queue() {
        let mut queue = PairingQueue::with_comparator(Greater);
        for value in [5, 3, 8, 1] {
            queue.push(value).unwrap();
        }
        assert_eq!(queue.into_sorted_vec(), vec![1, 3, 5, 8]);
    }

    #[test]
    fn test_meld_shape() {
        let mut queue = PairingQueue::new();
        queue.push(5).unwrap();
        queue.push(3).unwrap();
        queue.push(8).unwrap();
        // 8 adopts 5, which already holds 3
        assert_eq!(
            shape(&queue),
            vec![(8, true, false), (5, true, false), (3, false, false)]
        );

        queue.push(6).unwrap();
        // 6 becomes the leftmost child of 8
        assert_eq!(
            shape(&queue),
            vec![
                (8, true, false),
                (6, false, true),
                (5, true, false),
                (3, false, false)
            ]
        );
    }

    #[test]
    fn test_equal_elements_keep_root() {
        let mut queue = PairingQueue::with_comparator(|a: &(i32, char), b: &(i32, char)| {
            Ok::<_, Infallible>(a.0 < b.0)
        });
        queue.push((1, 'a')).unwrap();
        queue.push((1, 'b')).unwrap();
        assert_eq!(queue.top(), Ok(&(1, 'a')));
    }

    #[test]
    fn test_merge() {
        let mut a: PairingQueue<i32> = [5, 3, 8, 1].into_iter().collect();
        let mut b: PairingQueue<i32> = [10, 2].into_iter().collect();

        a.merge(&mut b).unwrap();
        assert_eq!(a.top(), Ok(&10));
        assert_eq!(a.len(), 6);
        assert_eq!(b.len(), 0);
        assert!(b.peek().is_none());
        assert!(a.verify_heap_property().unwrap());

        b.push(7).unwrap();
        assert_eq!(b.top(), Ok(&7));
        assert_eq!(a.into_sorted_vec(), vec![10, 8, 5, 3, 2, 1]);
    }

    #[test]
    fn test_merge_with_empty() {
        let mut a: PairingQueue<i32> = PairingQueue::new();
        let mut b: PairingQueue<i32> = [4, 9].into_iter().collect();
        a.merge(&mut b).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.top(), Ok(&9));

        let mut empty = PairingQueue::new();
        a.merge(&mut empty).unwrap();
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_clone_independence() {
        let a: PairingQueue<i32> = [5, 3, 8, 1].into_iter().collect();
        let mut a2 = a.clone();
        assert_eq!(shape(&a), shape(&a2));

        a2.pop().unwrap();
        assert_eq!(a.len(), 4);
        assert_eq!(a.top(), Ok(&8));
        assert_eq!(a2.top(), Ok(&5));
    }

    #[test]
    fn test_clone_from_replaces_contents() {
        let source: PairingQueue<i32> = [1, 2, 3].into_iter().collect();
        let mut target: PairingQueue<i32> = [40, 50].into_iter().collect();
        target.clone_from(&source);
        assert_eq!(target.len(), 3);
        assert_eq!(shape(&target), shape(&source));
        assert_eq!(target.into_sorted_vec(), vec![3, 2, 1]);
    }

    #[test]
    fn test_iter_visits_every_element() {
        let queue: PairingQueue<i32> = (0..50).collect();
        let mut seen: Vec<i32> = queue.iter().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
        assert_eq!(queue.iter().len(), 50);
    }

    #[test]
    fn test_push_failure_leaves_queue_unchanged() {
        let cmp = |a: &i32, b: &i32| {
            if (*a, *b) == (8, 13) {
                Err("refused")
            } else {
                Ok(a < b)
            }
        };
        let mut queue = PairingQueue::with_comparator(cmp);
        for value in [5, 3, 8, 1] {
            queue.push(value).unwrap();
        }
        let before = shape(&queue);

        assert_eq!(queue.push(13), Err(QueueError::Compare("refused")));
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.top(), Ok(&8));
        assert_eq!(shape(&queue), before);
    }

    #[test]
    fn test_pop_failure_leaves_queue_unchanged() {
        // the children of 9 are compared while pairing; 2 vs 4 is refused
        let cmp = |a: &i32, b: &i32| {
            if (*a == 2 && *b == 4) || (*a == 4 && *b == 2) {
                Err("refused")
            } else {
                Ok(a < b)
            }
        };
        let mut queue = PairingQueue::with_comparator(cmp);
        for value in [9, 1, 2, 3, 4] {
            queue.push(value).unwrap();
        }
        let before = shape(&queue);

        assert_eq!(queue.pop(), Err(QueueError::Compare("refused")));
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.top(), Ok(&9));
        assert_eq!(shape(&queue), before);
    }

    #[test]
    fn test_merge_failure_leaves_both_unchanged() {
        let cmp = |a: &i32, b: &i32| {
            if (*a, *b) == (8, 10) {
                Err("refused")
            } else {
                Ok(a < b)
            }
        };
        let mut a = PairingQueue::with_comparator(cmp);
        let mut b = PairingQueue::with_comparator(cmp);
        for value in [5, 3, 8, 1] {
            a.push(value).unwrap();
        }
        for value in [10, 2] {
            b.push(value).unwrap();
        }
        let (shape_a, shape_b) = (shape(&a), shape(&b));

        assert_eq!(a.merge(&mut b), Err(QueueError::Compare("refused")));
        assert_eq!((a.len(), b.len()), (4, 2));
        assert_eq!(shape(&a), shape_a);
        assert_eq!(shape(&b), shape_b);
    }

    #[test]
    fn test_stateful_comparator() {
        let calls = Cell::new(0usize);
        let counting = |a: &i32, b: &i32| {
            calls.set(calls.get() + 1);
            Ok::<_, Infallible>(a < b)
        };
        let mut queue = PairingQueue::with_comparator(&counting);
        queue.push(1).unwrap();
        assert_eq!(calls.get(), 0);
        queue.push(2).unwrap();
        assert_eq!(calls.get(), 1);
        queue.merge(&mut PairingQueue::with_comparator(&counting)).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_deep_chain_clone_and_drop() {
        // ascending pushes build a single child chain
        let queue: PairingQueue<u32> = (0..200_000).collect();
        let copy = queue.clone();
        assert_eq!(copy.len(), 200_000);
        assert_eq!(copy.top(), Ok(&199_999));
        drop(queue);
        drop(copy);
    }

    #[test]
    fn test_clear() {
        let mut queue: PairingQueue<i32> = (0..10).collect();
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.top(), Err(QueueError::ContainerIsEmpty));
        queue.push(3).unwrap();
        assert_eq!(queue.len(), 1);
    }
}
