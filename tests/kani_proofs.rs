//! Kani verification proofs for queue operations
//!
//! Kani is AWS's model checker for Rust. It can verify properties of Rust code
//! by checking all possible executions up to certain bounds.
//!
//! To run these proofs:
//!   cargo kani --tests

#[cfg(kani)]
use rust_meldable_heaps::pairing::PairingQueue;
#[cfg(kani)]
use rust_meldable_heaps::QueueError;

/// Proof that push always increments the length
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_push_increments_len() {
    let mut queue: PairingQueue<u32> = PairingQueue::new();
    queue.push(kani::any()).unwrap();
    let initial_len = queue.len();

    queue.push(kani::any()).unwrap();

    // Post-condition: length must increase by exactly 1
    assert!(queue.len() == initial_len + 1);
}

/// Proof that pop returns the maximum of three pushed values
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_pop_returns_max() {
    let mut queue: PairingQueue<u32> = PairingQueue::new();

    let a: u32 = kani::any();
    let b: u32 = kani::any();
    let c: u32 = kani::any();
    queue.push(a).unwrap();
    queue.push(b).unwrap();
    queue.push(c).unwrap();

    let top = *queue.top().unwrap();
    let popped = queue.pop().unwrap();

    assert!(popped == top);
    assert!(popped >= a && popped >= b && popped >= c);
    assert!(queue.len() == 2);
}

/// Proof that a failing comparator never changes the queue
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_push_failure_is_atomic() {
    let forbidden: u32 = kani::any();
    let cmp = move |a: &u32, b: &u32| {
        if *a == forbidden || *b == forbidden {
            Err(())
        } else {
            Ok(a < b)
        }
    };
    let mut queue = PairingQueue::with_comparator(cmp);

    let first: u32 = kani::any();
    kani::assume(first != forbidden);
    queue.push(first).unwrap();

    let result = queue.push(forbidden);

    assert!(result == Err(QueueError::Compare(())));
    assert!(queue.len() == 1);
    assert!(queue.top() == Ok(&first));
}

/// Proof that merge drains the donor and sums the lengths
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_merge_drains_donor() {
    let mut a: PairingQueue<u32> = PairingQueue::new();
    let mut b: PairingQueue<u32> = PairingQueue::new();

    a.push(kani::any()).unwrap();
    b.push(kani::any()).unwrap();
    b.push(kani::any()).unwrap();

    a.merge(&mut b).unwrap();

    assert!(a.len() == 3);
    assert!(b.is_empty());
    assert!(b.top() == Err(QueueError::ContainerIsEmpty));
}
