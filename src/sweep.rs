//! Comparison-only planning of melds
//!
//! Removing the root of a pairing heap turns its child list into a forest
//! that has to be melded back into one tree. Doing that in place interleaves
//! comparator calls with relinking, so a comparator failure in the middle
//! would leave a half-rebuilt forest behind.
//!
//! Instead, the queues first run [`plan_pairing_sweep`] over borrowed
//! references to the sibling roots. The root of every intermediate tree is
//! always one of those siblings, so the whole reduction can be decided by
//! comparing sibling values only. The result is a [`SweepPlan`]: the ordered
//! list of links to perform. Applying it needs no comparisons and cannot
//! fail.
//!
//! The reduction is the classic pairing sweep: meld the siblings two at a time
//! from left to right, then fold the pair winners from right to left, with
//! the accumulated right-hand result as the left meld operand. This is the
//! same tree as the recursive definition
//! `sweep(x, y, rest) = meld(sweep(rest), meld(x, y))`, computed without
//! recursion.

use crate::compare::Compare;
use smallvec::SmallVec;

/// One meld step: `loser` becomes the leftmost child of `winner`
///
/// Indices refer to positions in the sibling slice given to the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Link {
    pub winner: usize,
    pub loser: usize,
}

/// Links to apply in order, and the index of the resulting root
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SweepPlan {
    pub links: Vec<Link>,
    pub root: usize,
}

/// Decides `meld(a, b)`: returns true if `b` wins
///
/// The left operand wins ties.
#[inline]
pub(crate) fn right_wins<T, C: Compare<T>>(cmp: &C, a: &T, b: &T) -> Result<bool, C::Error> {
    cmp.less(a, b)
}

#[inline]
fn decide<T, C: Compare<T>>(cmp: &C, values: &[&T], a: usize, b: usize) -> Result<Link, C::Error> {
    if right_wins(cmp, values[a], values[b])? {
        Ok(Link {
            winner: b,
            loser: a,
        })
    } else {
        Ok(Link {
            winner: a,
            loser: b,
        })
    }
}

/// Plans the pairing sweep over a sibling list
///
/// Returns `Ok(None)` for an empty list. On comparator failure nothing has
/// been decided and the error is returned as-is.
pub(crate) fn plan_pairing_sweep<T, C: Compare<T>>(
    cmp: &C,
    values: &[&T],
) -> Result<Option<SweepPlan>, C::Error> {
    let n = values.len();
    if n == 0 {
        return Ok(None);
    }

    let mut links = Vec::with_capacity(n - 1);
    let mut winners: SmallVec<[usize; 16]> = SmallVec::with_capacity(n / 2);

    // First pass: meld adjacent pairs
    let mut i = 0;
    while i + 1 < n {
        let link = decide(cmp, values, i, i + 1)?;
        links.push(link);
        winners.push(link.winner);
        i += 2;
    }

    // An odd sibling out is the innermost "rest"
    let mut acc = if n % 2 == 1 { Some(n - 1) } else { None };

    // Second pass: fold the pairs from right to left into the rest
    for &pair in winners.iter().rev() {
        acc = Some(match acc {
            None => pair,
            Some(rest) => {
                let link = decide(cmp, values, rest, pair)?;
                links.push(link);
                link.winner
            }
        });
    }

    Ok(acc.map(|root| SweepPlan { links, root }))
}
