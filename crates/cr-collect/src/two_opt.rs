//! 2-opt refinement of a single trip.
//!
//! Repeatedly reverses the sub-sequence `order[i..=j]` when that lowers the
//! trip cost.  Road costs may be asymmetric (one-way streets), so every
//! candidate is re-costed in full instead of using the four-edge delta.
//! A reversal is accepted only on a strict improvement, so the trip never
//! gets worse than the greedy order it started from.

use crate::matrix::CostMatrix;

/// Upper bound on full improvement passes per trip.
pub const MAX_TWO_OPT_PASSES: usize = 32;

const IMPROVEMENT_EPS: f64 = 1e-9;

/// Refine `order` in place.  Returns the number of reversals applied.
pub(crate) fn improve(order: &mut [usize], matrix: &CostMatrix<'_>, close: bool) -> usize {
    let n = order.len();
    if n < 2 {
        return 0;
    }

    let mut best = matrix.tour_cost(order, close);
    let mut applied = 0;
    for _ in 0..MAX_TWO_OPT_PASSES {
        let mut improved = false;
        for i in 0..n - 1 {
            for j in i + 1..n {
                order[i..=j].reverse();
                let cost = matrix.tour_cost(order, close);
                if cost + IMPROVEMENT_EPS < best {
                    best = cost;
                    improved = true;
                    applied += 1;
                } else {
                    order[i..=j].reverse();
                }
            }
        }
        if !improved {
            break;
        }
    }
    applied
}
