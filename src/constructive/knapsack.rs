//! Greedy knapsack constructors.
//!
//! Each scans items in its own order and adds every item that still fits,
//! so the result is always feasible.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::KnapsackProblem;
use crate::solution::KnapsackAssignment;

/// Adds items in `order` whenever they fit in the remaining capacity.
pub fn greedy_fill(problem: &KnapsackProblem, order: &[usize]) -> KnapsackAssignment {
    let mut assignment = KnapsackAssignment::empty(problem);
    fill_from(problem, &mut assignment, order);
    assignment
}

/// Extends an assignment with the items of `order` that still fit.
pub fn fill_from(problem: &KnapsackProblem, assignment: &mut KnapsackAssignment, order: &[usize]) {
    for &i in order {
        if !assignment.is_selected(i) && problem.weight(i) <= assignment.residual() {
            assignment.flip(problem, i);
        }
    }
}

/// Most valuable items first.
pub fn by_value(problem: &KnapsackProblem) -> KnapsackAssignment {
    let mut order: Vec<usize> = (0..problem.num_items()).collect();
    order.sort_by(|&a, &b| problem.value(b).cmp(&problem.value(a)).then(a.cmp(&b)));
    greedy_fill(problem, &order)
}

/// Lightest items first.
pub fn by_weight(problem: &KnapsackProblem) -> KnapsackAssignment {
    let mut order: Vec<usize> = (0..problem.num_items()).collect();
    order.sort_by(|&a, &b| problem.weight(a).cmp(&problem.weight(b)).then(a.cmp(&b)));
    greedy_fill(problem, &order)
}

/// Highest value/weight ratio first (Dantzig's greedy).
///
/// # Examples
///
/// ```
/// use u_ils::models::{Item, KnapsackProblem};
/// use u_ils::constructive::by_ratio;
///
/// let p = KnapsackProblem::new(
///     vec![
///         Item { value: 10, weight: 5 },
///         Item { value: 40, weight: 4 },
///         Item { value: 30, weight: 6 },
///         Item { value: 50, weight: 3 },
///     ],
///     10,
/// )
/// .unwrap();
/// let a = by_ratio(&p);
/// assert_eq!(a.value(), 90);
/// assert_eq!(a.weight(), 7);
/// ```
pub fn by_ratio(problem: &KnapsackProblem) -> KnapsackAssignment {
    greedy_fill(problem, problem.ratio_order())
}

/// Items in a uniformly random order.
pub fn random_fill<R: Rng>(problem: &KnapsackProblem, rng: &mut R) -> KnapsackAssignment {
    let mut order: Vec<usize> = (0..problem.num_items()).collect();
    order.shuffle(rng);
    greedy_fill(problem, &order)
}
