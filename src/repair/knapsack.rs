use crate::constructive::fill_from;
use crate::models::KnapsackProblem;
use crate::solution::KnapsackAssignment;

/// Deselects selected items from the worst value/weight ratio up until the
/// load fits. A feasible input comes back unchanged.
///
/// # Examples
///
/// ```
/// use u_ils::models::{Item, KnapsackProblem};
/// use u_ils::repair::remove_lowest_ratio;
/// use u_ils::solution::KnapsackAssignment;
///
/// let p = KnapsackProblem::new(
///     vec![Item { value: 10, weight: 5 }, Item { value: 40, weight: 4 }],
///     6,
/// )
/// .unwrap();
/// let full = KnapsackAssignment::from_selection(&p, vec![true, true]);
/// let fixed = remove_lowest_ratio(&p, &full);
/// assert_eq!(fixed.selected_items(), vec![1]);
/// ```
pub fn remove_lowest_ratio(problem: &KnapsackProblem, assignment: &KnapsackAssignment) -> KnapsackAssignment {
    let mut next = assignment.clone();
    for &i in problem.ratio_order().iter().rev() {
        if next.is_feasible() {
            break;
        }
        if next.is_selected(i) {
            next.deselect(problem, i);
        }
    }
    next
}

/// Rebuilds from an empty knapsack: the currently selected items by ratio
/// first, then every other item by ratio, each added when it fits.
pub fn greedy_refill(problem: &KnapsackProblem, assignment: &KnapsackAssignment) -> KnapsackAssignment {
    let order = problem.ratio_order();
    let kept: Vec<usize> = order.iter().copied().filter(|&i| assignment.is_selected(i)).collect();
    let mut next = KnapsackAssignment::empty(problem);
    fill_from(problem, &mut next, &kept);
    fill_from(problem, &mut next, order);
    next
}
