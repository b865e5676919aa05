use rand::seq::{index, IndexedRandom};
use rand::Rng;

use super::element_count;
use crate::models::KnapsackProblem;
use crate::solution::KnapsackAssignment;

/// Flips `⌈ρ·n⌉` distinct random items. May overfill the knapsack.
pub fn random_flip<R: Rng>(
    problem: &KnapsackProblem,
    assignment: &KnapsackAssignment,
    rho: f64,
    rng: &mut R,
) -> KnapsackAssignment {
    let mut next = assignment.clone();
    let count = element_count(rho, assignment.len());
    for i in index::sample(rng, assignment.len(), count) {
        next.flip(problem, i);
    }
    next
}

/// Deselects up to `⌈ρ·n⌉` random selected items. Never breaks feasibility.
pub fn destroy_by_removal<R: Rng>(
    problem: &KnapsackProblem,
    assignment: &KnapsackAssignment,
    rho: f64,
    rng: &mut R,
) -> KnapsackAssignment {
    let mut next = assignment.clone();
    let count = element_count(rho, assignment.len());
    let selected = assignment.selected_items();
    for &i in selected.choose_multiple(rng, count) {
        next.deselect(problem, i);
    }
    next
}
