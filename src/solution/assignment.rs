//! Knapsack selection bitmap.

use crate::evaluation::Fitness;
use crate::models::KnapsackProblem;

/// Selected items with cached weight and value.
///
/// [`flip`](Self::flip) is O(1). An overweight assignment is penalized
/// linearly: each unit over the capacity costs `max_ratio + 1` in the scalar
/// fitness, more than any item can earn per unit of weight.
///
/// # Examples
///
/// ```
/// use u_ils::models::{Item, KnapsackProblem};
/// use u_ils::solution::KnapsackAssignment;
///
/// let p = KnapsackProblem::new(
///     vec![Item { value: 10, weight: 5 }, Item { value: 40, weight: 4 }],
///     6,
/// )
/// .unwrap();
/// let mut a = KnapsackAssignment::empty(&p);
/// a.flip(&p, 0);
/// a.flip(&p, 1);
/// assert_eq!(a.weight(), 9);
/// assert_eq!(a.overweight(), 3);
/// assert!(!a.is_feasible());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KnapsackAssignment {
    selected: Vec<bool>,
    weight: u64,
    value: u64,
    capacity: u64,
    penalty: f64,
}

impl KnapsackAssignment {
    /// Nothing selected.
    pub fn empty(problem: &KnapsackProblem) -> Self {
        Self {
            selected: vec![false; problem.num_items()],
            weight: 0,
            value: 0,
            capacity: problem.capacity(),
            penalty: problem.max_ratio() + 1.0,
        }
    }

    /// Builds an assignment from a selection bitmap.
    ///
    /// # Panics
    ///
    /// Panics if `selected.len()` differs from the item count.
    pub fn from_selection(problem: &KnapsackProblem, selected: Vec<bool>) -> Self {
        assert_eq!(selected.len(), problem.num_items());
        let mut a = Self::empty(problem);
        for (i, &s) in selected.iter().enumerate() {
            if s {
                a.flip(problem, i);
            }
        }
        a
    }

    /// Toggles item `i`.
    pub fn flip(&mut self, problem: &KnapsackProblem, i: usize) {
        let item = problem.item(i);
        if self.selected[i] {
            self.weight -= item.weight;
            self.value -= item.value;
        } else {
            self.weight += item.weight;
            self.value += item.value;
        }
        self.selected[i] = !self.selected[i];
    }

    /// Selects item `i` if it is not selected yet.
    pub fn select(&mut self, problem: &KnapsackProblem, i: usize) {
        if !self.selected[i] {
            self.flip(problem, i);
        }
    }

    /// Deselects item `i` if it is selected.
    pub fn deselect(&mut self, problem: &KnapsackProblem, i: usize) {
        if self.selected[i] {
            self.flip(problem, i);
        }
    }

    pub fn is_selected(&self, i: usize) -> bool {
        self.selected[i]
    }

    pub fn selection(&self) -> &[bool] {
        &self.selected
    }

    /// Selected item indices, ascending.
    pub fn selected_items(&self) -> Vec<usize> {
        (0..self.selected.len()).filter(|&i| self.selected[i]).collect()
    }

    /// Unselected item indices, ascending.
    pub fn unselected_items(&self) -> Vec<usize> {
        (0..self.selected.len()).filter(|&i| !self.selected[i]).collect()
    }

    pub fn num_selected(&self) -> usize {
        self.selected.iter().filter(|&&s| s).count()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn weight(&self) -> u64 {
        self.weight
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Capacity left, zero when overweight.
    pub fn residual(&self) -> u64 {
        self.capacity.saturating_sub(self.weight)
    }

    /// Weight in excess of the capacity.
    pub fn overweight(&self) -> u64 {
        self.weight.saturating_sub(self.capacity)
    }

    pub fn is_feasible(&self) -> bool {
        self.weight <= self.capacity
    }

    pub fn fitness(&self) -> Fitness {
        self.score(self.weight, self.value)
    }

    /// Fitness the assignment would have with the given totals.
    pub fn score(&self, weight: u64, value: u64) -> Fitness {
        Fitness::knapsack(weight.saturating_sub(self.capacity), value, self.penalty)
    }
}
