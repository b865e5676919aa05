//! 0/1 knapsack instance.

use serde::{Deserialize, Serialize};

use super::ModelError;

/// One knapsack item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Profit gained by selecting the item.
    pub value: u64,
    /// Capacity consumed by the item.
    pub weight: u64,
}

impl Item {
    /// Value per unit of weight.
    pub fn ratio(&self) -> f64 {
        self.value as f64 / self.weight as f64
    }
}

/// A 0/1 knapsack instance with positive integer weights and values.
///
/// # Examples
///
/// ```
/// use u_ils::models::{Item, KnapsackProblem};
///
/// let p = KnapsackProblem::new(
///     vec![Item { value: 10, weight: 5 }, Item { value: 40, weight: 4 }],
///     10,
/// )
/// .unwrap();
/// assert_eq!(p.num_items(), 2);
/// assert_eq!(p.by_ratio(), vec![1, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct KnapsackProblem {
    name: String,
    items: Vec<Item>,
    capacity: u64,
    known_optimum: Option<u64>,
    by_ratio: Vec<usize>,
    max_ratio: f64,
}

impl KnapsackProblem {
    /// Creates an instance, rejecting zero weights, values or capacity.
    pub fn new(items: Vec<Item>, capacity: u64) -> Result<Self, ModelError> {
        if items.is_empty() {
            return Err(ModelError::Empty);
        }
        if capacity == 0 {
            return Err(ModelError::NonPositiveCapacity);
        }
        if let Some(item) = items.iter().position(|it| it.value == 0 || it.weight == 0) {
            return Err(ModelError::NonPositiveItem { item });
        }

        let mut by_ratio: Vec<usize> = (0..items.len()).collect();
        by_ratio.sort_by(|&a, &b| items[b].ratio().total_cmp(&items[a].ratio()).then(a.cmp(&b)));
        let max_ratio = items.iter().map(Item::ratio).fold(0.0, f64::max);

        Ok(Self {
            name: String::new(),
            items,
            capacity,
            known_optimum: None,
            by_ratio,
            max_ratio,
        })
    }

    /// Sets the instance name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Records the known optimal value.
    pub fn with_known_optimum(mut self, optimum: u64) -> Self {
        self.known_optimum = Some(optimum);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, i: usize) -> Item {
        self.items[i]
    }

    pub fn value(&self, i: usize) -> u64 {
        self.items[i].value
    }

    pub fn weight(&self, i: usize) -> u64 {
        self.items[i].weight
    }

    pub fn ratio(&self, i: usize) -> f64 {
        self.items[i].ratio()
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn known_optimum(&self) -> Option<u64> {
        self.known_optimum
    }

    /// Item indices sorted by decreasing value/weight ratio, ties by index.
    pub fn by_ratio(&self) -> Vec<usize> {
        self.by_ratio.clone()
    }

    /// Same order as [`by_ratio`](Self::by_ratio), without allocating.
    pub fn ratio_order(&self) -> &[usize] {
        &self.by_ratio
    }

    /// Largest value/weight ratio over all items.
    pub fn max_ratio(&self) -> f64 {
        self.max_ratio
    }

    /// Sum of all item weights.
    pub fn total_weight(&self) -> u64 {
        self.items.iter().map(|it| it.weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<Item> {
        vec![
            Item { value: 10, weight: 5 },
            Item { value: 40, weight: 4 },
            Item { value: 30, weight: 6 },
            Item { value: 50, weight: 3 },
        ]
    }

    #[test]
    fn test_ratio_order() {
        let p = KnapsackProblem::new(items(), 10).expect("valid");
        assert_eq!(p.by_ratio(), vec![3, 1, 2, 0]);
        assert!((p.max_ratio() - 50.0 / 3.0).abs() < 1e-12);
        assert_eq!(p.total_weight(), 18);
    }

    #[test]
    fn test_rejects_invalid() {
        assert_eq!(
            KnapsackProblem::new(items(), 0).unwrap_err(),
            ModelError::NonPositiveCapacity
        );
        let mut bad = items();
        bad[2].weight = 0;
        assert_eq!(
            KnapsackProblem::new(bad, 10).unwrap_err(),
            ModelError::NonPositiveItem { item: 2 }
        );
        assert_eq!(KnapsackProblem::new(vec![], 10).unwrap_err(), ModelError::Empty);
    }
}
