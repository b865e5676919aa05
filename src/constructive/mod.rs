//! Constructive heuristics for all three domains.
//!
//! Graph coloring (always proper):
//! - [`dsatur`], [`largest_first`], [`smallest_last`], [`random_sequential`], [`rlf`]
//!
//! Knapsack (always feasible):
//! - [`by_value`], [`by_weight`], [`by_ratio`], [`random_fill`]
//!
//! VRPTW (every customer served exactly once):
//! - [`nearest_neighbor`] — Greedy nearest feasible customer, O(n²)
//! - [`time_oriented_nearest_neighbor`] — Solomon's time-oriented metric (1987), O(n²)
//! - [`randomized_insertion`] — Random order, cheapest feasible insertion
//! - [`clarke_wright_savings`] — Clarke-Wright savings (1964), O(n² log n)
//! - [`solomon_i1`] — Solomon's I1 sequential insertion (1987)
//! - [`regret_insertion`] — Regret-2 parallel insertion

mod clarke_wright;
mod coloring;
pub mod insertion;
mod knapsack;
mod nearest_neighbor;
mod regret;
mod solomon_i1;

pub use clarke_wright::clarke_wright_savings;
pub use coloring::{dsatur, greedy_in_order, largest_first, random_sequential, rlf, smallest_last};
pub use insertion::randomized_insertion;
pub use knapsack::{by_ratio, by_value, by_weight, fill_from, greedy_fill, random_fill};
pub use nearest_neighbor::{nearest_neighbor, time_oriented_nearest_neighbor};
pub use regret::regret_insertion;
pub use solomon_i1::solomon_i1;
