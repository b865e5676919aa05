//! Problem model types for the three supported domains.
//!
//! Provides the instance data with their invariants: undirected graphs for
//! coloring, item lists for the 0/1 knapsack, and customers with demands and
//! time windows for VRPTW, tied together by the [`Problem`] sum type.

mod customer;
mod error;
mod graph;
mod knapsack;
mod problem;
mod vrptw;

pub use customer::{Customer, TimeWindow};
pub use error::ModelError;
pub use graph::GraphProblem;
pub use knapsack::{Item, KnapsackProblem};
pub use problem::{Domain, Problem};
pub use vrptw::VrptwProblem;
