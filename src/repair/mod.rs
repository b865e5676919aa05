//! Repair operators.
//!
//! A repair returns a feasible solution whenever the instance allows one.
//!
//! Graph coloring:
//! - [`sequential_resolution`] — Smallest free color for each bad vertex
//! - [`greedy_rebuild`] — DSATUR from scratch when conflicts are dense
//!
//! Knapsack:
//! - [`remove_lowest_ratio`] — Drop worst-ratio items until the load fits
//! - [`greedy_refill`] — Rebuild by ratio, current items first
//!
//! VRPTW:
//! - [`capacity_repair`], [`time_window_repair`], [`greedy_repair`]

mod coloring;
mod knapsack;
mod routing;

pub use coloring::{greedy_rebuild, sequential_resolution, REBUILD_DENSITY};
pub use knapsack::{greedy_refill, remove_lowest_ratio};
pub use routing::{capacity_repair, greedy_repair, time_window_repair};
