//! Perturbation operators.
//!
//! A perturbation kicks the current solution out of its basin; the result may
//! be infeasible and is usually followed by a repair or a local search. The
//! intensity ρ ∈ (0, 1] is always a fraction of domain elements (vertices,
//! items or customers; routes for the route-level VRPTW moves), rounded up.
//!
//! Graph coloring:
//! - [`random_recolor`], [`partial_destroy`]
//!
//! Knapsack:
//! - [`random_flip`], [`destroy_by_removal`]
//!
//! VRPTW:
//! - [`ejection_chain`], [`ruin_and_recreate`], [`random_removal`],
//!   [`route_elimination`]

mod coloring;
mod knapsack;
mod routing;

pub use coloring::{partial_destroy, random_recolor};
pub use knapsack::{destroy_by_removal, random_flip};
pub use routing::{ejection_chain, random_removal, route_elimination, ruin_and_recreate};

/// Number of elements touched at intensity `rho` out of `n`: `⌈ρ·n⌉`,
/// clamped to `1..=n` (0 when `n` is 0).
///
/// # Examples
///
/// ```
/// use u_ils::perturbation::element_count;
///
/// assert_eq!(element_count(0.3, 10), 3);
/// assert_eq!(element_count(0.25, 10), 3);
/// assert_eq!(element_count(0.01, 10), 1);
/// assert_eq!(element_count(1.0, 0), 0);
/// ```
pub fn element_count(rho: f64, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    // Guards 0.3 · 10 = 3.0000000000000004 from rounding up to 4
    let raw = rho * n as f64 - 1e-9;
    (raw.ceil().max(1.0) as usize).min(n)
}
