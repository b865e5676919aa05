//! Move evaluation shared by every VRPTW neighborhood.
//!
//! A neighborhood only enumerates moves as the new sequences of the routes
//! it touches. [`RoutingNeighborhood`] prices each move from the cached
//! totals of the current solution plus a re-measure of those routes, and
//! materializes the winner through [`RoutingSolution::replace_routes`].
//!
//! When the current solution is feasible, a move can only improve by
//! shortening the touched routes or by emptying one of them, so every other
//! move is discarded on its distance alone before timing is checked.

use rand::Rng;

use super::Neighborhood;
use crate::evaluation::{Fitness, RouteEvaluator};
use crate::models::VrptwProblem;
use crate::solution::RoutingSolution;

/// Distance gains below this are treated as noise.
const IMPROVEMENT_EPS: f64 = 1e-9;

/// A route index and its new customer sequence (empty to drop the route).
pub type RouteChange = (usize, Vec<usize>);

/// Enumerates the moves of one VRPTW neighborhood.
pub trait RouteMoves {
    /// Calls `visit` with the changed routes of every move, in a fixed
    /// order. Stops as soon as `visit` returns `true`.
    fn scan<F>(&self, routes: &[Vec<usize>], visit: F)
    where
        F: FnMut(&[(usize, &[usize])]) -> bool;

    /// Changed routes of one randomly sampled move.
    fn sample<R: Rng>(&self, routes: &[Vec<usize>], rng: &mut R) -> Option<Vec<RouteChange>>;
}

/// Strictly better, with distance differences below [`IMPROVEMENT_EPS`]
/// ignored.
fn clearly_better(a: &Fitness, b: &Fitness) -> bool {
    if a.violations != b.violations {
        return a.violations < b.violations;
    }
    if a.primary != b.primary {
        return a.primary < b.primary;
    }
    a.secondary < b.secondary - IMPROVEMENT_EPS
}

/// Adapts a [`RouteMoves`] enumerator to [`Neighborhood`].
///
/// # Examples
///
/// ```
/// use u_ils::local_search::{Neighborhood, RoutingNeighborhood, TwoOpt};
/// use u_ils::models::{Customer, VrptwProblem};
/// use u_ils::solution::RoutingSolution;
///
/// let p = VrptwProblem::new(
///     vec![
///         Customer::depot(0.0, 0.0),
///         Customer::new(1, 1.0, 0.0, 10, 0.0),
///         Customer::new(2, 1.0, 1.0, 10, 0.0),
///         Customer::new(3, 0.0, 1.0, 10, 0.0),
///     ],
///     100,
///     1,
/// )
/// .unwrap();
/// // Around the unit square, 1 → 3 → 2 crosses itself.
/// let start = RoutingSolution::from_sequences(&p, vec![vec![1, 3, 2]]);
/// assert!((start.total_distance() - (2.0 + 2.0 * 2f64.sqrt())).abs() < 1e-10);
/// let better = RoutingNeighborhood::new(&p, TwoOpt)
///     .improving(&start, false)
///     .unwrap();
/// assert!((better.total_distance() - 4.0).abs() < 1e-10);
/// ```
pub struct RoutingNeighborhood<'a, M> {
    problem: &'a VrptwProblem,
    moves: M,
}

impl<'a, M: RouteMoves> RoutingNeighborhood<'a, M> {
    pub fn new(problem: &'a VrptwProblem, moves: M) -> Self {
        Self { problem, moves }
    }
}

impl<M: RouteMoves> Neighborhood for RoutingNeighborhood<'_, M> {
    type Solution = RoutingSolution;

    fn improving(&self, current: &RoutingSolution, first: bool) -> Option<RoutingSolution> {
        let eval = RouteEvaluator::new(self.problem);
        let sequences = current.sequences();
        let routes = current.routes();
        let feasible = current.is_feasible();
        let violations = current.violations();
        let total = current.total_distance();

        let mut best_fit = current.fitness();
        let mut best: Option<Vec<RouteChange>> = None;

        self.moves.scan(&sequences, |changes| {
            let old_dist: f64 = changes.iter().map(|&(r, _)| routes[r].total_distance()).sum();
            let emptied = changes.iter().filter(|(_, s)| s.is_empty()).count();
            if feasible && emptied == 0 {
                let new_dist: f64 = changes.iter().map(|&(_, s)| eval.distance(s)).sum();
                if new_dist - old_dist >= -IMPROVEMENT_EPS {
                    return false;
                }
            }

            let old_viol: usize = changes.iter().map(|&(r, _)| routes[r].violations()).sum();
            let mut new_viol = 0;
            let mut new_dist = 0.0;
            for &(_, s) in changes {
                let m = eval.measure(s);
                new_viol += m.violations;
                new_dist += m.distance;
            }
            let candidate = Fitness::routing(
                (violations - old_viol + new_viol) as u64,
                current.num_routes() - emptied,
                total - old_dist + new_dist,
            );

            if clearly_better(&candidate, &best_fit) {
                best_fit = candidate;
                best = Some(changes.iter().map(|&(r, s)| (r, s.to_vec())).collect());
                return first;
            }
            false
        });

        best.map(|changes| current.replace_routes(self.problem, &changes))
    }

    fn random<R: Rng>(&self, current: &RoutingSolution, rng: &mut R) -> Option<RoutingSolution> {
        let changes = self.moves.sample(&current.sequences(), rng)?;
        Some(current.replace_routes(self.problem, &changes))
    }
}

/// Indices of routes with at least `min_len` customers.
pub(super) fn routes_with_len(routes: &[Vec<usize>], min_len: usize) -> Vec<usize> {
    (0..routes.len()).filter(|&r| routes[r].len() >= min_len).collect()
}

/// Two distinct route indices, in random order.
pub(super) fn two_routes<R: Rng>(eligible: &[usize], rng: &mut R) -> Option<(usize, usize)> {
    if eligible.len() < 2 {
        return None;
    }
    let x = rng.random_range(0..eligible.len());
    let mut y = rng.random_range(0..eligible.len() - 1);
    if y >= x {
        y += 1;
    }
    Some((eligible[x], eligible[y]))
}
