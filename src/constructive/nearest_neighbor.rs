//! Sequential nearest-neighbor route construction.
//!
//! # Algorithm
//!
//! Routes are built one at a time. From the last visited node, the next
//! customer is the unrouted one with the lowest score among those that can be
//! appended without violating capacity, its time window, or the return to
//! the depot. When none qualifies the route is closed and a new one starts.
//!
//! Two scores are provided:
//!
//! - plain distance (`nearest_neighbor`);
//! - Solomon's time-oriented metric
//!   `0.4·d(i,j) + 0.4·T(i,j) + 0.2·v(i,j)` where `T` is the gap between
//!   finishing at `i` and starting at `j`, and `v` is the slack left before
//!   `j`'s window closes (`time_oriented_nearest_neighbor`).
//!
//! A customer that cannot be served even on an empty route still gets a
//! route of its own, so every customer is visited exactly once.
//!
//! # Complexity
//!
//! O(n²) where n = number of customers.
//!
//! # Reference
//!
//! Solomon, M.M. (1987). "Algorithms for the Vehicle Routing and Scheduling
//! Problems with Time Window Constraints", *Operations Research* 35(2), 254-265.

use crate::models::VrptwProblem;
use crate::solution::RoutingSolution;

const DELTA_DISTANCE: f64 = 0.4;
const DELTA_TIME: f64 = 0.4;
const DELTA_URGENCY: f64 = 0.2;

/// State of the route under construction.
struct Tail {
    node: usize,
    /// Departure time from `node`.
    time: f64,
    load: i32,
}

impl Tail {
    fn start() -> Self {
        Self {
            node: 0,
            time: 0.0,
            load: 0,
        }
    }

    /// Service start at `j` if it can be appended feasibly.
    fn try_append(&self, problem: &VrptwProblem, j: usize) -> Option<f64> {
        let customer = problem.customer(j);
        if self.load + customer.demand() > problem.capacity() {
            return None;
        }
        let arrival = self.time + problem.distance(self.node, j);
        if arrival > customer.due() + 1e-9 {
            return None;
        }
        let start = arrival.max(customer.ready());
        let back = start + customer.service_duration() + problem.distance(j, 0);
        (back <= problem.horizon() + 1e-9).then_some(start)
    }
}

fn build_sequentially<F>(problem: &VrptwProblem, score: F) -> RoutingSolution
where
    F: Fn(&Tail, usize, f64) -> f64,
{
    let n = problem.num_customers();
    let mut routed = vec![false; n + 1];
    routed[0] = true;
    let mut remaining = n;
    let mut routes = Vec::new();

    while remaining > 0 {
        let mut tail = Tail::start();
        let mut route = Vec::new();

        loop {
            let mut best: Option<(usize, f64, f64)> = None;
            for j in 1..=n {
                if routed[j] {
                    continue;
                }
                let Some(start) = tail.try_append(problem, j) else {
                    continue;
                };
                let s = score(&tail, j, start);
                if best.is_none_or(|(_, b, _)| s < b) {
                    best = Some((j, s, start));
                }
            }

            let Some((next, _, start)) = best else { break };
            routed[next] = true;
            remaining -= 1;
            route.push(next);
            let customer = problem.customer(next);
            tail = Tail {
                node: next,
                time: start + customer.service_duration(),
                load: tail.load + customer.demand(),
            };
        }

        if route.is_empty() {
            // Nobody fits on an empty vehicle: serve the nearest alone
            let unrouted: Vec<usize> = (1..=n).filter(|&j| !routed[j]).collect();
            let Some(j) = problem.distances().nearest_neighbor(0, &unrouted) else {
                break;
            };
            routed[j] = true;
            remaining -= 1;
            route.push(j);
        }
        routes.push(route);
    }

    RoutingSolution::from_sequences(problem, routes)
}

/// Constructs a solution by always visiting the nearest feasible customer.
///
/// # Examples
///
/// ```
/// use u_ils::models::{Customer, VrptwProblem};
/// use u_ils::constructive::nearest_neighbor;
///
/// let p = VrptwProblem::new(
///     vec![
///         Customer::depot(0.0, 0.0),
///         Customer::new(1, 1.0, 0.0, 10, 0.0),
///         Customer::new(2, 2.0, 0.0, 10, 0.0),
///         Customer::new(3, 3.0, 0.0, 10, 0.0),
///     ],
///     30,
///     1,
/// )
/// .unwrap();
/// let solution = nearest_neighbor(&p);
/// assert_eq!(solution.num_served(), 3);
/// assert!(solution.unassigned().is_empty());
/// ```
pub fn nearest_neighbor(problem: &VrptwProblem) -> RoutingSolution {
    build_sequentially(problem, |tail, j, _| problem.distance(tail.node, j))
}

/// Constructs a solution with Solomon's time-oriented nearest-neighbor
/// metric.
pub fn time_oriented_nearest_neighbor(problem: &VrptwProblem) -> RoutingSolution {
    build_sequentially(problem, |tail, j, start| {
        let d = problem.distance(tail.node, j);
        let gap = start - tail.time;
        let urgency = problem.customer(j).due() - (tail.time + d);
        let urgency = if urgency.is_finite() { urgency } else { 0.0 };
        DELTA_DISTANCE * d + DELTA_TIME * gap + DELTA_URGENCY * urgency
    })
}
