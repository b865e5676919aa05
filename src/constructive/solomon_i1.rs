//! Solomon's I1 insertion heuristic for VRPTW.
//!
//! # Algorithm
//!
//! Routes are built one at a time, each seeded with the unrouted customer
//! farthest from the depot. For every unrouted customer u and every feasible
//! position between i and j the insertion cost is
//!
//! ```text
//! c11(i,u,j) = d(i,u) + d(u,j) - μ·d(i,j)
//! c12(i,u,j) = b'_j - b_j                 (push-forward of j's service start)
//! c1(i,u,j)  = α₁·c11 + α₂·c12
//! ```
//!
//! Each customer's best position minimizes c1. Among customers, the one
//! maximizing `c2(u) = λ·d(0,u) - c1(u)` is inserted. When no customer can
//! be inserted feasibly the route is closed.
//!
//! Parameters: μ = 1, λ = 2, α₁ = α₂ = 0.5.
//!
//! # Complexity
//!
//! O(n² · L²) where n = customers and L the longest route.
//!
//! # Reference
//!
//! Solomon, M.M. (1987). "Algorithms for the Vehicle Routing and Scheduling
//! Problems with Time Window Constraints", *Operations Research* 35(2), 254-265.

use crate::evaluation::RouteEvaluator;
use crate::models::VrptwProblem;
use crate::solution::RoutingSolution;

const MU: f64 = 1.0;
const LAMBDA: f64 = 2.0;
const ALPHA_1: f64 = 0.5;
const ALPHA_2: f64 = 0.5;

/// Constructs a VRPTW solution using Solomon's I1 insertion heuristic.
///
/// # Examples
///
/// ```
/// use u_ils::models::{Customer, TimeWindow, VrptwProblem};
/// use u_ils::constructive::solomon_i1;
///
/// let p = VrptwProblem::new(
///     vec![
///         Customer::depot(0.0, 0.0),
///         Customer::new(1, 1.0, 0.0, 10, 2.0)
///             .with_time_window(TimeWindow::new(0.0, 20.0).unwrap()),
///         Customer::new(2, 2.0, 0.0, 10, 2.0)
///             .with_time_window(TimeWindow::new(0.0, 20.0).unwrap()),
///     ],
///     30,
///     1,
/// )
/// .unwrap();
/// let solution = solomon_i1(&p);
/// assert_eq!(solution.num_served(), 2);
/// assert!(solution.is_feasible());
/// ```
pub fn solomon_i1(problem: &VrptwProblem) -> RoutingSolution {
    let eval = RouteEvaluator::new(problem);
    let mut unrouted: Vec<usize> = problem.customer_ids().collect();
    let mut routes = Vec::new();

    while !unrouted.is_empty() {
        let seed_idx = farthest_from_depot(problem, &unrouted);
        let seed = unrouted.remove(seed_idx);
        let mut route = vec![seed];

        loop {
            let starts = service_starts(problem, &route);
            let load: i32 = route.iter().map(|&c| problem.customer(c).demand()).sum();
            // (index in unrouted, position, c2)
            let mut best: Option<(usize, usize, f64)> = None;

            for (ui, &u) in unrouted.iter().enumerate() {
                if load + problem.customer(u).demand() > problem.capacity() {
                    continue;
                }
                let Some((pos, c1)) = best_position(&eval, &route, &starts, u) else {
                    continue;
                };
                let c2 = LAMBDA * problem.distance(0, u) - c1;
                if best.is_none_or(|(_, _, b)| c2 > b + 1e-12) {
                    best = Some((ui, pos, c2));
                }
            }

            match best {
                Some((ui, pos, _)) => {
                    let u = unrouted.remove(ui);
                    route.insert(pos, u);
                }
                None => break,
            }
        }

        routes.push(route);
    }

    RoutingSolution::from_sequences(problem, routes)
}

/// Index of the unrouted customer farthest from the depot, lowest id on ties.
fn farthest_from_depot(problem: &VrptwProblem, unrouted: &[usize]) -> usize {
    let mut best_idx = 0;
    let mut best_dist = f64::NEG_INFINITY;
    for (i, &cid) in unrouted.iter().enumerate() {
        let d = problem.distance(0, cid);
        if d > best_dist {
            best_dist = d;
            best_idx = i;
        }
    }
    best_idx
}

/// Service start at each customer of `route`, then the arrival back at the
/// depot.
fn service_starts(problem: &VrptwProblem, route: &[usize]) -> Vec<f64> {
    let mut starts = Vec::with_capacity(route.len() + 1);
    let mut time = 0.0;
    let mut prev = 0;
    for &c in route {
        let customer = problem.customer(c);
        let start = (time + problem.distance(prev, c)).max(customer.ready());
        starts.push(start);
        time = start + customer.service_duration();
        prev = c;
    }
    starts.push(time + problem.distance(prev, 0));
    starts
}

/// Feasible position of `u` minimizing c1, lowest position on ties.
fn best_position(
    eval: &RouteEvaluator<'_>,
    route: &[usize],
    starts: &[f64],
    u: usize,
) -> Option<(usize, f64)> {
    let problem = eval.problem();
    let cu = problem.customer(u);
    let mut best: Option<(usize, f64)> = None;

    for pos in 0..=route.len() {
        let i = if pos == 0 { 0 } else { route[pos - 1] };
        let j = if pos == route.len() { 0 } else { route[pos] };

        let departure_i = if pos == 0 {
            0.0
        } else {
            starts[pos - 1] + problem.customer(i).service_duration()
        };
        let start_u = (departure_i + problem.distance(i, u)).max(cu.ready());
        let arrival_j = start_u + cu.service_duration() + problem.distance(u, j);
        let start_j = if j == 0 {
            arrival_j
        } else {
            arrival_j.max(problem.customer(j).ready())
        };

        let c11 = problem.distance(i, u) + problem.distance(u, j) - MU * problem.distance(i, j);
        let c12 = start_j - starts[pos];
        let c1 = ALPHA_1 * c11 + ALPHA_2 * c12;

        if best.is_some_and(|(_, b)| c1 >= b - 1e-12) {
            continue;
        }
        if eval.measure_with_insertion(route, pos, u).is_feasible() {
            best = Some((pos, c1));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, TimeWindow};

    fn tw(ready: f64, due: f64) -> TimeWindow {
        TimeWindow::new(ready, due).expect("valid")
    }

    #[test]
    fn test_solomon_all_one_route() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 0.0, 10, 2.0).with_time_window(tw(0.0, 100.0)),
            Customer::new(2, 2.0, 0.0, 10, 2.0).with_time_window(tw(0.0, 100.0)),
            Customer::new(3, 3.0, 0.0, 10, 2.0).with_time_window(tw(0.0, 100.0)),
        ];
        let p = VrptwProblem::new(customers, 100, 1).expect("valid");
        let sol = solomon_i1(&p);
        assert_eq!(sol.num_served(), 3);
        assert_eq!(sol.num_routes(), 1);
        assert!(sol.is_feasible());
    }

    #[test]
    fn test_solomon_capacity_split() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 0.0, 15, 0.0),
            Customer::new(2, 2.0, 0.0, 15, 0.0),
            Customer::new(3, 3.0, 0.0, 15, 0.0),
        ];
        let p = VrptwProblem::new(customers, 25, 3).expect("valid");
        let sol = solomon_i1(&p);
        assert_eq!(sol.num_served(), 3);
        assert_eq!(sol.num_routes(), 3);
    }

    #[test]
    fn test_solomon_tw_split() {
        // After visiting 1 (arrive 5, depart 10) 2 cannot be reached by 6
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 5.0, 0.0, 10, 5.0).with_time_window(tw(0.0, 6.0)),
            Customer::new(2, -5.0, 0.0, 10, 5.0).with_time_window(tw(0.0, 6.0)),
        ];
        let p = VrptwProblem::new(customers, 100, 2).expect("valid");
        let sol = solomon_i1(&p);
        assert_eq!(sol.num_served(), 2);
        assert_eq!(sol.num_routes(), 2);
        assert!(sol.is_feasible());
    }

    #[test]
    fn test_solomon_seeds_farthest() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 0.0, 10, 0.0),
            Customer::new(2, 10.0, 0.0, 10, 0.0),
        ];
        let p = VrptwProblem::new(customers, 100, 1).expect("valid");
        let unrouted = vec![1, 2];
        assert_eq!(unrouted[farthest_from_depot(&p, &unrouted)], 2);
    }

    #[test]
    fn test_service_starts_wait() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 3.0, 0.0, 10, 1.0).with_time_window(tw(10.0, 20.0)),
        ];
        let p = VrptwProblem::new(customers, 100, 1).expect("valid");
        let starts = service_starts(&p, &[1]);
        assert!((starts[0] - 10.0).abs() < 1e-10);
        // 10 + 1 service + 3 back
        assert!((starts[1] - 14.0).abs() < 1e-10);
    }

    #[test]
    fn test_unreachable_customer_alone() {
        let customers = vec![
            Customer::depot(0.0, 0.0).with_time_window(tw(0.0, 50.0)),
            Customer::new(1, 1.0, 0.0, 10, 0.0),
            Customer::new(2, 40.0, 0.0, 10, 0.0),
        ];
        let p = VrptwProblem::new(customers, 100, 2).expect("valid");
        let sol = solomon_i1(&p);
        assert!(sol.unassigned().is_empty());
        assert_eq!(sol.duplicates(), 0);
        assert_eq!(sol.sequences(), vec![vec![2], vec![1]]);
    }
}
