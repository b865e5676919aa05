//! VRPTW repairs.
//!
//! Each repair strips offending customers from their routes and reinserts
//! them, together with any unassigned customer, at their cheapest feasible
//! positions, opening routes as needed. A customer that cannot be served
//! feasibly even alone ends up in a route of its own.

use crate::constructive::insertion::insert_all;
use crate::evaluation::RouteEvaluator;
use crate::models::VrptwProblem;
use crate::solution::RoutingSolution;

/// Removes the largest demands first (lowest id on ties) until the load fits.
fn strip_overload(problem: &VrptwProblem, route: &mut Vec<usize>) -> Vec<usize> {
    let mut load: i32 = route.iter().map(|&c| problem.customer(c).demand()).sum();
    if load <= problem.capacity() {
        return Vec::new();
    }
    let mut by_demand = route.clone();
    by_demand.sort_by_key(|&c| (std::cmp::Reverse(problem.customer(c).demand()), c));
    let mut stripped = Vec::new();
    for c in by_demand {
        if load <= problem.capacity() {
            break;
        }
        load -= problem.customer(c).demand();
        stripped.push(c);
    }
    route.retain(|c| !stripped.contains(c));
    stripped
}

/// Walks the route and drops every customer reached after its due time,
/// then drops trailing customers while the vehicle returns late.
fn strip_late(problem: &VrptwProblem, route: &mut Vec<usize>) -> Vec<usize> {
    let mut stripped = Vec::new();
    let mut kept = Vec::with_capacity(route.len());
    let mut time = 0.0;
    let mut prev = 0;
    for &c in route.iter() {
        let customer = problem.customer(c);
        let arrival = time + problem.distance(prev, c);
        if arrival > customer.due() + 1e-9 {
            stripped.push(c);
            continue;
        }
        time = arrival.max(customer.ready()) + customer.service_duration();
        prev = c;
        kept.push(c);
    }
    let eval = RouteEvaluator::new(problem);
    while !kept.is_empty() && !eval.measure(&kept).is_feasible() {
        if let Some(c) = kept.pop() {
            stripped.push(c);
        }
    }
    *route = kept;
    stripped
}

fn reinsert(problem: &VrptwProblem, mut routes: Vec<Vec<usize>>, mut pending: Vec<usize>, unassigned: &[usize]) -> RoutingSolution {
    routes.retain(|r| !r.is_empty());
    pending.extend_from_slice(unassigned);
    insert_all(&RouteEvaluator::new(problem), &mut routes, &pending);
    RoutingSolution::from_sequences(problem, routes)
}

/// Strips overloaded routes, largest demand first, and reinserts.
///
/// # Examples
///
/// ```
/// use u_ils::models::{Customer, VrptwProblem};
/// use u_ils::repair::capacity_repair;
/// use u_ils::solution::RoutingSolution;
///
/// let p = VrptwProblem::new(
///     vec![
///         Customer::depot(0.0, 0.0),
///         Customer::new(1, 1.0, 0.0, 10, 0.0),
///         Customer::new(2, 2.0, 0.0, 20, 0.0),
///     ],
///     20,
///     2,
/// )
/// .unwrap();
/// let overloaded = RoutingSolution::from_sequences(&p, vec![vec![1, 2]]);
/// let fixed = capacity_repair(&p, &overloaded);
/// assert!(fixed.is_feasible());
/// assert_eq!(fixed.sequences(), vec![vec![1], vec![2]]);
/// ```
pub fn capacity_repair(problem: &VrptwProblem, solution: &RoutingSolution) -> RoutingSolution {
    let mut routes = solution.sequences();
    let mut pending = Vec::new();
    for route in &mut routes {
        pending.extend(strip_overload(problem, route));
    }
    reinsert(problem, routes, pending, solution.unassigned())
}

/// Strips customers served late and reinserts them.
pub fn time_window_repair(problem: &VrptwProblem, solution: &RoutingSolution) -> RoutingSolution {
    let mut routes = solution.sequences();
    let mut pending = Vec::new();
    for route in &mut routes {
        pending.extend(strip_late(problem, route));
    }
    reinsert(problem, routes, pending, solution.unassigned())
}

/// Removes duplicate visits (keeping the first), strips overloads and late
/// customers, then inserts everything unserved.
pub fn greedy_repair(problem: &VrptwProblem, solution: &RoutingSolution) -> RoutingSolution {
    let mut seen = vec![false; problem.num_customers() + 1];
    let mut routes = solution.sequences();
    for route in &mut routes {
        route.retain(|&c| !std::mem::replace(&mut seen[c], true));
    }
    let mut pending = Vec::new();
    for route in &mut routes {
        pending.extend(strip_overload(problem, route));
        pending.extend(strip_late(problem, route));
    }
    reinsert(problem, routes, pending, solution.unassigned())
}
