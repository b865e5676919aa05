//! Insertion primitives shared by VRPTW constructors, perturbations and
//! repairs.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::evaluation::RouteEvaluator;
use crate::models::VrptwProblem;
use crate::solution::RoutingSolution;

/// A feasible position for one customer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insertion {
    /// Route index, or `routes.len()` for a new route.
    pub route: usize,
    /// Position within the route.
    pub position: usize,
    /// Distance increase.
    pub cost: f64,
}

/// Distance increase of inserting `customer` before `position`.
pub fn insertion_cost(problem: &VrptwProblem, route: &[usize], position: usize, customer: usize) -> f64 {
    let prev = if position == 0 { 0 } else { route[position - 1] };
    let next = if position == route.len() { 0 } else { route[position] };
    problem.distance(prev, customer) + problem.distance(customer, next) - problem.distance(prev, next)
}

/// Cheapest feasible position of `customer` in one route, lowest position on
/// ties.
pub fn cheapest_in_route(eval: &RouteEvaluator<'_>, route: &[usize], customer: usize) -> Option<(usize, f64)> {
    let problem = eval.problem();
    let load: i32 = route.iter().map(|&c| problem.customer(c).demand()).sum();
    if load + problem.customer(customer).demand() > problem.capacity() {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for pos in 0..=route.len() {
        let cost = insertion_cost(problem, route, pos, customer);
        if best.is_some_and(|(_, b)| cost >= b - 1e-12) {
            continue;
        }
        if eval.measure_with_insertion(route, pos, customer).is_feasible() {
            best = Some((pos, cost));
        }
    }
    best
}

/// Cheapest feasible position over all routes, opening a new route when
/// `allow_new_route` is set and serving the customer alone is feasible.
pub fn cheapest_insertion(
    eval: &RouteEvaluator<'_>,
    routes: &[Vec<usize>],
    customer: usize,
    allow_new_route: bool,
) -> Option<Insertion> {
    let mut best: Option<Insertion> = None;
    for (r, route) in routes.iter().enumerate() {
        if let Some((position, cost)) = cheapest_in_route(eval, route, customer) {
            if best.is_none_or(|b| cost < b.cost - 1e-12) {
                best = Some(Insertion { route: r, position, cost });
            }
        }
    }
    if best.is_none() && allow_new_route {
        return new_route_insertion(eval, routes.len(), customer);
    }
    best
}

/// Cheapest position by distance alone over all routes, feasible or not.
/// Lowest route then lowest position on ties.
pub fn cheapest_position(problem: &VrptwProblem, routes: &[Vec<usize>], customer: usize) -> Option<Insertion> {
    let mut best: Option<Insertion> = None;
    for (r, route) in routes.iter().enumerate() {
        for position in 0..=route.len() {
            let cost = insertion_cost(problem, route, position, customer);
            if best.is_none_or(|b| cost < b.cost - 1e-12) {
                best = Some(Insertion { route: r, position, cost });
            }
        }
    }
    best
}

/// The option of serving `customer` alone, if that is feasible.
pub fn new_route_insertion(eval: &RouteEvaluator<'_>, route: usize, customer: usize) -> Option<Insertion> {
    eval.measure(&[customer]).is_feasible().then(|| Insertion {
        route,
        position: 0,
        cost: 2.0 * eval.problem().distance(0, customer),
    })
}

/// Applies an insertion, pushing a new route when it points past the end.
pub fn apply(routes: &mut Vec<Vec<usize>>, insertion: Insertion, customer: usize) {
    if insertion.route == routes.len() {
        routes.push(vec![customer]);
    } else {
        routes[insertion.route].insert(insertion.position, customer);
    }
}

/// Inserts every customer at its cheapest feasible position, in the given
/// order. Customers that fit nowhere get a route of their own, feasible or
/// not, so every customer ends up served.
pub fn insert_all(eval: &RouteEvaluator<'_>, routes: &mut Vec<Vec<usize>>, customers: &[usize]) {
    for &c in customers {
        match cheapest_insertion(eval, routes, c, true) {
            Some(ins) => apply(routes, ins, c),
            None => routes.push(vec![c]),
        }
    }
}

/// Inserts each customer at a uniformly random position of a random route
/// (or a new route), ignoring feasibility.
pub fn insert_randomly<R: Rng>(routes: &mut Vec<Vec<usize>>, customers: &[usize], rng: &mut R) {
    for &c in customers {
        let r = rng.random_range(0..=routes.len());
        if r == routes.len() {
            routes.push(vec![c]);
        } else {
            let pos = rng.random_range(0..=routes[r].len());
            routes[r].insert(pos, c);
        }
    }
}

/// Removes the given customers from every route, dropping emptied routes.
pub fn remove_customers(routes: &mut Vec<Vec<usize>>, customers: &[usize]) {
    let max = customers.iter().copied().max().unwrap_or(0);
    let mut drop = vec![false; max + 1];
    for &c in customers {
        drop[c] = true;
    }
    for route in routes.iter_mut() {
        route.retain(|&c| c > max || !drop[c]);
    }
    routes.retain(|r| !r.is_empty());
}

/// Randomized cheapest insertion: customers in random order, each at its
/// cheapest feasible position.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_ils::models::{Customer, VrptwProblem};
/// use u_ils::constructive::randomized_insertion;
///
/// let p = VrptwProblem::new(
///     vec![
///         Customer::depot(0.0, 0.0),
///         Customer::new(1, 1.0, 0.0, 10, 0.0),
///         Customer::new(2, 2.0, 0.0, 10, 0.0),
///     ],
///     30,
///     2,
/// )
/// .unwrap();
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let sol = randomized_insertion(&p, &mut rng);
/// assert_eq!(sol.num_served(), 2);
/// assert!(sol.is_feasible());
/// ```
pub fn randomized_insertion<R: Rng>(problem: &VrptwProblem, rng: &mut R) -> RoutingSolution {
    let eval = RouteEvaluator::new(problem);
    let mut order: Vec<usize> = problem.customer_ids().collect();
    order.shuffle(rng);
    let mut routes = Vec::new();
    insert_all(&eval, &mut routes, &order);
    RoutingSolution::from_sequences(problem, routes)
}
