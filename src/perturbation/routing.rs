//! VRPTW perturbations.
//!
//! # Reference
//!
//! Shaw, P. (1998). "Using Constraint Programming and Local Search Methods
//! to Solve Vehicle Routing Problems", *CP-98*, LNCS 1520, 417-431.
//!
//! Ropke, S. & Pisinger, D. (2006). "An Adaptive Large Neighborhood Search
//! Heuristic for the Pickup and Delivery Problem with Time Windows",
//! *Transportation Science* 40(4), 455-472.
//!
//! Glover, F. (1996). "Ejection chains, reference structures and alternating
//! path methods for traveling salesman problems", *Discrete Applied
//! Mathematics* 65, 223-253.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::element_count;
use crate::constructive::insertion::{self, insert_all, insert_randomly, remove_customers};
use crate::evaluation::RouteEvaluator;
use crate::models::VrptwProblem;
use crate::solution::RoutingSolution;

/// Shaw relatedness weights: distance, start time, demand.
const SHAW_DISTANCE: f64 = 9.0;
const SHAW_TIME: f64 = 3.0;
const SHAW_DEMAND: f64 = 2.0;

fn served(solution: &RoutingSolution) -> Vec<usize> {
    solution
        .routes()
        .iter()
        .flat_map(|r| r.customers().iter().copied())
        .collect()
}

/// Removes `⌈ρ·n⌉` random customers and puts each back at a uniformly
/// random position (possibly a new route), ignoring feasibility.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_ils::models::{Customer, VrptwProblem};
/// use u_ils::perturbation::random_removal;
/// use u_ils::solution::RoutingSolution;
///
/// let p = VrptwProblem::new(
///     vec![
///         Customer::depot(0.0, 0.0),
///         Customer::new(1, 1.0, 0.0, 10, 0.0),
///         Customer::new(2, 2.0, 0.0, 10, 0.0),
///         Customer::new(3, 3.0, 0.0, 10, 0.0),
///     ],
///     100,
///     3,
/// )
/// .unwrap();
/// let s = RoutingSolution::from_sequences(&p, vec![vec![1, 2, 3]]);
/// let mut rng = ChaCha8Rng::seed_from_u64(0);
/// let out = random_removal(&p, &s, 0.5, &mut rng);
/// assert_eq!(out.num_served(), 3);
/// assert!(out.unassigned().is_empty());
/// ```
pub fn random_removal<R: Rng>(
    problem: &VrptwProblem,
    solution: &RoutingSolution,
    rho: f64,
    rng: &mut R,
) -> RoutingSolution {
    let count = element_count(rho, problem.num_customers());
    let pool = served(solution);
    let mut removed: Vec<usize> = pool.choose_multiple(rng, count).copied().collect();
    let mut routes = solution.sequences();
    remove_customers(&mut routes, &removed);
    removed.extend_from_slice(solution.unassigned());
    insert_randomly(&mut routes, &removed, rng);
    RoutingSolution::from_sequences(problem, routes)
}

/// Shaw relatedness of two customers; lower is more related.
fn relatedness(problem: &VrptwProblem, max_distance: f64, a: usize, b: usize) -> f64 {
    let (ca, cb) = (problem.customer(a), problem.customer(b));
    let horizon = problem.horizon().max(1.0);
    let capacity = f64::from(problem.capacity().max(1));
    SHAW_DISTANCE * problem.distance(a, b) / max_distance.max(1e-9)
        + SHAW_TIME * (ca.ready() - cb.ready()).abs() / horizon
        + SHAW_DEMAND * f64::from((ca.demand() - cb.demand()).abs()) / capacity
}

/// Ruin and recreate: removes `⌈ρ·n⌉` related customers (Shaw), then
/// reinserts them, together with any unassigned ones, at their cheapest
/// feasible positions.
///
/// The first removed customer is random. Each further one is the customer
/// most related to a randomly chosen already removed customer.
pub fn ruin_and_recreate<R: Rng>(
    problem: &VrptwProblem,
    solution: &RoutingSolution,
    rho: f64,
    rng: &mut R,
) -> RoutingSolution {
    let mut pool = served(solution);
    pool.sort_unstable();
    let count = element_count(rho, problem.num_customers()).min(pool.len());
    let max_distance = problem
        .customer_ids()
        .flat_map(|i| problem.customer_ids().map(move |j| (i, j)))
        .map(|(i, j)| problem.distance(i, j))
        .fold(0.0, f64::max);

    let mut removed = Vec::with_capacity(count);
    if count > 0 {
        let pick = rng.random_range(0..pool.len());
        removed.push(pool.swap_remove(pick));
    }
    while removed.len() < count {
        let &anchor = removed.choose(rng).unwrap_or(&removed[0]);
        let (idx, _) = pool
            .iter()
            .enumerate()
            .map(|(k, &c)| (k, relatedness(problem, max_distance, anchor, c)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(pool[a.0].cmp(&pool[b.0])))
            .unwrap_or((0, 0.0));
        removed.push(pool.swap_remove(idx));
    }

    let mut routes = solution.sequences();
    remove_customers(&mut routes, &removed);
    removed.extend_from_slice(solution.unassigned());
    insert_all(&RouteEvaluator::new(problem), &mut routes, &removed);
    RoutingSolution::from_sequences(problem, routes)
}

/// Distance saved by removing `route[pos]`.
fn removal_saving(problem: &VrptwProblem, route: &[usize], pos: usize) -> f64 {
    let prev = if pos == 0 { 0 } else { route[pos - 1] };
    let next = route.get(pos + 1).copied().unwrap_or(0);
    problem.distance(prev, route[pos]) + problem.distance(route[pos], next) - problem.distance(prev, next)
}

/// Ejection chain of `⌈ρ·routes⌉` moves.
///
/// A random customer leaves its route. At each link it enters a random other
/// route at its cheapest position (by distance) and ejects the customer of
/// that route with the largest removal saving, which carries the chain on.
/// The last ejected customer is reinserted at its cheapest feasible
/// position.
pub fn ejection_chain<R: Rng>(
    problem: &VrptwProblem,
    solution: &RoutingSolution,
    rho: f64,
    rng: &mut R,
) -> RoutingSolution {
    let mut routes = solution.sequences();
    let non_empty: Vec<usize> = (0..routes.len()).filter(|&r| !routes[r].is_empty()).collect();
    let Some(&start) = non_empty.choose(rng) else {
        return solution.clone();
    };
    let links = element_count(rho, routes.len());
    let pick = rng.random_range(0..routes[start].len());
    let mut carried = routes[start].remove(pick);
    let mut source = start;

    for _ in 0..links {
        let targets: Vec<usize> = (0..routes.len()).filter(|&r| r != source).collect();
        let Some(&target) = targets.choose(rng) else {
            break;
        };
        let route = &mut routes[target];
        let pos = (0..=route.len())
            .min_by(|&a, &b| {
                insertion::insertion_cost(problem, route, a, carried)
                    .total_cmp(&insertion::insertion_cost(problem, route, b, carried))
                    .then(a.cmp(&b))
            })
            .unwrap_or(0);
        route.insert(pos, carried);
        let eject = (0..route.len())
            .filter(|&k| k != pos)
            .max_by(|&a, &b| {
                removal_saving(problem, route, a)
                    .total_cmp(&removal_saving(problem, route, b))
                    .then(b.cmp(&a))
            });
        let Some(eject) = eject else {
            // The receiving route held nobody else; the chain ends here
            let mut rest = solution.unassigned().to_vec();
            rest.retain(|&c| c != carried);
            routes.retain(|r| !r.is_empty());
            insert_all(&RouteEvaluator::new(problem), &mut routes, &rest);
            return RoutingSolution::from_sequences(problem, routes);
        };
        carried = route.remove(eject);
        source = target;
    }

    routes.retain(|r| !r.is_empty());
    let mut pending = vec![carried];
    pending.extend_from_slice(solution.unassigned());
    insert_all(&RouteEvaluator::new(problem), &mut routes, &pending);
    RoutingSolution::from_sequences(problem, routes)
}

/// Dissolves one random route among the `⌈ρ·routes⌉` smallest and
/// reinserts its customers at their cheapest feasible positions in the
/// remaining routes, or at the cheapest position by distance when none is
/// feasible. Never opens a route unless it removed the only one.
pub fn route_elimination<R: Rng>(
    problem: &VrptwProblem,
    solution: &RoutingSolution,
    rho: f64,
    rng: &mut R,
) -> RoutingSolution {
    let mut routes = solution.sequences();
    if routes.is_empty() {
        return solution.clone();
    }
    let mut by_size: Vec<usize> = (0..routes.len()).collect();
    by_size.sort_by_key(|&r| (routes[r].len(), r));
    by_size.truncate(element_count(rho, routes.len()));
    let Some(&victim) = by_size.choose(rng) else {
        return solution.clone();
    };
    let mut orphans = routes.remove(victim);
    orphans.extend_from_slice(solution.unassigned());

    let eval = RouteEvaluator::new(problem);
    for c in orphans {
        let spot = insertion::cheapest_insertion(&eval, &routes, c, false)
            .or_else(|| insertion::cheapest_position(problem, &routes, c));
        match spot {
            Some(ins) => insertion::apply(&mut routes, ins, c),
            None => routes.push(vec![c]),
        }
    }
    RoutingSolution::from_sequences(problem, routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Customer;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Customers 1..=6 on two rays from the depot.
    fn rays() -> VrptwProblem {
        let mut customers = vec![Customer::depot(0.0, 0.0)];
        for i in 1..=3 {
            customers.push(Customer::new(i, i as f64, 0.0, 10, 0.0));
        }
        for i in 4..=6 {
            customers.push(Customer::new(i, 0.0, (i - 3) as f64, 10, 0.0));
        }
        VrptwProblem::new(customers, 30, 4).expect("valid")
    }

    fn start(p: &VrptwProblem) -> RoutingSolution {
        RoutingSolution::from_sequences(p, vec![vec![1, 2, 3], vec![4, 5, 6]])
    }

    fn all_once(s: &RoutingSolution) -> bool {
        let mut seen = served(s);
        seen.sort_unstable();
        seen == vec![1, 2, 3, 4, 5, 6] && s.unassigned().is_empty()
    }

    #[test]
    fn test_every_perturbation_keeps_customers() {
        let p = rays();
        let s = start(&p);
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert!(all_once(&random_removal(&p, &s, 0.5, &mut rng)));
            assert!(all_once(&ruin_and_recreate(&p, &s, 0.5, &mut rng)));
            assert!(all_once(&ejection_chain(&p, &s, 1.0, &mut rng)));
            assert!(all_once(&route_elimination(&p, &s, 0.5, &mut rng)));
        }
    }

    #[test]
    fn test_shaw_prefers_same_ray() {
        let p = rays();
        assert!(relatedness(&p, 5.0, 1, 2) < relatedness(&p, 5.0, 1, 5));
    }

    #[test]
    fn test_ruin_and_recreate_restores_feasibility() {
        let p = rays();
        let s = start(&p);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let out = ruin_and_recreate(&p, &s, 0.3, &mut rng);
        assert!(out.is_feasible());
    }

    #[test]
    fn test_route_elimination_removes_a_route() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 0.0, 10, 0.0),
            Customer::new(2, 2.0, 0.0, 10, 0.0),
            Customer::new(3, 3.0, 0.0, 10, 0.0),
        ];
        let p = VrptwProblem::new(customers, 100, 3).expect("valid");
        let s = RoutingSolution::from_sequences(&p, vec![vec![1, 2], vec![3]]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // Pool of ⌈0.5 · 2⌉ = 1 route: the singleton [3]
        let out = route_elimination(&p, &s, 0.5, &mut rng);
        assert_eq!(out.num_routes(), 1);
        assert!((out.total_distance() - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_route_elimination_ignores_feasibility() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 0.0, 10, 0.0),
            Customer::new(2, -1.0, 0.0, 10, 0.0),
        ];
        let p = VrptwProblem::new(customers, 10, 2).expect("valid");
        let s = RoutingSolution::from_sequences(&p, vec![vec![1], vec![2]]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = route_elimination(&p, &s, 1.0, &mut rng);
        assert_eq!(out.num_routes(), 1);
        assert!(!out.is_feasible());
    }

    #[test]
    fn test_ejection_chain_on_single_route() {
        let p = rays();
        let s = RoutingSolution::from_sequences(&p, vec![vec![1, 2, 3, 4, 5, 6]]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = ejection_chain(&p, &s, 1.0, &mut rng);
        assert!(all_once(&out));
    }
}
