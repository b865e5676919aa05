//! Regret-2 parallel insertion.
//!
//! # Algorithm
//!
//! All routes grow in parallel. For each unrouted customer, its cheapest
//! feasible insertion into every route is computed; serving it on a new
//! route counts as one more option. The regret is the cost difference
//! between the second best and the best option. The customer with the
//! largest regret is inserted at its best option, so customers that lose
//! the most by waiting are placed first. A customer with a single option
//! has infinite regret.
//!
//! # Complexity
//!
//! O(n² · m · L) where n = customers, m = routes and L the longest route.
//!
//! # Reference
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1993). "A parallel route building
//! algorithm for the vehicle routing and scheduling problem with time
//! windows", *EJOR* 66(3), 331-340.

use super::insertion::{apply, cheapest_in_route, new_route_insertion, Insertion};
use crate::evaluation::RouteEvaluator;
use crate::models::VrptwProblem;
use crate::solution::RoutingSolution;

/// Feasible options of `customer`, cheapest first, ties by route index.
fn sorted_options(eval: &RouteEvaluator<'_>, routes: &[Vec<usize>], customer: usize) -> Vec<Insertion> {
    let mut options: Vec<Insertion> = routes
        .iter()
        .enumerate()
        .filter_map(|(r, route)| {
            cheapest_in_route(eval, route, customer).map(|(position, cost)| Insertion {
                route: r,
                position,
                cost,
            })
        })
        .collect();
    options.extend(new_route_insertion(eval, routes.len(), customer));
    options.sort_by(|a, b| a.cost.total_cmp(&b.cost).then(a.route.cmp(&b.route)));
    options
}

/// Constructs a VRPTW solution by regret-2 insertion.
///
/// Customers that cannot be served feasibly even alone are given routes of
/// their own at the end.
///
/// # Examples
///
/// ```
/// use u_ils::models::{Customer, VrptwProblem};
/// use u_ils::constructive::regret_insertion;
///
/// let p = VrptwProblem::new(
///     vec![
///         Customer::depot(0.0, 0.0),
///         Customer::new(1, 1.0, 0.0, 10, 0.0),
///         Customer::new(2, 0.0, 1.0, 10, 0.0),
///     ],
///     100,
///     2,
/// )
/// .unwrap();
/// let sol = regret_insertion(&p);
/// assert_eq!(sol.num_served(), 2);
/// assert!(sol.is_feasible());
/// ```
pub fn regret_insertion(problem: &VrptwProblem) -> RoutingSolution {
    let eval = RouteEvaluator::new(problem);
    let mut unrouted: Vec<usize> = problem.customer_ids().collect();
    let mut routes: Vec<Vec<usize>> = Vec::new();

    while !unrouted.is_empty() {
        // (index in unrouted, regret, best option)
        let mut chosen: Option<(usize, f64, Insertion)> = None;

        for (ui, &c) in unrouted.iter().enumerate() {
            let options = sorted_options(&eval, &routes, c);
            let Some(&first) = options.first() else {
                continue;
            };
            let regret = options.get(1).map_or(f64::INFINITY, |second| second.cost - first.cost);

            let better = chosen.is_none_or(|(_, best_regret, best)| {
                regret > best_regret || (regret == best_regret && first.cost < best.cost)
            });
            if better {
                chosen = Some((ui, regret, first));
            }
        }

        let Some((ui, _, insertion)) = chosen else {
            break;
        };
        let c = unrouted.remove(ui);
        apply(&mut routes, insertion, c);
    }

    routes.extend(unrouted.into_iter().map(|c| vec![c]));
    RoutingSolution::from_sequences(problem, routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, TimeWindow};

    fn tw(ready: f64, due: f64) -> TimeWindow {
        TimeWindow::new(ready, due).expect("valid")
    }

    #[test]
    fn test_regret_serves_all_feasibly() {
        let customers = vec![
            Customer::depot(0.0, 0.0).with_time_window(tw(0.0, 200.0)),
            Customer::new(1, 10.0, 0.0, 10, 1.0).with_time_window(tw(0.0, 50.0)),
            Customer::new(2, 12.0, 0.0, 10, 1.0).with_time_window(tw(0.0, 50.0)),
            Customer::new(3, -10.0, 0.0, 10, 1.0).with_time_window(tw(0.0, 15.0)),
            Customer::new(4, -12.0, 0.0, 10, 1.0).with_time_window(tw(0.0, 60.0)),
        ];
        let p = VrptwProblem::new(customers, 25, 3).expect("valid");
        let sol = regret_insertion(&p);
        assert!(sol.unassigned().is_empty());
        assert_eq!(sol.duplicates(), 0);
        assert!(sol.is_feasible());
    }

    #[test]
    fn test_regret_single_option_first() {
        // Capacity 10: every customer only fits on a fresh route
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 0.0, 10, 0.0),
            Customer::new(2, 2.0, 0.0, 10, 0.0),
        ];
        let p = VrptwProblem::new(customers, 10, 2).expect("valid");
        let sol = regret_insertion(&p);
        assert_eq!(sol.num_routes(), 2);
        assert!(sol.is_feasible());
    }

    #[test]
    fn test_regret_unreachable_gets_own_route() {
        let customers = vec![
            Customer::depot(0.0, 0.0).with_time_window(tw(0.0, 50.0)),
            Customer::new(1, 1.0, 0.0, 10, 0.0),
            Customer::new(2, 40.0, 0.0, 10, 0.0),
        ];
        let p = VrptwProblem::new(customers, 100, 2).expect("valid");
        let sol = regret_insertion(&p);
        assert_eq!(sol.sequences(), vec![vec![1], vec![2]]);
        assert!(!sol.is_feasible());
    }
}
