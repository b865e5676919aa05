//! Clarke-Wright savings algorithm with time-window checked merges.
//!
//! # Algorithm
//!
//! The savings algorithm (Clarke & Wright, 1964) starts with each customer
//! on its own route (depot → customer → depot). It then merges routes by
//! computing the "savings" of combining the end of one route with the start
//! of another:
//!
//! ```text
//! s(i, j) = d(0, i) + d(0, j) - d(i, j)
//! ```
//!
//! Routes are merged in decreasing order of savings. A merge is kept only
//! when the joined sequence respects capacity, every time window and the
//! depot's closing time. Routes are never reversed: with time windows a
//! reversed route is almost never feasible.
//!
//! # Complexity
//!
//! O(n² log n + n² · L) where n = number of customers and L the longest
//! route checked during a merge.
//!
//! # Reference
//!
//! Clarke, G. & Wright, J.W. (1964). "Scheduling of Vehicles from a Central
//! Depot to a Number of Delivery Points", *Operations Research* 12(4), 568-581.

use crate::evaluation::RouteEvaluator;
use crate::models::VrptwProblem;
use crate::solution::RoutingSolution;

/// A savings value for merging two customers' routes.
#[derive(Debug)]
struct Saving {
    i: usize,
    j: usize,
    value: f64,
}

/// Constructs a VRPTW solution using the Clarke-Wright savings algorithm.
///
/// Starts with one route per customer, then merges routes in order of
/// decreasing savings while the merged route stays feasible.
///
/// # Examples
///
/// ```
/// use u_ils::models::{Customer, VrptwProblem};
/// use u_ils::constructive::clarke_wright_savings;
///
/// let p = VrptwProblem::new(
///     vec![
///         Customer::depot(0.0, 0.0),
///         Customer::new(1, 1.0, 0.0, 10, 0.0),
///         Customer::new(2, 2.0, 0.0, 10, 0.0),
///         Customer::new(3, 3.0, 0.0, 10, 0.0),
///     ],
///     30,
///     3,
/// )
/// .unwrap();
/// let solution = clarke_wright_savings(&p);
/// assert_eq!(solution.num_served(), 3);
/// assert_eq!(solution.num_routes(), 1);
/// ```
pub fn clarke_wright_savings(problem: &VrptwProblem) -> RoutingSolution {
    let n = problem.num_customers();
    let eval = RouteEvaluator::new(problem);

    let mut savings = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 1..=n {
        for j in (i + 1)..=n {
            let s = problem.distance(0, i) + problem.distance(0, j) - problem.distance(i, j);
            if s > 0.0 {
                savings.push(Saving { i, j, value: s });
            }
        }
    }
    savings.sort_by(|a, b| {
        b.value
            .total_cmp(&a.value)
            .then(a.i.cmp(&b.i))
            .then(a.j.cmp(&b.j))
    });

    // route_of[c] = index into members; members[0] stays empty (depot)
    let mut route_of: Vec<usize> = (0..=n).collect();
    let mut members: Vec<Vec<usize>> = (0..=n)
        .map(|c| if c == 0 { Vec::new() } else { vec![c] })
        .collect();

    for saving in &savings {
        let ri = route_of[saving.i];
        let rj = route_of[saving.j];
        if ri == rj {
            continue;
        }

        let (head, tail) = if members[ri].last() == Some(&saving.i)
            && members[rj].first() == Some(&saving.j)
        {
            (ri, rj)
        } else if members[rj].last() == Some(&saving.j) && members[ri].first() == Some(&saving.i) {
            (rj, ri)
        } else {
            continue;
        };

        let joined = members[head].iter().chain(&members[tail]).copied();
        if !eval.measure_iter(joined).is_feasible() {
            continue;
        }

        let moved = std::mem::take(&mut members[tail]);
        for &c in &moved {
            route_of[c] = head;
        }
        members[head].extend(moved);
    }

    let routes: Vec<Vec<usize>> = members.into_iter().filter(|m| !m.is_empty()).collect();
    RoutingSolution::from_sequences(problem, routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, TimeWindow};

    #[test]
    fn test_cw_line() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 0.0, 10, 0.0),
            Customer::new(2, 2.0, 0.0, 10, 0.0),
            Customer::new(3, 3.0, 0.0, 10, 0.0),
        ];
        let p = VrptwProblem::new(customers, 30, 3).expect("valid");
        let sol = clarke_wright_savings(&p);
        assert_eq!(sol.num_served(), 3);
        assert!(sol.unassigned().is_empty());
        assert_eq!(sol.num_routes(), 1);
        // 0→1→2→3→0 = 6.0
        assert!((sol.total_distance() - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_cw_capacity_split() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 0.0, 15, 0.0),
            Customer::new(2, 2.0, 0.0, 15, 0.0),
            Customer::new(3, 3.0, 0.0, 15, 0.0),
        ];
        let p = VrptwProblem::new(customers, 25, 3).expect("valid");
        let sol = clarke_wright_savings(&p);
        assert_eq!(sol.num_served(), 3);
        assert_eq!(sol.num_routes(), 3);
        assert!(sol.is_feasible());
    }

    #[test]
    fn test_cw_rejects_late_merge() {
        // Merging 1 and 2 in either order misses one window
        let tw = |r, d| TimeWindow::new(r, d).expect("valid");
        let customers = vec![
            Customer::depot(0.0, 0.0).with_time_window(tw(0.0, 100.0)),
            Customer::new(1, 5.0, 0.0, 10, 5.0).with_time_window(tw(0.0, 6.0)),
            Customer::new(2, 5.0, 1.0, 10, 5.0).with_time_window(tw(0.0, 6.0)),
        ];
        let p = VrptwProblem::new(customers, 100, 2).expect("valid");
        let sol = clarke_wright_savings(&p);
        assert_eq!(sol.num_routes(), 2);
        assert!(sol.is_feasible());
    }

    #[test]
    fn test_cw_savings_computation() {
        // s(1,2) = 3 + 4 - 1 = 6 > 0, should merge
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 3.0, 0.0, 5, 0.0),
            Customer::new(2, 4.0, 0.0, 5, 0.0),
        ];
        let p = VrptwProblem::new(customers, 100, 1).expect("valid");
        let sol = clarke_wright_savings(&p);
        assert_eq!(sol.num_routes(), 1);
        // 0→1→2→0 = 3 + 1 + 4
        assert!((sol.total_distance() - 8.0).abs() < 1e-10);
    }
}
