//! Route evaluator that computes timing, load, and feasibility.

use crate::models::VrptwProblem;
use crate::solution::{Route, Visit};

/// A constraint violated by a single route.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Vehicle capacity exceeded.
    CapacityExceeded {
        /// Load carried by the route.
        load: i32,
        /// Vehicle capacity.
        capacity: i32,
    },
    /// Arrival after the customer's time window closes.
    TimeWindowViolated {
        /// Customer ID where violation occurred.
        customer_id: usize,
        /// Actual arrival time.
        arrival: f64,
        /// Time window due date.
        due: f64,
    },
    /// Return to the depot after the planning horizon.
    LateReturn {
        /// Arrival time back at the depot.
        arrival: f64,
        /// Depot closing time.
        due: f64,
    },
}

/// Distance, load and violation count of a customer sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMeasure {
    pub distance: f64,
    pub duration: f64,
    pub load: i32,
    pub violations: usize,
}

impl RouteMeasure {
    pub fn is_feasible(&self) -> bool {
        self.violations == 0
    }
}

/// Evaluates routes by computing visit timing, cumulative load, total distance,
/// and checking capacity and time windows (including the depot's).
///
/// # Examples
///
/// ```
/// use u_ils::models::{Customer, VrptwProblem};
/// use u_ils::evaluation::RouteEvaluator;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10, 5.0),
///     Customer::new(2, 6.0, 8.0, 20, 5.0),
/// ];
/// let problem = VrptwProblem::new(customers, 100, 2).unwrap();
///
/// let evaluator = RouteEvaluator::new(&problem);
/// let (route, violations) = evaluator.build_route(&[1, 2]);
/// assert_eq!(route.len(), 2);
/// assert!(violations.is_empty());
/// ```
#[derive(Clone, Copy)]
pub struct RouteEvaluator<'a> {
    problem: &'a VrptwProblem,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates a new evaluator for the given problem data.
    pub fn new(problem: &'a VrptwProblem) -> Self {
        Self { problem }
    }

    pub fn problem(&self) -> &'a VrptwProblem {
        self.problem
    }

    /// Builds a route from a sequence of customer IDs, computing timing and load.
    ///
    /// Returns the constructed route and any constraint violations found.
    pub fn build_route(&self, customer_ids: &[usize]) -> (Route, Vec<Violation>) {
        let mut visits = Vec::with_capacity(customer_ids.len());
        let mut violations = Vec::new();
        let mut current_time = 0.0;
        let mut current_load: i32 = 0;
        let mut total_distance = 0.0;
        let mut prev = 0;

        for &cid in customer_ids {
            let travel = self.problem.distance(prev, cid);
            total_distance += travel;
            let arrival = current_time + travel;

            let customer = self.problem.customer(cid);
            let service_start = match customer.time_window() {
                Some(tw) => {
                    if tw.is_late(arrival) {
                        violations.push(Violation::TimeWindowViolated {
                            customer_id: cid,
                            arrival,
                            due: tw.due(),
                        });
                    }
                    tw.service_start(arrival)
                }
                None => arrival,
            };

            let departure = service_start + customer.service_duration();
            current_load += customer.demand();

            visits.push(Visit {
                customer_id: cid,
                arrival_time: arrival,
                departure_time: departure,
                load_after: current_load,
            });

            current_time = departure;
            prev = cid;
        }

        // Return to depot
        let return_travel = if customer_ids.is_empty() {
            0.0
        } else {
            self.problem.distance(prev, 0)
        };
        total_distance += return_travel;
        let total_duration = current_time + return_travel;

        let horizon = self.problem.horizon();
        if total_duration > horizon + 1e-9 {
            violations.push(Violation::LateReturn {
                arrival: total_duration,
                due: horizon,
            });
        }

        if current_load > self.problem.capacity() {
            violations.push(Violation::CapacityExceeded {
                load: current_load,
                capacity: self.problem.capacity(),
            });
        }

        let route = Route::from_parts(
            customer_ids.to_vec(),
            visits,
            total_distance,
            total_duration,
            current_load,
            violations.len(),
        );
        (route, violations)
    }

    /// Measures a sequence without building its visits.
    pub fn measure(&self, customer_ids: &[usize]) -> RouteMeasure {
        self.measure_iter(customer_ids.iter().copied())
    }

    /// Measures `customer_ids` with `customer` inserted before `position`.
    pub fn measure_with_insertion(
        &self,
        customer_ids: &[usize],
        position: usize,
        customer: usize,
    ) -> RouteMeasure {
        let (head, tail) = customer_ids.split_at(position);
        self.measure_iter(
            head.iter()
                .copied()
                .chain(std::iter::once(customer))
                .chain(tail.iter().copied()),
        )
    }

    /// Measures any customer sequence given as an iterator.
    pub fn measure_iter<I>(&self, customer_ids: I) -> RouteMeasure
    where
        I: IntoIterator<Item = usize>,
    {
        let mut time = 0.0;
        let mut load: i32 = 0;
        let mut distance = 0.0;
        let mut violations = 0;
        let mut prev = 0;

        for cid in customer_ids {
            let travel = self.problem.distance(prev, cid);
            distance += travel;
            let arrival = time + travel;
            let customer = self.problem.customer(cid);
            if arrival > customer.due() + 1e-9 {
                violations += 1;
            }
            time = arrival.max(customer.ready()) + customer.service_duration();
            load += customer.demand();
            prev = cid;
        }

        if prev != 0 {
            let back = self.problem.distance(prev, 0);
            distance += back;
            time += back;
        }
        if time > self.problem.horizon() + 1e-9 {
            violations += 1;
        }
        if load > self.problem.capacity() {
            violations += 1;
        }

        RouteMeasure {
            distance,
            duration: time,
            load,
            violations,
        }
    }

    /// Distance of `depot → ids → depot`, ignoring time and load.
    pub fn distance(&self, customer_ids: &[usize]) -> f64 {
        let Some((&first, _)) = customer_ids.split_first() else {
            return 0.0;
        };
        let mut dist = self.problem.distance(0, first);
        for w in customer_ids.windows(2) {
            dist += self.problem.distance(w[0], w[1]);
        }
        dist + self.problem.distance(customer_ids[customer_ids.len() - 1], 0)
    }

    /// Returns `true` if the sequence violates nothing.
    pub fn is_feasible(&self, customer_ids: &[usize]) -> bool {
        self.measure(customer_ids).is_feasible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, TimeWindow};

    fn problem(capacity: i32) -> VrptwProblem {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 3.0, 4.0, 10, 5.0),
            Customer::new(2, 6.0, 8.0, 20, 5.0),
            Customer::new(3, 0.0, 10.0, 15, 5.0),
        ];
        VrptwProblem::new(customers, capacity, 3).expect("valid")
    }

    fn windowed(tw: TimeWindow, depot_due: f64) -> VrptwProblem {
        let customers = vec![
            Customer::depot(0.0, 0.0)
                .with_time_window(TimeWindow::new(0.0, depot_due).expect("valid")),
            Customer::new(1, 3.0, 4.0, 10, 5.0).with_time_window(tw),
        ];
        VrptwProblem::new(customers, 100, 1).expect("valid")
    }

    #[test]
    fn test_build_route_empty() {
        let p = problem(50);
        let eval = RouteEvaluator::new(&p);
        let (route, violations) = eval.build_route(&[]);
        assert!(route.is_empty());
        assert!(violations.is_empty());
        assert_eq!(route.total_distance(), 0.0);
    }

    #[test]
    fn test_build_route_single() {
        let p = problem(50);
        let eval = RouteEvaluator::new(&p);
        let (route, violations) = eval.build_route(&[1]);
        assert_eq!(route.len(), 1);
        assert!(violations.is_empty());
        // depot->1 = 5.0, 1->depot = 5.0
        assert!((route.total_distance() - 10.0).abs() < 1e-10);
        assert_eq!(route.total_load(), 10);
    }

    #[test]
    fn test_build_route_capacity_violated() {
        let p = problem(25);
        let eval = RouteEvaluator::new(&p);
        // 10 + 20 + 15 = 45 > 25
        let (route, violations) = eval.build_route(&[1, 2, 3]);
        assert_eq!(route.len(), 3);
        assert_eq!(route.violations(), 1);
        assert!(matches!(
            violations[0],
            Violation::CapacityExceeded {
                load: 45,
                capacity: 25
            }
        ));
    }

    #[test]
    fn test_build_route_time_window_violated() {
        let p = windowed(TimeWindow::new(0.0, 3.0).expect("valid"), 100.0);
        let eval = RouteEvaluator::new(&p);
        // Travel time = 5.0 > due = 3.0
        let (_, violations) = eval.build_route(&[1]);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            violations[0],
            Violation::TimeWindowViolated { customer_id: 1, .. }
        ));
    }

    #[test]
    fn test_build_route_waiting() {
        let p = windowed(TimeWindow::new(20.0, 100.0).expect("valid"), 100.0);
        let eval = RouteEvaluator::new(&p);
        let (route, violations) = eval.build_route(&[1]);
        assert!(violations.is_empty());
        let visit = &route.visits()[0];
        // Arrival at 5.0, wait until 20.0, service 5.0, depart at 25.0
        assert!((visit.arrival_time - 5.0).abs() < 1e-10);
        assert!((visit.departure_time - 25.0).abs() < 1e-10);
        assert!((route.total_duration() - 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_late_return_to_depot() {
        let p = windowed(TimeWindow::new(20.0, 100.0).expect("valid"), 28.0);
        let eval = RouteEvaluator::new(&p);
        let (_, violations) = eval.build_route(&[1]);
        assert!(matches!(violations[0], Violation::LateReturn { .. }));
        assert_eq!(eval.measure(&[1]).violations, 1);
    }

    #[test]
    fn test_measure_matches_build() {
        let p = problem(25);
        let eval = RouteEvaluator::new(&p);
        for seq in [vec![1, 2, 3], vec![3, 1], vec![2]] {
            let (route, _) = eval.build_route(&seq);
            let m = eval.measure(&seq);
            assert!((m.distance - route.total_distance()).abs() < 1e-10);
            assert!((m.duration - route.total_duration()).abs() < 1e-10);
            assert_eq!(m.violations, route.violations());
            assert!((eval.distance(&seq) - m.distance).abs() < 1e-10);
        }
    }

    #[test]
    fn test_measure_with_insertion() {
        let p = problem(50);
        let eval = RouteEvaluator::new(&p);
        let direct = eval.measure(&[1, 3, 2]);
        let inserted = eval.measure_with_insertion(&[1, 2], 1, 3);
        assert!((direct.distance - inserted.distance).abs() < 1e-10);
        assert_eq!(direct.load, inserted.load);
    }

    #[test]
    fn test_timing_chain() {
        let p = problem(50);
        let eval = RouteEvaluator::new(&p);
        let (route, _) = eval.build_route(&[1, 2]);
        let v1 = &route.visits()[0];
        let v2 = &route.visits()[1];
        let expected_arrival_2 = v1.departure_time + p.distance(1, 2);
        assert!((v2.arrival_time - expected_arrival_2).abs() < 1e-10);
    }
}
