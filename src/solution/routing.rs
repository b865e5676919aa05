//! Route, visit and routing solution types.

use crate::evaluation::{Fitness, RouteEvaluator};
use crate::models::VrptwProblem;

/// A single visit to a customer within a route.
///
/// Tracks the customer ID along with computed timing and load state.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    /// Customer ID being visited.
    pub customer_id: usize,
    /// Arrival time at this customer.
    pub arrival_time: f64,
    /// Departure time (arrival + waiting + service duration).
    pub departure_time: f64,
    /// Cumulative load after this visit.
    pub load_after: i32,
}

/// An evaluated sequence of customer visits served by one vehicle.
///
/// A route starts and ends at the depot (not stored in `visits`). Routes are
/// produced by [`RouteEvaluator::build_route`], which fills in timing, load
/// and the violation count.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    customers: Vec<usize>,
    visits: Vec<Visit>,
    total_distance: f64,
    total_duration: f64,
    total_load: i32,
    violations: usize,
}

impl Route {
    pub(crate) fn from_parts(
        customers: Vec<usize>,
        visits: Vec<Visit>,
        total_distance: f64,
        total_duration: f64,
        total_load: i32,
        violations: usize,
    ) -> Self {
        Self {
            customers,
            visits,
            total_distance,
            total_duration,
            total_load,
            violations,
        }
    }

    /// Returns the ordered sequence of visits.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Returns the customer IDs in visit order.
    pub fn customers(&self) -> &[usize] {
        &self.customers
    }

    /// Returns the number of customer visits (excluding depot).
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// Returns `true` if this route has no customer visits.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Total distance, depot to depot.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Time of return to the depot, waits included.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Total load served by this route.
    pub fn total_load(&self) -> i32 {
        self.total_load
    }

    /// Late arrivals plus capacity and depot-return violations.
    pub fn violations(&self) -> usize {
        self.violations
    }

    pub fn is_feasible(&self) -> bool {
        self.violations == 0
    }
}

/// A set of routes plus the customers left unserved.
///
/// Empty routes are dropped on construction. Customers that appear in no
/// route are listed as unassigned; extra visits to the same customer are
/// counted as duplicates. Both count as violations in the fitness.
///
/// # Examples
///
/// ```
/// use u_ils::models::{Customer, VrptwProblem};
/// use u_ils::solution::RoutingSolution;
///
/// let problem = VrptwProblem::new(
///     vec![
///         Customer::depot(0.0, 0.0),
///         Customer::new(1, 3.0, 4.0, 10, 0.0),
///         Customer::new(2, 6.0, 8.0, 10, 0.0),
///     ],
///     100,
///     2,
/// )
/// .unwrap();
/// let sol = RoutingSolution::from_sequences(&problem, vec![vec![1], vec![]]);
/// assert_eq!(sol.num_routes(), 1);
/// assert_eq!(sol.unassigned(), &[2]);
/// assert!(!sol.is_feasible());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingSolution {
    routes: Vec<Route>,
    unassigned: Vec<usize>,
    duplicates: usize,
}

impl RoutingSolution {
    /// All customers unassigned, no routes.
    pub fn empty(problem: &VrptwProblem) -> Self {
        Self {
            routes: Vec::new(),
            unassigned: problem.customer_ids().collect(),
            duplicates: 0,
        }
    }

    /// Evaluates every sequence and derives the assignment state.
    pub fn from_sequences(problem: &VrptwProblem, sequences: Vec<Vec<usize>>) -> Self {
        let eval = RouteEvaluator::new(problem);
        let routes = sequences
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| eval.build_route(&s).0)
            .collect();
        Self::assemble(problem, routes)
    }

    fn assemble(problem: &VrptwProblem, routes: Vec<Route>) -> Self {
        let mut seen = vec![0usize; problem.num_customers() + 1];
        for route in &routes {
            for &c in route.customers() {
                seen[c] += 1;
            }
        }
        let unassigned = problem.customer_ids().filter(|&c| seen[c] == 0).collect();
        let duplicates = seen.iter().map(|&k| k.saturating_sub(1)).sum();
        Self {
            routes,
            unassigned,
            duplicates,
        }
    }

    /// Returns a copy with the given routes rebuilt from new sequences.
    ///
    /// Only the listed routes are re-evaluated; routes left empty are
    /// removed. Indices refer to the current route order.
    pub fn replace_routes(&self, problem: &VrptwProblem, changes: &[(usize, Vec<usize>)]) -> Self {
        let eval = RouteEvaluator::new(problem);
        let mut routes = self.routes.clone();
        for (idx, seq) in changes {
            routes[*idx] = eval.build_route(seq).0;
        }
        routes.retain(|r| !r.is_empty());
        Self::assemble(problem, routes)
    }

    /// Returns a copy with one more route appended.
    pub fn with_route(&self, problem: &VrptwProblem, sequence: Vec<usize>) -> Self {
        let mut sequences = self.sequences();
        sequences.push(sequence);
        Self::from_sequences(problem, sequences)
    }

    /// Returns the routes in this solution.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Customer sequences of all routes.
    pub fn sequences(&self) -> Vec<Vec<usize>> {
        self.routes.iter().map(|r| r.customers().to_vec()).collect()
    }

    /// Returns the number of routes (vehicles used).
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Returns the IDs of unassigned customers.
    pub fn unassigned(&self) -> &[usize] {
        &self.unassigned
    }

    /// Extra visits beyond the first for any customer.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Total distance across all routes.
    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(Route::total_distance).sum()
    }

    /// Total number of customer visits across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(Route::len).sum()
    }

    /// Route violations plus unassigned customers plus duplicate visits.
    pub fn violations(&self) -> usize {
        self.routes.iter().map(Route::violations).sum::<usize>()
            + self.unassigned.len()
            + self.duplicates
    }

    /// Position `(route, index)` of every customer, `None` if unrouted.
    ///
    /// For duplicated customers the last occurrence wins.
    pub fn positions(&self, num_customers: usize) -> Vec<Option<(usize, usize)>> {
        let mut pos = vec![None; num_customers + 1];
        for (r, route) in self.routes.iter().enumerate() {
            for (i, &c) in route.customers().iter().enumerate() {
                pos[c] = Some((r, i));
            }
        }
        pos
    }

    pub fn is_feasible(&self) -> bool {
        self.violations() == 0
    }

    pub fn fitness(&self) -> Fitness {
        Fitness::routing(
            self.violations() as u64,
            self.num_routes(),
            self.total_distance(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Customer;

    fn problem() -> VrptwProblem {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 3.0, 4.0, 10, 0.0),
            Customer::new(2, 6.0, 8.0, 20, 0.0),
            Customer::new(3, 0.0, 10.0, 15, 0.0),
        ];
        VrptwProblem::new(customers, 30, 3).expect("valid")
    }

    #[test]
    fn test_empty_solution() {
        let p = problem();
        let sol = RoutingSolution::empty(&p);
        assert_eq!(sol.num_routes(), 0);
        assert_eq!(sol.unassigned(), &[1, 2, 3]);
        assert_eq!(sol.violations(), 3);
        assert_eq!(sol.num_served(), 0);
    }

    #[test]
    fn test_duplicates_counted() {
        let p = problem();
        let sol = RoutingSolution::from_sequences(&p, vec![vec![1, 2], vec![2, 3]]);
        assert_eq!(sol.duplicates(), 1);
        assert!(sol.unassigned().is_empty());
        // 10 + 20 = 30 fits, 20 + 15 = 35 does not
        assert_eq!(sol.violations(), 2);
    }

    #[test]
    fn test_replace_routes_drops_empty() {
        let p = problem();
        let sol = RoutingSolution::from_sequences(&p, vec![vec![1], vec![2], vec![3]]);
        let moved = sol.replace_routes(&p, &[(0, vec![]), (2, vec![3, 1])]);
        assert_eq!(moved.num_routes(), 2);
        assert_eq!(moved.sequences(), vec![vec![2], vec![3, 1]]);
        assert!(moved.is_feasible());
        assert!(moved.fitness() < sol.fitness());
    }

    #[test]
    fn test_positions() {
        let p = problem();
        let sol = RoutingSolution::from_sequences(&p, vec![vec![2], vec![3, 1]]);
        let pos = sol.positions(3);
        assert_eq!(pos[1], Some((1, 1)));
        assert_eq!(pos[2], Some((0, 0)));
        assert_eq!(pos[0], None);
    }
}
