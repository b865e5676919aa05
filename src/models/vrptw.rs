//! Vehicle routing problem with time windows.

use super::{Customer, ModelError};
use crate::distance::DistanceMatrix;

/// A VRPTW instance: a depot (node 0) plus `n` customers served by a
/// homogeneous fleet.
///
/// Travel time equals Euclidean distance. The depot's time window closes the
/// planning horizon; a route returning after it is late.
///
/// # Examples
///
/// ```
/// use u_ils::models::{Customer, TimeWindow, VrptwProblem};
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0).with_time_window(TimeWindow::new(0.0, 100.0).unwrap()),
///     Customer::new(1, 3.0, 4.0, 10, 5.0),
///     Customer::new(2, 6.0, 8.0, 20, 5.0),
/// ];
/// let p = VrptwProblem::new(customers, 50, 5).unwrap();
/// assert_eq!(p.num_customers(), 2);
/// assert!((p.distance(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(p.horizon(), 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct VrptwProblem {
    name: String,
    customers: Vec<Customer>,
    capacity: i32,
    fleet_size: usize,
    distances: DistanceMatrix,
    best_known: Option<(usize, f64)>,
}

impl VrptwProblem {
    /// Builds an instance from the depot followed by its customers.
    ///
    /// Ids must run `0..=n` in order, the depot must carry no demand, and
    /// demands and service times must be non-negative.
    pub fn new(customers: Vec<Customer>, capacity: i32, fleet_size: usize) -> Result<Self, ModelError> {
        if customers.len() < 2 {
            return Err(ModelError::Empty);
        }
        if capacity <= 0 {
            return Err(ModelError::NonPositiveCapacity);
        }
        for (position, c) in customers.iter().enumerate() {
            if c.id() != position {
                return Err(ModelError::NonConsecutiveIds { position, id: c.id() });
            }
            if c.demand() < 0 || c.service_duration() < 0.0 {
                return Err(ModelError::NegativeParameter { node: position });
            }
        }
        if customers[0].demand() != 0 {
            return Err(ModelError::DepotDemand {
                demand: customers[0].demand(),
            });
        }

        let distances = DistanceMatrix::from_customers(&customers);
        Ok(Self {
            name: String::new(),
            customers,
            capacity,
            fleet_size,
            distances,
            best_known: None,
        })
    }

    /// Sets the instance name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Records the best known `(routes, distance)` pair.
    pub fn with_best_known(mut self, routes: usize, distance: f64) -> Self {
        self.best_known = Some((routes, distance));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All nodes, depot first.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn customer(&self, id: usize) -> &Customer {
        &self.customers[id]
    }

    pub fn depot(&self) -> &Customer {
        &self.customers[0]
    }

    /// Number of customers, excluding the depot.
    pub fn num_customers(&self) -> usize {
        self.customers.len() - 1
    }

    /// Customer ids `1..=n`.
    pub fn customer_ids(&self) -> impl Iterator<Item = usize> {
        1..self.customers.len()
    }

    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    pub fn fleet_size(&self) -> usize {
        self.fleet_size
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Latest return time at the depot.
    pub fn horizon(&self) -> f64 {
        self.customers[0].due()
    }

    pub fn best_known(&self) -> Option<(usize, f64)> {
        self.best_known
    }

    /// Sum of all customer demands.
    pub fn total_demand(&self) -> i64 {
        self.customers.iter().map(|c| i64::from(c.demand())).sum()
    }
}
