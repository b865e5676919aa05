//! VRPTW nodes: the depot and the customers, with their service windows.

use serde::{Deserialize, Serialize};

/// Tolerance on window closing times, absorbing floating-point drift in
/// accumulated travel times.
const LATENESS_EPS: f64 = 1e-9;

/// Interval `[ready, due]` in which service must start.
///
/// Early arrivals wait until `ready`; arrivals after `due` are late.
///
/// ```
/// use u_ils::models::TimeWindow;
///
/// let tw = TimeWindow::new(912.0, 967.0).unwrap();
/// assert_eq!(tw.service_start(900.0), 912.0);
/// assert_eq!(tw.lateness(970.0), 3.0);
/// assert!(TimeWindow::new(10.0, 5.0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    ready: f64,
    due: f64,
}

impl TimeWindow {
    /// `None` unless both bounds are finite and `ready <= due`.
    pub fn new(ready: f64, due: f64) -> Option<Self> {
        (ready.is_finite() && due.is_finite() && ready <= due).then_some(Self { ready, due })
    }

    pub fn ready(&self) -> f64 {
        self.ready
    }

    pub fn due(&self) -> f64 {
        self.due
    }

    pub fn width(&self) -> f64 {
        self.due - self.ready
    }

    pub fn contains(&self, t: f64) -> bool {
        (self.ready..=self.due).contains(&t)
    }

    /// When service starts for a vehicle arriving at `arrival`.
    pub fn service_start(&self, arrival: f64) -> f64 {
        arrival.max(self.ready)
    }

    /// How far `arrival` falls after the window closes.
    pub fn lateness(&self, arrival: f64) -> f64 {
        (arrival - self.due).max(0.0)
    }

    pub fn is_late(&self, arrival: f64) -> bool {
        arrival > self.due + LATENESS_EPS
    }
}

/// A node of a VRPTW instance. Node 0 is the depot.
///
/// ```
/// use u_ils::models::{Customer, TimeWindow};
///
/// let depot = Customer::depot(40.0, 50.0);
/// assert!(depot.is_depot());
///
/// let c = Customer::new(1, 45.0, 68.0, 10, 90.0)
///     .with_time_window(TimeWindow::new(912.0, 967.0).unwrap());
/// assert_eq!(c.ready(), 912.0);
/// assert!((c.distance_to(&depot) - 18.681).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    id: usize,
    x: f64,
    y: f64,
    demand: i32,
    service_duration: f64,
    window: Option<TimeWindow>,
}

impl Customer {
    /// A node without a time window.
    pub fn new(id: usize, x: f64, y: f64, demand: i32, service_duration: f64) -> Self {
        Self {
            id,
            x,
            y,
            demand,
            service_duration,
            window: None,
        }
    }

    /// Node 0 with no demand and no service time.
    pub fn depot(x: f64, y: f64) -> Self {
        Self::new(0, x, y, 0, 0.0)
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_depot(&self) -> bool {
        self.id == 0
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn demand(&self) -> i32 {
        self.demand
    }

    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    pub fn time_window(&self) -> Option<TimeWindow> {
        self.window
    }

    /// Window opening, `0.0` when unconstrained.
    pub fn ready(&self) -> f64 {
        self.window.map_or(0.0, |w| w.ready)
    }

    /// Window closing, `f64::INFINITY` when unconstrained.
    pub fn due(&self) -> f64 {
        self.window.map_or(f64::INFINITY, |w| w.due)
    }

    /// Euclidean distance, which is also the travel time.
    pub fn distance_to(&self, other: &Customer) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
