//! Fitness, route evaluation and solution scoring.
//!
//! - [`Fitness`] — Lexicographic `(violations, primary, secondary)` triple
//! - [`RouteEvaluator`] — Timing, load and violations of a VRPTW route
//! - [`Evaluator`] — Reports, gap to known best, comparison and ranking

mod evaluator;
mod fitness;
mod scoring;

pub use evaluator::{RouteEvaluator, RouteMeasure, Violation};
pub use fitness::{Fitness, ROUTING_ROUTE_WEIGHT, ROUTING_VIOLATION_WEIGHT};
pub use scoring::{Evaluation, Evaluator, Measure};
