//! Lexicographic fitness shared by every solution type.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Penalty per violation in the VRPTW scalar.
pub const ROUTING_VIOLATION_WEIGHT: f64 = 1e6;

/// Weight per route in the VRPTW scalar.
pub const ROUTING_ROUTE_WEIGHT: f64 = 1e3;

/// A minimized `(violations, primary, secondary)` triple plus a scalar
/// collapse of it.
///
/// Ordering is lexicographic on the triple, so any solution with fewer
/// violations beats every solution with more, regardless of objective. The
/// scalar is used where a single number is needed (Metropolis ΔE, traces).
///
/// # Examples
///
/// ```
/// use u_ils::evaluation::Fitness;
///
/// let proper = Fitness::coloring(0, 4, 0.0, 10);
/// let improper = Fitness::coloring(1, 3, 0.0, 10);
/// assert!(proper < improper);
/// assert_eq!(improper.scalar(), 14.0);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fitness {
    /// Count of hard-constraint violations.
    pub violations: u64,
    /// Main objective (colors, negated value, routes).
    pub primary: f64,
    /// Tie-breaking objective.
    pub secondary: f64,
    scalar: f64,
}

impl Fitness {
    /// Fitness of a coloring.
    ///
    /// `violations` counts conflicting edges plus uncolored vertices, `colors`
    /// is k and `balance` is a tie-breaker (lower is better). The scalar is
    /// `violations · (n + 1) + k`.
    pub fn coloring(violations: u64, colors: usize, balance: f64, n: usize) -> Self {
        Self {
            violations,
            primary: colors as f64,
            secondary: balance,
            scalar: violations as f64 * (n as f64 + 1.0) + colors as f64,
        }
    }

    /// Fitness of a knapsack assignment with a linear overweight penalty.
    pub fn knapsack(overweight: u64, value: u64, penalty: f64) -> Self {
        Self {
            violations: overweight,
            primary: -(value as f64),
            secondary: 0.0,
            scalar: -(value as f64) + overweight as f64 * penalty,
        }
    }

    /// Fitness of a routing solution.
    pub fn routing(violations: u64, routes: usize, distance: f64) -> Self {
        Self {
            violations,
            primary: routes as f64,
            secondary: distance,
            scalar: violations as f64 * ROUTING_VIOLATION_WEIGHT
                + routes as f64 * ROUTING_ROUTE_WEIGHT
                + distance,
        }
    }

    /// Single-number collapse of the triple.
    pub fn scalar(&self) -> f64 {
        self.scalar
    }

    /// Returns `true` if there are no violations.
    pub fn is_feasible(&self) -> bool {
        self.violations == 0
    }

    /// Strict lexicographic improvement.
    pub fn is_better_than(&self, other: &Fitness) -> bool {
        self.cmp(other) == Ordering::Less
    }
}

impl PartialEq for Fitness {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fitness {}

impl PartialOrd for Fitness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fitness {
    fn cmp(&self, other: &Self) -> Ordering {
        self.violations
            .cmp(&other.violations)
            .then_with(|| self.primary.total_cmp(&other.primary))
            .then_with(|| self.secondary.total_cmp(&other.secondary))
    }
}

impl fmt::Display for Fitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {:.4})",
            self.violations, self.primary, self.secondary
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violations_dominate() {
        let a = Fitness::routing(0, 20, 5000.0);
        let b = Fitness::routing(1, 1, 10.0);
        assert!(a.is_better_than(&b));
        assert!(a.scalar() < b.scalar());
    }

    #[test]
    fn test_knapsack_order() {
        let better = Fitness::knapsack(0, 90, 2.0);
        let worse = Fitness::knapsack(0, 80, 2.0);
        assert!(better < worse);
        assert_eq!(better.scalar(), -90.0);
        let over = Fitness::knapsack(5, 130, 2.0);
        assert!(better < over);
        assert_eq!(over.scalar(), -120.0);
    }

    #[test]
    fn test_secondary_breaks_ties() {
        let a = Fitness::coloring(0, 3, -20.0, 10);
        let b = Fitness::coloring(0, 3, -18.0, 10);
        assert!(a < b);
        assert_eq!(a.scalar(), b.scalar());
        assert_eq!(a, Fitness::coloring(0, 3, -20.0, 10));
    }

    #[test]
    fn test_serde_keeps_scalar() {
        let f = Fitness::routing(2, 3, 123.5);
        let json = serde_json::to_string(&f).expect("serialize");
        let back: Fitness = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, f);
        assert_eq!(back.scalar(), f.scalar());
    }
}
