//! Candidate solutions for the three domains.
//!
//! Each variant owns its state and keeps its derived quantities (conflicts,
//! weight and value, route timing) up to date, so [`Solution::fitness`] never
//! re-scans the instance.

mod assignment;
mod coloring;
mod routing;

pub use assignment::KnapsackAssignment;
pub use coloring::Coloring;
pub use routing::{Route, RoutingSolution, Visit};

use rand::Rng;

use crate::constructive;
use crate::evaluation::Fitness;
use crate::models::{Domain, Problem};

/// Anything with a lexicographic fitness.
pub trait Scored {
    fn fitness(&self) -> Fitness;
}

impl Scored for Coloring {
    fn fitness(&self) -> Fitness {
        Coloring::fitness(self)
    }
}

impl Scored for KnapsackAssignment {
    fn fitness(&self) -> Fitness {
        KnapsackAssignment::fitness(self)
    }
}

impl Scored for RoutingSolution {
    fn fitness(&self) -> Fitness {
        RoutingSolution::fitness(self)
    }
}

/// A solution of any domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    Coloring(Coloring),
    Knapsack(KnapsackAssignment),
    Routing(RoutingSolution),
}

impl Solution {
    /// Uncolored graph, empty selection, or every customer unassigned.
    pub fn empty(problem: &Problem) -> Self {
        match problem {
            Problem::Graph(g) => Solution::Coloring(Coloring::uncolored(g.num_vertices())),
            Problem::Knapsack(k) => Solution::Knapsack(KnapsackAssignment::empty(k)),
            Problem::Vrptw(v) => Solution::Routing(RoutingSolution::empty(v)),
        }
    }

    /// Greedy seed: DSATUR, best ratio first, or Solomon I1.
    ///
    /// None of these consume randomness; the generator is accepted so every
    /// factory shares one signature.
    pub fn greedy<R: Rng>(problem: &Problem, _rng: &mut R) -> Self {
        match problem {
            Problem::Graph(g) => Solution::Coloring(constructive::dsatur(g)),
            Problem::Knapsack(k) => Solution::Knapsack(constructive::by_ratio(k)),
            Problem::Vrptw(v) => Solution::Routing(constructive::solomon_i1(v)),
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            Solution::Coloring(_) => Domain::GraphColoring,
            Solution::Knapsack(_) => Domain::Knapsack,
            Solution::Routing(_) => Domain::Vrptw,
        }
    }

    pub fn fitness(&self) -> Fitness {
        match self {
            Solution::Coloring(c) => c.fitness(),
            Solution::Knapsack(k) => k.fitness(),
            Solution::Routing(r) => r.fitness(),
        }
    }

    pub fn is_feasible(&self) -> bool {
        match self {
            Solution::Coloring(c) => c.is_feasible(),
            Solution::Knapsack(k) => k.is_feasible(),
            Solution::Routing(r) => r.is_feasible(),
        }
    }

    /// Strict lexicographic improvement over `other`.
    pub fn is_better_than(&self, other: &Solution) -> bool {
        self.fitness().is_better_than(&other.fitness())
    }

    pub fn as_coloring(&self) -> Option<&Coloring> {
        match self {
            Solution::Coloring(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_knapsack(&self) -> Option<&KnapsackAssignment> {
        match self {
            Solution::Knapsack(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_routing(&self) -> Option<&RoutingSolution> {
        match self {
            Solution::Routing(r) => Some(r),
            _ => None,
        }
    }
}

impl Scored for Solution {
    fn fitness(&self) -> Fitness {
        Solution::fitness(self)
    }
}

impl From<Coloring> for Solution {
    fn from(c: Coloring) -> Self {
        Solution::Coloring(c)
    }
}

impl From<KnapsackAssignment> for Solution {
    fn from(k: KnapsackAssignment) -> Self {
        Solution::Knapsack(k)
    }
}

impl From<RoutingSolution> for Solution {
    fn from(r: RoutingSolution) -> Self {
        Solution::Routing(r)
    }
}
