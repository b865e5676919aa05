//! Problem sum type over the three supported domains.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{GraphProblem, KnapsackProblem, VrptwProblem};

/// The optimization domain an instance, solution, or operator belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    /// Graph coloring: minimize colors subject to proper coloring.
    GraphColoring,
    /// 0/1 knapsack: maximize value within the capacity.
    Knapsack,
    /// Vehicle routing with time windows.
    Vrptw,
}

impl Domain {
    /// All domains in declaration order.
    pub const ALL: [Domain; 3] = [Domain::GraphColoring, Domain::Knapsack, Domain::Vrptw];

    /// Short lowercase tag used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::GraphColoring => "coloring",
            Domain::Knapsack => "knapsack",
            Domain::Vrptw => "vrptw",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coloring" | "graph_coloring" | "graph-coloring" | "gcp" => Ok(Domain::GraphColoring),
            "knapsack" | "kp" => Ok(Domain::Knapsack),
            "vrptw" => Ok(Domain::Vrptw),
            other => Err(format!("unknown domain `{other}`")),
        }
    }
}

/// A parsed problem instance.
///
/// Domain specific accessors return `None` when asked of another domain.
///
/// # Examples
///
/// ```
/// use u_ils::models::{Domain, GraphProblem, Problem};
///
/// let p = Problem::from(GraphProblem::new(3, [(0, 1), (1, 2)]).unwrap());
/// assert_eq!(p.domain(), Domain::GraphColoring);
/// assert_eq!(p.size(), 3);
/// assert_eq!(p.neighbors(1), Some(&[0, 2][..]));
/// assert_eq!(p.distance(0, 1), None);
/// ```
#[derive(Debug, Clone)]
pub enum Problem {
    Graph(GraphProblem),
    Knapsack(KnapsackProblem),
    Vrptw(VrptwProblem),
}

impl Problem {
    pub fn domain(&self) -> Domain {
        match self {
            Problem::Graph(_) => Domain::GraphColoring,
            Problem::Knapsack(_) => Domain::Knapsack,
            Problem::Vrptw(_) => Domain::Vrptw,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Problem::Graph(g) => g.name(),
            Problem::Knapsack(k) => k.name(),
            Problem::Vrptw(v) => v.name(),
        }
    }

    /// Vertices, items, or customers (depot excluded).
    pub fn size(&self) -> usize {
        match self {
            Problem::Graph(g) => g.num_vertices(),
            Problem::Knapsack(k) => k.num_items(),
            Problem::Vrptw(v) => v.num_customers(),
        }
    }

    /// Sorted neighbors of vertex `v`.
    pub fn neighbors(&self, v: usize) -> Option<&[usize]> {
        self.as_graph().map(|g| g.neighbors(v))
    }

    /// Travel distance between two VRPTW nodes.
    pub fn distance(&self, i: usize, j: usize) -> Option<f64> {
        self.as_vrptw().map(|p| p.distance(i, j))
    }

    /// Demand of VRPTW node `i`.
    pub fn demand(&self, i: usize) -> Option<i32> {
        self.as_vrptw().map(|p| p.customer(i).demand())
    }

    /// Service time of VRPTW node `i`.
    pub fn service_time(&self, i: usize) -> Option<f64> {
        self.as_vrptw().map(|p| p.customer(i).service_duration())
    }

    /// `(ready, due)` of VRPTW node `i`.
    pub fn time_window(&self, i: usize) -> Option<(f64, f64)> {
        self.as_vrptw().map(|p| {
            let c = p.customer(i);
            (c.ready(), c.due())
        })
    }

    /// Known best objective: chromatic number, knapsack optimum, or best
    /// known VRPTW distance.
    pub fn known_best(&self) -> Option<f64> {
        match self {
            Problem::Graph(g) => g.known_chromatic().map(|k| k as f64),
            Problem::Knapsack(k) => k.known_optimum().map(|v| v as f64),
            Problem::Vrptw(v) => v.best_known().map(|(_, d)| d),
        }
    }

    pub fn as_graph(&self) -> Option<&GraphProblem> {
        match self {
            Problem::Graph(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_knapsack(&self) -> Option<&KnapsackProblem> {
        match self {
            Problem::Knapsack(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_vrptw(&self) -> Option<&VrptwProblem> {
        match self {
            Problem::Vrptw(v) => Some(v),
            _ => None,
        }
    }
}

impl From<GraphProblem> for Problem {
    fn from(g: GraphProblem) -> Self {
        Problem::Graph(g)
    }
}

impl From<KnapsackProblem> for Problem {
    fn from(k: KnapsackProblem) -> Self {
        Problem::Knapsack(k)
    }
}

impl From<VrptwProblem> for Problem {
    fn from(v: VrptwProblem) -> Self {
        Problem::Vrptw(v)
    }
}
