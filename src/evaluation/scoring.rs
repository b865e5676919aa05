//! Problem-aware scoring: evaluation reports, comparison and ranking.

use super::Fitness;
use crate::models::Problem;
use crate::solution::Solution;

/// Domain specific measurements of a solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Coloring {
        conflicts: usize,
        uncolored: usize,
        colors: usize,
    },
    Knapsack {
        weight: u64,
        value: u64,
    },
    Routing {
        violations: usize,
        routes: usize,
        distance: f64,
    },
}

impl Measure {
    /// The objective compared against the known best: colors, value, or
    /// distance.
    pub fn objective(&self) -> f64 {
        match *self {
            Measure::Coloring { colors, .. } => colors as f64,
            Measure::Knapsack { value, .. } => value as f64,
            Measure::Routing { distance, .. } => distance,
        }
    }
}

/// Result of [`Evaluator::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub fitness: Fitness,
    pub feasible: bool,
    pub measure: Measure,
    /// Percentage gap of the objective to the instance's known best.
    pub gap_to_known: Option<f64>,
}

/// Scores solutions of one problem instance.
///
/// # Examples
///
/// ```
/// use u_ils::evaluation::Evaluator;
/// use u_ils::models::{GraphProblem, Problem};
/// use u_ils::solution::{Coloring, Solution};
///
/// let g = GraphProblem::new(3, [(0, 1), (1, 2), (0, 2)])
///     .unwrap()
///     .with_known_chromatic(3);
/// let c = Coloring::from_colors(&g, vec![1, 2, 3]);
/// let problem = Problem::from(g);
/// let eval = Evaluator::new(&problem);
/// let report = eval.evaluate(&Solution::from(c));
/// assert!(report.feasible);
/// assert_eq!(report.gap_to_known, Some(0.0));
/// ```
pub struct Evaluator<'a> {
    problem: &'a Problem,
}

impl<'a> Evaluator<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self { problem }
    }

    pub fn evaluate(&self, solution: &Solution) -> Evaluation {
        let measure = match solution {
            Solution::Coloring(c) => Measure::Coloring {
                conflicts: c.conflicts(),
                uncolored: c.uncolored_count(),
                colors: c.num_colors(),
            },
            Solution::Knapsack(k) => Measure::Knapsack {
                weight: k.weight(),
                value: k.value(),
            },
            Solution::Routing(r) => Measure::Routing {
                violations: r.violations(),
                routes: r.num_routes(),
                distance: r.total_distance(),
            },
        };
        Evaluation {
            fitness: solution.fitness(),
            feasible: solution.is_feasible(),
            measure,
            gap_to_known: self.gap(measure.objective()),
        }
    }

    /// Strict lexicographic comparison; fewer violations always win.
    pub fn better(&self, a: &Solution, b: &Solution) -> bool {
        a.fitness() < b.fitness()
    }

    /// `(value − known) / known × 100`, or `None` without a known best.
    ///
    /// For knapsack the known best is a maximum, so the gap is non-positive.
    pub fn gap(&self, value: f64) -> Option<f64> {
        self.problem
            .known_best()
            .filter(|&known| known != 0.0)
            .map(|known| (value - known) / known * 100.0)
    }

    /// The best solution of a slice, earliest on ties.
    pub fn best_of<'s>(&self, solutions: &'s [Solution]) -> Option<&'s Solution> {
        solutions
            .iter()
            .reduce(|best, s| if self.better(s, best) { s } else { best })
    }

    /// Indices sorted best first; equal fitness keeps input order.
    pub fn rank(&self, solutions: &[Solution]) -> Vec<usize> {
        let fitness: Vec<Fitness> = solutions.iter().map(Solution::fitness).collect();
        let mut order: Vec<usize> = (0..solutions.len()).collect();
        order.sort_by(|&a, &b| fitness[a].cmp(&fitness[b]));
        order
    }
}
