//! Operator contracts and their implementations on the name enums.
//!
//! Each implementation is a flat match from `(name, problem, solution)` to
//! the operator function, so dispatch costs one branch and adding a name
//! without wiring it fails to compile.

use rand::Rng;

use super::{ConstructorName, LocalSearchName, OperatorError, PerturbationName, RepairName};
use crate::constructive;
use crate::grammar::AcceptanceRule;
use crate::local_search::{
    descend, tabu_coloring, CrossExchange, Descent, FlipBestItem, FlipWorstItem, InterRelocate, KempeChain,
    OneExchange, OneVertexMove, OrOpt, Relocate, RoutingNeighborhood, SwapColors, SwapCustomers, ThreeOpt,
    TwoExchange, TwoOpt, TwoOptStar,
};
use crate::models::{GraphProblem, KnapsackProblem, Problem, VrptwProblem};
use crate::perturbation;
use crate::repair;
use crate::solution::{Coloring, KnapsackAssignment, RoutingSolution, Solution};

/// Builds a complete solution from scratch.
pub trait Constructor {
    fn build<R: Rng>(&self, problem: &Problem, rng: &mut R) -> Result<Solution, OperatorError>;
}

/// Returns a solution no worse than its input.
pub trait Improver {
    fn improve<R: Rng>(
        &self,
        solution: &Solution,
        problem: &Problem,
        acceptance: &AcceptanceRule,
        iter_cap: u32,
        rng: &mut R,
    ) -> Result<Descent<Solution>, OperatorError>;
}

/// Kicks a solution; the result may be infeasible.
pub trait Perturber {
    fn perturb<R: Rng>(
        &self,
        solution: &Solution,
        problem: &Problem,
        intensity: f64,
        rng: &mut R,
    ) -> Result<Solution, OperatorError>;
}

/// Restores feasibility whenever the instance allows it.
pub trait Repairer {
    fn repair<R: Rng>(&self, solution: &Solution, problem: &Problem, rng: &mut R) -> Result<Solution, OperatorError>;
}

fn solution_mismatch(operator: &str, problem: &Problem, solution: &Solution) -> OperatorError {
    OperatorError::mismatch(operator, problem.domain(), solution.domain())
}

impl Constructor for ConstructorName {
    fn build<R: Rng>(&self, problem: &Problem, rng: &mut R) -> Result<Solution, OperatorError> {
        let solution = match (self, problem) {
            (ConstructorName::Dsatur, Problem::Graph(g)) => constructive::dsatur(g).into(),
            (ConstructorName::LargestFirst, Problem::Graph(g)) => constructive::largest_first(g).into(),
            (ConstructorName::SmallestLast, Problem::Graph(g)) => constructive::smallest_last(g).into(),
            (ConstructorName::RandomSequential, Problem::Graph(g)) => constructive::random_sequential(g, rng).into(),
            (ConstructorName::Rlf, Problem::Graph(g)) => constructive::rlf(g).into(),
            (ConstructorName::ByValue, Problem::Knapsack(k)) => constructive::by_value(k).into(),
            (ConstructorName::ByWeight, Problem::Knapsack(k)) => constructive::by_weight(k).into(),
            (ConstructorName::ByRatio, Problem::Knapsack(k)) => constructive::by_ratio(k).into(),
            (ConstructorName::Random, Problem::Knapsack(k)) => constructive::random_fill(k, rng).into(),
            (ConstructorName::NearestNeighbor, Problem::Vrptw(p)) => constructive::nearest_neighbor(p).into(),
            (ConstructorName::RandomizedInsertion, Problem::Vrptw(p)) => {
                constructive::randomized_insertion(p, rng).into()
            }
            (ConstructorName::Savings, Problem::Vrptw(p)) => constructive::clarke_wright_savings(p).into(),
            (ConstructorName::TimeOrientedNearestNeighbor, Problem::Vrptw(p)) => {
                constructive::time_oriented_nearest_neighbor(p).into()
            }
            (ConstructorName::SolomonI1, Problem::Vrptw(p)) => constructive::solomon_i1(p).into(),
            (ConstructorName::RegretInsertion, Problem::Vrptw(p)) => constructive::regret_insertion(p).into(),
            _ => return Err(OperatorError::mismatch(self.as_str(), self.domain(), problem.domain())),
        };
        Ok(solution)
    }
}

fn improve_coloring<R: Rng>(
    name: &LocalSearchName,
    graph: &GraphProblem,
    coloring: &Coloring,
    acceptance: &AcceptanceRule,
    iter_cap: u32,
    rng: &mut R,
) -> Option<Descent<Coloring>> {
    let out = match name {
        LocalSearchName::KempeChain => descend(&KempeChain::new(graph), coloring, acceptance, iter_cap, rng),
        LocalSearchName::OneVertexMove => descend(&OneVertexMove::new(graph), coloring, acceptance, iter_cap, rng),
        LocalSearchName::SwapColors => descend(&SwapColors::new(graph), coloring, acceptance, iter_cap, rng),
        LocalSearchName::TabuColoring { tenure } => {
            // TabuCol carries its own acceptance (tabu list plus aspiration)
            let solution = tabu_coloring(graph, coloring, *tenure, iter_cap, rng);
            Descent {
                solution,
                steps: iter_cap as usize,
                accepted: iter_cap as usize,
                last_delta: None,
                last_accepted: None,
            }
        }
        _ => return None,
    };
    Some(out)
}

fn improve_knapsack<R: Rng>(
    name: &LocalSearchName,
    problem: &KnapsackProblem,
    assignment: &KnapsackAssignment,
    acceptance: &AcceptanceRule,
    iter_cap: u32,
    rng: &mut R,
) -> Option<Descent<KnapsackAssignment>> {
    let out = match name {
        LocalSearchName::FlipBestItem => descend(&FlipBestItem::new(problem), assignment, acceptance, iter_cap, rng),
        LocalSearchName::FlipWorstItem => descend(&FlipWorstItem::new(problem), assignment, acceptance, iter_cap, rng),
        LocalSearchName::OneExchange => descend(&OneExchange::new(problem), assignment, acceptance, iter_cap, rng),
        LocalSearchName::TwoExchange => descend(&TwoExchange::new(problem), assignment, acceptance, iter_cap, rng),
        _ => return None,
    };
    Some(out)
}

fn improve_routing<R: Rng>(
    name: &LocalSearchName,
    problem: &VrptwProblem,
    solution: &RoutingSolution,
    acceptance: &AcceptanceRule,
    iter_cap: u32,
    rng: &mut R,
) -> Option<Descent<RoutingSolution>> {
    macro_rules! run {
        ($moves:expr) => {
            descend(&RoutingNeighborhood::new(problem, $moves), solution, acceptance, iter_cap, rng)
        };
    }
    let out = match name {
        LocalSearchName::TwoOpt => run!(TwoOpt),
        LocalSearchName::OrOpt => run!(OrOpt),
        LocalSearchName::Relocate => run!(Relocate),
        LocalSearchName::ThreeOpt => run!(ThreeOpt),
        LocalSearchName::CrossExchange => run!(CrossExchange),
        LocalSearchName::TwoOptStar => run!(TwoOptStar),
        LocalSearchName::SwapCustomers => run!(SwapCustomers),
        LocalSearchName::InterRelocate => run!(InterRelocate),
        _ => return None,
    };
    Some(out)
}

impl Improver for LocalSearchName {
    fn improve<R: Rng>(
        &self,
        solution: &Solution,
        problem: &Problem,
        acceptance: &AcceptanceRule,
        iter_cap: u32,
        rng: &mut R,
    ) -> Result<Descent<Solution>, OperatorError> {
        let out = match (problem, solution) {
            (Problem::Graph(g), Solution::Coloring(c)) => {
                improve_coloring(self, g, c, acceptance, iter_cap, rng).map(|d| d.map(Solution::from))
            }
            (Problem::Knapsack(k), Solution::Knapsack(a)) => {
                improve_knapsack(self, k, a, acceptance, iter_cap, rng).map(|d| d.map(Solution::from))
            }
            (Problem::Vrptw(p), Solution::Routing(s)) => {
                improve_routing(self, p, s, acceptance, iter_cap, rng).map(|d| d.map(Solution::from))
            }
            _ => return Err(solution_mismatch(self.as_str(), problem, solution)),
        };
        out.ok_or_else(|| OperatorError::mismatch(self.as_str(), self.domain(), problem.domain()))
    }
}

impl Perturber for PerturbationName {
    fn perturb<R: Rng>(
        &self,
        solution: &Solution,
        problem: &Problem,
        intensity: f64,
        rng: &mut R,
    ) -> Result<Solution, OperatorError> {
        if !(intensity > 0.0 && intensity <= 1.0) {
            return Err(OperatorError::InvalidArgument {
                operator: self.as_str().to_string(),
                reason: format!("intensity {intensity} outside (0, 1]"),
            });
        }
        let out = match (self, problem, solution) {
            (PerturbationName::RandomRecolor, Problem::Graph(g), Solution::Coloring(c)) => {
                perturbation::random_recolor(g, c, intensity, rng).into()
            }
            (PerturbationName::PartialDestroy, Problem::Graph(g), Solution::Coloring(c)) => {
                perturbation::partial_destroy(g, c, intensity, rng).into()
            }
            (PerturbationName::RandomFlip, Problem::Knapsack(k), Solution::Knapsack(a)) => {
                perturbation::random_flip(k, a, intensity, rng).into()
            }
            (PerturbationName::DestroyByRemoval, Problem::Knapsack(k), Solution::Knapsack(a)) => {
                perturbation::destroy_by_removal(k, a, intensity, rng).into()
            }
            (PerturbationName::EjectionChain, Problem::Vrptw(p), Solution::Routing(s)) => {
                perturbation::ejection_chain(p, s, intensity, rng).into()
            }
            (PerturbationName::RuinAndRecreate, Problem::Vrptw(p), Solution::Routing(s)) => {
                perturbation::ruin_and_recreate(p, s, intensity, rng).into()
            }
            (PerturbationName::RandomRemoval, Problem::Vrptw(p), Solution::Routing(s)) => {
                perturbation::random_removal(p, s, intensity, rng).into()
            }
            (PerturbationName::RouteElimination, Problem::Vrptw(p), Solution::Routing(s)) => {
                perturbation::route_elimination(p, s, intensity, rng).into()
            }
            _ if problem.domain() != solution.domain() => {
                return Err(solution_mismatch(self.as_str(), problem, solution))
            }
            _ => return Err(OperatorError::mismatch(self.as_str(), self.domain(), problem.domain())),
        };
        Ok(out)
    }
}

impl Repairer for RepairName {
    fn repair<R: Rng>(&self, solution: &Solution, problem: &Problem, _rng: &mut R) -> Result<Solution, OperatorError> {
        let out = match (self, problem, solution) {
            (RepairName::SequentialResolution, Problem::Graph(g), Solution::Coloring(c)) => {
                repair::sequential_resolution(g, c).into()
            }
            (RepairName::GreedyRebuild, Problem::Graph(g), Solution::Coloring(c)) => {
                repair::greedy_rebuild(g, c).into()
            }
            (RepairName::RemoveLowestRatio, Problem::Knapsack(k), Solution::Knapsack(a)) => {
                repair::remove_lowest_ratio(k, a).into()
            }
            (RepairName::GreedyRefill, Problem::Knapsack(k), Solution::Knapsack(a)) => {
                repair::greedy_refill(k, a).into()
            }
            (RepairName::CapacityRepair, Problem::Vrptw(p), Solution::Routing(s)) => {
                repair::capacity_repair(p, s).into()
            }
            (RepairName::TimeWindowRepair, Problem::Vrptw(p), Solution::Routing(s)) => {
                repair::time_window_repair(p, s).into()
            }
            (RepairName::GreedyRepair, Problem::Vrptw(p), Solution::Routing(s)) => {
                repair::greedy_repair(p, s).into()
            }
            _ if problem.domain() != solution.domain() => {
                return Err(solution_mismatch(self.as_str(), problem, solution))
            }
            _ => return Err(OperatorError::mismatch(self.as_str(), self.domain(), problem.domain())),
        };
        Ok(out)
    }
}
