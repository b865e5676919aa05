//! AST interpreter.
//!
//! Walks a validated program over one [`ExecutionContext`], dispatching
//! each node with a flat match. Terminals call the operator library through
//! the traits of [`crate::operators`]; control nodes loop and branch on the
//! context.
//!
//! # Iterations and trace
//!
//! A *pass* is one execution of a loop body, at any nesting level. Each
//! pass bumps the iteration counter and resets (best improved) or advances
//! the stagnation counter. One trace record is appended per pass of a
//! top-level loop, per top-level statement that is not a loop, or once for
//! a root that is a single non-loop node.
//!
//! # Failure
//!
//! Validation errors are returned before anything runs. Operator errors end
//! the run with [`RunStatus::Failed`], a final trace record carrying the
//! message and whatever best solution was reached. An expired `time_limit`
//! ends the run cleanly with [`RunStatus::BudgetExceeded`]; it is checked
//! at loop boundaries and between top-level statements, so the first
//! statement always runs.

mod context;
mod trace;

pub use context::{Counters, ExecutionContext};
pub use trace::{Trace, TraceListener, TraceRecord};

use std::fmt;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, trace, warn};

use crate::evaluation::Fitness;
use crate::grammar::{validate, AcceptanceRule, Budget, Condition, GrammarConfig, Node, StopRule, ValidationError};
use crate::models::{Domain, Problem};
use crate::operators::{lower_call, Constructor, Improver, OperatorError, Perturber, Repairer};
use crate::solution::Solution;

/// Interpreter limits.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_ils::interpreter::InterpreterConfig;
///
/// let config = InterpreterConfig::default()
///     .with_time_limit(Duration::from_secs(5))
///     .with_while_stagnation_limit(20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Wall-clock limit, checked at loop boundaries and between top-level
    /// statements.
    pub time_limit: Option<Duration>,

    /// `While` stops after this many consecutive passes without improving
    /// the best solution.
    pub while_stagnation_limit: usize,

    /// Hard cap on the passes of any single loop.
    pub max_loop_passes: usize,

    /// Structural limits checked before running; the domain is taken from
    /// the problem.
    pub grammar: GrammarConfig,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            time_limit: None,
            while_stagnation_limit: 50,
            max_loop_passes: 10_000,
            grammar: GrammarConfig::default(),
        }
    }
}

impl InterpreterConfig {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_while_stagnation_limit(mut self, n: usize) -> Self {
        self.while_stagnation_limit = n;
        self
    }

    pub fn with_max_loop_passes(mut self, n: usize) -> Self {
        self.max_loop_passes = n;
        self
    }

    pub fn with_grammar(mut self, grammar: GrammarConfig) -> Self {
        self.grammar = grammar;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit == Some(Duration::ZERO) {
            return Err("time_limit must be positive".into());
        }
        if self.while_stagnation_limit == 0 {
            return Err("while_stagnation_limit must be positive".into());
        }
        if self.max_loop_passes == 0 {
            return Err("max_loop_passes must be positive".into());
        }
        self.grammar.validate()
    }
}

/// Why a program could not be run to completion.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpreterError {
    /// The program failed grammar validation; nothing ran.
    Validation(ValidationError),
    /// The interpreter configuration is invalid.
    InvalidConfig(String),
    /// A `Call` names no operator of the domain.
    UnknownOperator { name: String, domain: Domain },
    /// A `Call` argument is missing or malformed.
    InvalidArgument { operator: String, reason: String },
    /// An operator rejected its input.
    Operator(OperatorError),
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "invalid program: {e}"),
            Self::InvalidConfig(reason) => write!(f, "invalid interpreter configuration: {reason}"),
            Self::UnknownOperator { name, domain } => write!(f, "unknown operator `{name}` for {domain}"),
            Self::InvalidArgument { operator, reason } => write!(f, "{operator}: {reason}"),
            Self::Operator(e) => write!(f, "operator failed: {e}"),
        }
    }
}

impl std::error::Error for InterpreterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Operator(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for InterpreterError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<OperatorError> for InterpreterError {
    fn from(e: OperatorError) -> Self {
        match e {
            OperatorError::UnknownOperator { name, domain } => Self::UnknownOperator { name, domain },
            OperatorError::InvalidArgument { operator, reason } => Self::InvalidArgument { operator, reason },
            other => Self::Operator(other),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Completed,
    /// The wall-clock limit expired; the best-so-far is still valid.
    BudgetExceeded,
    Failed { error: InterpreterError },
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct Execution {
    /// Best solution seen, `None` if nothing was ever constructed.
    pub best: Option<Solution>,
    pub trace: Trace,
    pub status: RunStatus,
    pub counters: Counters,
    pub elapsed: Duration,
}

impl Execution {
    pub fn best_fitness(&self) -> Option<Fitness> {
        self.best.as_ref().map(Solution::fitness)
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Non-local exits of the tree walk.
enum Halt {
    Budget,
    Error(InterpreterError),
}

impl From<OperatorError> for Halt {
    fn from(e: OperatorError) -> Self {
        Halt::Error(e.into())
    }
}

/// Effect of one loop pass.
struct Pass {
    improved_current: bool,
    improved_best: bool,
}

fn improved(before: Option<Fitness>, after: Option<Fitness>) -> bool {
    match (before, after) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(b), Some(a)) => a.is_better_than(&b),
    }
}

fn require<'s>(current: &'s Option<Solution>, operator: &str) -> Result<&'s Solution, OperatorError> {
    current.as_ref().ok_or_else(|| OperatorError::MissingSolution {
        operator: operator.to_string(),
    })
}

/// Widens through the decimal form so `0.3f32` becomes `0.3`, not
/// `0.30000001192092896`.
fn widen(x: f32) -> f64 {
    x.to_string().parse().unwrap_or(f64::from(x))
}

/// Tree-walking interpreter.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Validates `ast` for the problem's domain and runs it from `seed`.
    pub fn execute(&self, ast: &Node, problem: &Problem, seed: u64) -> Result<Execution, InterpreterError> {
        self.prepare(ast, problem)?;
        self.run(ast, ExecutionContext::new(problem, seed), seed)
    }

    /// Like [`execute`](Self::execute), reporting every trace record to
    /// `listener` as it is appended.
    pub fn execute_with_listener(
        &self,
        ast: &Node,
        problem: &Problem,
        seed: u64,
        listener: &mut dyn TraceListener,
    ) -> Result<Execution, InterpreterError> {
        self.prepare(ast, problem)?;
        self.run(ast, ExecutionContext::new(problem, seed).with_listener(listener), seed)
    }

    fn prepare(&self, ast: &Node, problem: &Problem) -> Result<(), InterpreterError> {
        self.config.validate().map_err(InterpreterError::InvalidConfig)?;
        let grammar = self.config.grammar.clone().with_domain(problem.domain());
        validate(ast, &grammar)?;
        Ok(())
    }

    fn run(&self, ast: &Node, mut ctx: ExecutionContext<'_>, seed: u64) -> Result<Execution, InterpreterError> {
        let problem = ctx.problem();
        debug!(
            domain = %problem.domain(),
            instance = problem.name(),
            seed,
            size = ast.size(),
            depth = ast.depth(),
            "run started"
        );
        let status = match self.run_root(ast, &mut ctx) {
            Ok(()) => RunStatus::Completed,
            Err(Halt::Budget) => RunStatus::BudgetExceeded,
            Err(Halt::Error(error)) => {
                let reason = error.to_string();
                warn!(seed, error = %reason, "run failed");
                ctx.record(Some(reason));
                RunStatus::Failed { error }
            }
        };
        let elapsed = ctx.elapsed();
        let (best, trace, counters) = ctx.into_parts();
        debug!(
            ?status,
            iterations = counters.iterations,
            records = trace.len(),
            best = ?best.as_ref().map(|s| s.fitness().scalar()),
            elapsed_ms = elapsed.as_millis() as u64,
            "run finished"
        );
        Ok(Execution {
            best,
            trace,
            status,
            counters,
            elapsed,
        })
    }

    fn check_deadline(&self, ctx: &ExecutionContext<'_>) -> Result<(), Halt> {
        match self.config.time_limit {
            Some(limit) if ctx.elapsed() >= limit => Err(Halt::Budget),
            _ => Ok(()),
        }
    }

    fn run_root(&self, root: &Node, ctx: &mut ExecutionContext<'_>) -> Result<(), Halt> {
        match root {
            Node::Seq { body } => {
                for (i, statement) in body.iter().enumerate() {
                    if i > 0 {
                        self.check_deadline(ctx)?;
                    }
                    self.run_statement(statement, ctx)?;
                }
                Ok(())
            }
            other => self.run_statement(other, ctx),
        }
    }

    /// A top-level statement: loops record per pass, anything else once.
    fn run_statement(&self, statement: &Node, ctx: &mut ExecutionContext<'_>) -> Result<(), Halt> {
        if statement.is_loop() {
            return self.exec_loop(statement, ctx, true);
        }
        let before = ctx.current_fitness();
        self.exec(statement, ctx)?;
        ctx.last_improved = improved(before, ctx.current_fitness());
        ctx.record(None);
        Ok(())
    }

    fn pass(&self, body: &Node, ctx: &mut ExecutionContext<'_>, emit: bool) -> Result<Pass, Halt> {
        self.check_deadline(ctx)?;
        let before = ctx.current_fitness();
        let improvements = ctx.counters.improvements;
        self.exec(body, ctx)?;

        let improved_best = ctx.counters.improvements > improvements;
        let improved_current = improved(before, ctx.current_fitness());
        ctx.counters.iterations += 1;
        ctx.counters.since_improvement = if improved_best {
            0
        } else {
            ctx.counters.since_improvement + 1
        };
        ctx.last_improved = improved_current;
        if emit {
            ctx.record(None);
        }
        Ok(Pass {
            improved_current,
            improved_best,
        })
    }

    fn exec_loop(&self, node: &Node, ctx: &mut ExecutionContext<'_>, emit: bool) -> Result<(), Halt> {
        let cap = self.config.max_loop_passes;
        match node {
            Node::While { budget, body } => {
                let started = Instant::now();
                let mut stale = 0;
                for passes in 0..cap {
                    let exhausted = match budget {
                        Budget::IterBudget { n } => passes >= *n as usize,
                        Budget::TimeBudget { seconds } => started.elapsed().as_secs_f64() >= *seconds,
                    };
                    if exhausted {
                        break;
                    }
                    let pass = self.pass(body, ctx, emit)?;
                    stale = if pass.improved_best { 0 } else { stale + 1 };
                    if stale >= self.config.while_stagnation_limit {
                        trace!(passes = passes + 1, "while stopped on stagnation");
                        break;
                    }
                }
            }
            Node::For { iterations, body } => {
                for _ in 0..(*iterations as usize).min(cap) {
                    self.pass(body, ctx, emit)?;
                }
            }
            Node::ChooseBestOf { n, body } => {
                let snapshot = ctx.current.clone();
                let mut winner: Option<Solution> = None;
                for _ in 0..(*n as usize).min(cap) {
                    ctx.current = snapshot.clone();
                    self.pass(body, ctx, emit)?;
                    if let Some(result) = ctx.current.take() {
                        match &winner {
                            Some(w) if !result.is_better_than(w) => {}
                            _ => winner = Some(result),
                        }
                    }
                }
                ctx.current = winner.or(snapshot);
            }
            Node::ApplyUntilNoImprove { body, stop } => match stop {
                StopRule::MaxIter { n } => {
                    for _ in 0..(*n as usize).min(cap) {
                        if !self.pass(body, ctx, emit)?.improved_current {
                            break;
                        }
                    }
                }
                StopRule::Stagnation { k } => {
                    // Stale passes count against the best reached inside
                    // this loop, not against the moving current solution.
                    let mut loop_best = ctx.current_fitness();
                    let mut stale = 0;
                    for passes in 0..cap {
                        self.pass(body, ctx, emit)?;
                        let now = ctx.current_fitness();
                        if improved(loop_best, now) {
                            loop_best = now;
                            stale = 0;
                        } else {
                            stale += 1;
                        }
                        if stale >= *k as usize {
                            trace!(passes = passes + 1, "apply-until-no-improve stopped on stagnation");
                            break;
                        }
                    }
                }
            },
            other => return self.exec(other, ctx),
        }
        Ok(())
    }

    fn condition(&self, cond: &Condition, ctx: &mut ExecutionContext<'_>) -> bool {
        match cond {
            Condition::IsFeasible => ctx.current.as_ref().is_some_and(Solution::is_feasible),
            Condition::Improves => ctx.last_improved,
            Condition::Stagnation { k } => ctx.is_stagnating(*k),
            Condition::Prob { p } => ctx.rng.random::<f64>() < *p,
        }
    }

    fn exec(&self, node: &Node, ctx: &mut ExecutionContext<'_>) -> Result<(), Halt> {
        trace!(node = node.kind(), "dispatch");
        let problem = ctx.problem();
        match node {
            Node::Seq { body } => {
                for child in body {
                    self.exec(child, ctx)?;
                }
            }
            Node::If { cond, then, otherwise } => {
                if self.condition(cond, ctx) {
                    self.exec(then, ctx)?;
                } else if let Some(other) = otherwise {
                    self.exec(other, ctx)?;
                }
            }
            Node::While { .. } | Node::For { .. } | Node::ChooseBestOf { .. } | Node::ApplyUntilNoImprove { .. } => {
                self.exec_loop(node, ctx, false)?;
            }
            Node::GreedyConstruct { heuristic } => {
                let built = heuristic.build(problem, &mut ctx.rng)?;
                ctx.set_current(built);
            }
            Node::LocalSearch {
                neighborhood,
                acceptance,
                iter_cap,
            } => {
                let start = require(&ctx.current, neighborhood.as_str())?;
                let start_fit = start.fitness();
                let descent = neighborhood.improve(start, problem, acceptance, *iter_cap, &mut ctx.rng)?;
                ctx.counters.evaluations += descent.steps;
                let candidate = descent.solution;
                let cand_fit = candidate.fitness();
                let accept = match acceptance {
                    AcceptanceRule::Improving | AcceptanceRule::FirstImproving => {
                        let accept = cand_fit.is_better_than(&start_fit);
                        ctx.decision.accepted = Some(accept);
                        accept
                    }
                    // The driver already drew the Metropolis decisions and
                    // hands back the best state it walked through.
                    AcceptanceRule::Metropolis { temperature } => {
                        ctx.decision.delta_e = descent.last_delta;
                        ctx.decision.temperature = Some(*temperature);
                        ctx.decision.accepted = descent.last_accepted;
                        !start_fit.is_better_than(&cand_fit)
                    }
                    AcceptanceRule::AlwaysAccept => {
                        ctx.decision.accepted = Some(true);
                        true
                    }
                };
                if accept {
                    ctx.set_current(candidate);
                }
            }
            Node::Perturbation { operator, intensity } => {
                let current = require(&ctx.current, operator.as_str())?;
                let kicked = operator.perturb(current, problem, widen(*intensity), &mut ctx.rng)?;
                ctx.set_current(kicked);
            }
            Node::Repair { operator } => {
                let current = require(&ctx.current, operator.as_str())?;
                let repaired = operator.repair(current, problem, &mut ctx.rng)?;
                ctx.set_current(repaired);
            }
            Node::Call { operator_name, args } => {
                let lowered = lower_call(operator_name, args, problem.domain())?;
                self.exec(&lowered, ctx)?;
            }
        }
        Ok(())
    }
}

/// Runs `ast` on `problem` from `seed` with the default configuration.
///
/// # Examples
///
/// ```
/// use u_ils::grammar::{AcceptanceRule, Node};
/// use u_ils::interpreter::{execute, RunStatus};
/// use u_ils::models::{GraphProblem, Problem};
/// use u_ils::operators::{ConstructorName, LocalSearchName};
///
/// let triangle = Problem::from(GraphProblem::new(3, [(0, 1), (0, 2), (1, 2)]).unwrap());
/// let ast = Node::Seq {
///     body: vec![
///         Node::GreedyConstruct { heuristic: ConstructorName::Dsatur },
///         Node::LocalSearch {
///             neighborhood: LocalSearchName::KempeChain,
///             acceptance: AcceptanceRule::Improving,
///             iter_cap: 10,
///         },
///     ],
/// };
/// let run = execute(&ast, &triangle, 0).unwrap();
/// assert_eq!(run.status, RunStatus::Completed);
/// assert_eq!(run.trace.len(), 2);
/// let coloring = run.best.as_ref().and_then(|s| s.as_coloring()).unwrap();
/// assert_eq!(coloring.num_colors(), 3);
/// ```
pub fn execute(ast: &Node, problem: &Problem, seed: u64) -> Result<Execution, InterpreterError> {
    Interpreter::default().execute(ast, problem, seed)
}

/// [`execute`] with a per-record callback.
pub fn execute_with_listener(
    ast: &Node,
    problem: &Problem,
    seed: u64,
    listener: &mut dyn TraceListener,
) -> Result<Execution, InterpreterError> {
    Interpreter::default().execute_with_listener(ast, problem, seed, listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GraphProblem, Item, KnapsackProblem};
    use crate::operators::{ConstructorName, LocalSearchName, PerturbationName, RepairName};
    use serde_json::json;

    fn knapsack() -> Problem {
        KnapsackProblem::new(
            vec![
                Item { value: 10, weight: 5 },
                Item { value: 40, weight: 4 },
                Item { value: 30, weight: 6 },
                Item { value: 50, weight: 3 },
            ],
            10,
        )
        .expect("valid")
        .into()
    }

    fn construct(heuristic: ConstructorName) -> Node {
        Node::GreedyConstruct { heuristic }
    }

    fn flip_best(acceptance: AcceptanceRule) -> Node {
        Node::LocalSearch {
            neighborhood: LocalSearchName::FlipBestItem,
            acceptance,
            iter_cap: 20,
        }
    }

    fn kick() -> Node {
        Node::Perturbation {
            operator: PerturbationName::RandomFlip,
            intensity: 0.5,
        }
    }

    fn seq(body: Vec<Node>) -> Node {
        Node::Seq { body }
    }

    #[test]
    fn test_one_record_per_top_level_statement() {
        let ast = seq(vec![
            construct(ConstructorName::ByWeight),
            flip_best(AcceptanceRule::Improving),
            kick(),
        ]);
        let run = execute(&ast, &knapsack(), 0).expect("valid");
        assert!(run.is_completed());
        assert_eq!(run.trace.len(), 3);
        assert_eq!(run.counters.iterations, 0);
    }

    #[test]
    fn test_one_record_per_top_level_pass() {
        let ast = seq(vec![
            construct(ConstructorName::ByWeight),
            Node::For {
                iterations: 7,
                body: Box::new(seq(vec![
                    kick(),
                    Node::For {
                        iterations: 3,
                        body: Box::new(flip_best(AcceptanceRule::FirstImproving)),
                    },
                ])),
            },
        ]);
        let run = execute(&ast, &knapsack(), 1).expect("valid");
        assert_eq!(run.trace.len(), 1 + 7);
        assert_eq!(run.counters.iterations, 7 + 7 * 3);
        let iters: Vec<usize> = run.trace.records().iter().map(|r| r.iter).collect();
        assert_eq!(iters, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_root_loop_and_root_leaf() {
        let ast = Node::For {
            iterations: 4,
            body: Box::new(seq(vec![construct(ConstructorName::Random), kick()])),
        };
        let run = execute(&ast, &knapsack(), 2).expect("valid");
        assert_eq!(run.trace.len(), 4);

        let ast = Node::If {
            cond: Condition::IsFeasible,
            then: Box::new(construct(ConstructorName::ByRatio)),
            otherwise: None,
        };
        let run = execute(&ast, &knapsack(), 2).expect("valid");
        assert_eq!(run.trace.len(), 1);
        assert!(run.best.is_none());
    }

    #[test]
    fn test_best_is_monotone() {
        let ast = seq(vec![
            construct(ConstructorName::ByValue),
            Node::While {
                budget: Budget::IterBudget { n: 40 },
                body: Box::new(seq(vec![
                    kick(),
                    Node::Repair {
                        operator: RepairName::RemoveLowestRatio,
                    },
                    flip_best(AcceptanceRule::Improving),
                ])),
            },
        ]);
        let run = execute(&ast, &knapsack(), 3).expect("valid");
        let best: Vec<f64> = run.trace.records().iter().filter_map(|r| r.best_fitness).collect();
        assert!(best.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(run.best.as_ref().and_then(Solution::as_knapsack).map(|a| a.value()), Some(90));
    }

    #[test]
    fn test_while_stops_on_stagnation() {
        let ast = seq(vec![
            construct(ConstructorName::ByRatio),
            Node::While {
                budget: Budget::IterBudget { n: 1000 },
                body: Box::new(flip_best(AcceptanceRule::Improving)),
            },
        ]);
        let interpreter = Interpreter::new(InterpreterConfig::default().with_while_stagnation_limit(5));
        let run = interpreter.execute(&ast, &knapsack(), 0).expect("valid");
        assert_eq!(run.counters.iterations, 5);
    }

    #[test]
    fn test_apply_until_no_improve() {
        // Lightest first packs the two cheap items; one swap reaches 11.
        let trap: Problem = KnapsackProblem::new(
            vec![
                Item { value: 1, weight: 1 },
                Item { value: 1, weight: 1 },
                Item { value: 10, weight: 9 },
            ],
            10,
        )
        .expect("valid")
        .into();
        let body = || {
            Box::new(Node::LocalSearch {
                neighborhood: LocalSearchName::OneExchange,
                acceptance: AcceptanceRule::Improving,
                iter_cap: 20,
            })
        };
        let ast = seq(vec![
            construct(ConstructorName::ByWeight),
            Node::ApplyUntilNoImprove {
                body: body(),
                stop: StopRule::MaxIter { n: 50 },
            },
        ]);
        let run = execute(&ast, &trap, 0).expect("valid");
        // The first pass converges, the second finds nothing.
        assert_eq!(run.counters.iterations, 2);
        assert_eq!(run.best.as_ref().and_then(Solution::as_knapsack).map(|a| a.value()), Some(11));

        let ast = seq(vec![
            construct(ConstructorName::ByWeight),
            Node::ApplyUntilNoImprove {
                body: body(),
                stop: StopRule::Stagnation { k: 4 },
            },
        ]);
        let run = execute(&ast, &trap, 0).expect("valid");
        assert_eq!(run.counters.iterations, 5);
    }

    #[test]
    fn test_choose_best_of_keeps_best() {
        let ast = Node::ChooseBestOf {
            n: 5,
            body: Box::new(seq(vec![
                construct(ConstructorName::ByRatio),
                flip_best(AcceptanceRule::Improving),
            ])),
        };
        let run = execute(&ast, &knapsack(), 0).expect("valid");
        assert_eq!(run.trace.len(), 5);
        let best = run.best.as_ref().and_then(Solution::as_knapsack).expect("solution");
        assert_eq!(best.value(), 90);
        assert_eq!(best.weight(), 7);
    }

    #[test]
    fn test_metropolis_is_recorded() {
        // ByWeight already packs the optimum {1, 3}; every flip from there
        // is uphill and a cold walk turns each one down.
        let ast = seq(vec![
            construct(ConstructorName::ByWeight),
            flip_best(AcceptanceRule::Metropolis { temperature: 0.001 }),
        ]);
        let run = execute(&ast, &knapsack(), 4).expect("valid");
        let last = run.trace.last().expect("record");
        assert_eq!(last.temperature, Some(0.001));
        assert_eq!(last.accepted, Some(false));
        assert!(last.delta_e.is_some_and(|d| d > 0.0));
        assert_eq!(last.current_fitness, Some(-90.0));
        assert_eq!(run.trace.records()[0].temperature, None);
    }

    #[test]
    fn test_stagnation_ignores_current_oscillation() {
        // Random kicks move the current solution up and down; only a new
        // best inside the loop resets the stagnation count. ByRatio starts
        // at the optimum, so nothing can reset it.
        let ast = seq(vec![
            construct(ConstructorName::ByRatio),
            Node::ApplyUntilNoImprove {
                body: Box::new(kick()),
                stop: StopRule::Stagnation { k: 20 },
            },
        ]);
        for seed in 0..5 {
            let run = execute(&ast, &knapsack(), seed).expect("valid");
            assert_eq!(run.counters.iterations, 20, "seed {seed}");
            assert_eq!(run.trace.len(), 21);
        }
    }

    #[test]
    fn test_call_node_runs_like_its_terminal() {
        let call = |name: &str, args: serde_json::Value| Node::Call {
            operator_name: name.into(),
            args: serde_json::from_value(args).expect("object"),
        };
        let via_call = seq(vec![
            call("by_weight", json!({})),
            call("flip_best_item", json!({"iter_cap": 20})),
        ]);
        let direct = seq(vec![
            construct(ConstructorName::ByWeight),
            flip_best(AcceptanceRule::Improving),
        ]);
        let a = execute(&via_call, &knapsack(), 5).expect("valid");
        let b = execute(&direct, &knapsack(), 5).expect("valid");
        assert_eq!(a.best, b.best);
        assert_eq!(a.trace.canonical_json(), b.trace.canonical_json());
    }

    #[test]
    fn test_validation_error_runs_nothing() {
        let ast = seq(vec![construct(ConstructorName::Dsatur)]);
        assert!(matches!(
            execute(&ast, &knapsack(), 0),
            Err(InterpreterError::Validation(ValidationError::WrongDomain { .. }))
        ));
    }

    #[test]
    fn test_missing_solution_fails_run() {
        let ast = seq(vec![
            Node::If {
                cond: Condition::Prob { p: 0.0 },
                then: Box::new(construct(ConstructorName::ByRatio)),
                otherwise: None,
            },
            kick(),
        ]);
        let run = execute(&ast, &knapsack(), 0).expect("valid");
        assert!(matches!(run.status, RunStatus::Failed { .. }));
        assert!(run.best.is_none());
        let last = run.trace.last().expect("record");
        assert!(last.error.as_deref().is_some_and(|e| e.contains("RandomFlip")));
    }

    #[test]
    fn test_time_limit_keeps_best() {
        let ast = seq(vec![
            construct(ConstructorName::ByRatio),
            Node::For {
                iterations: 100,
                body: Box::new(flip_best(AcceptanceRule::Improving)),
            },
        ]);
        let interpreter = Interpreter::new(InterpreterConfig::default().with_time_limit(Duration::from_nanos(1)));
        let run = interpreter.execute(&ast, &knapsack(), 0).expect("valid");
        assert_eq!(run.status, RunStatus::BudgetExceeded);
        // The first statement always runs; the deadline stops the loop.
        assert!(run.best.is_some());
        assert_eq!(run.trace.len(), 1);
        assert_eq!(run.counters.iterations, 0);
    }

    #[test]
    fn test_improves_condition() {
        // The constructor statement improves (from nothing), so the If
        // takes its then-branch and perturbs.
        let ast = seq(vec![
            construct(ConstructorName::ByRatio),
            Node::If {
                cond: Condition::Improves,
                then: Box::new(kick()),
                otherwise: None,
            },
        ]);
        let run = execute(&ast, &knapsack(), 0).expect("valid");
        assert_eq!(run.counters.evaluations, 2);
    }

    #[test]
    fn test_listener_matches_trace() {
        let g: Problem = GraphProblem::new(4, [(0, 1), (1, 2), (2, 3), (3, 0)])
            .expect("valid")
            .into();
        let ast = seq(vec![
            construct(ConstructorName::LargestFirst),
            Node::For {
                iterations: 6,
                body: Box::new(Node::Perturbation {
                    operator: PerturbationName::RandomRecolor,
                    intensity: 0.5,
                }),
            },
        ]);
        let mut seen = Vec::new();
        let mut listener = |r: &TraceRecord| seen.push(r.clone());
        let run = execute_with_listener(&ast, &g, 9, &mut listener).expect("valid");
        assert_eq!(seen, run.trace.records());
    }

    #[test]
    fn test_same_seed_same_run() {
        let ast = seq(vec![
            construct(ConstructorName::Random),
            Node::While {
                budget: Budget::IterBudget { n: 30 },
                body: Box::new(seq(vec![
                    kick(),
                    Node::Repair {
                        operator: RepairName::GreedyRefill,
                    },
                    flip_best(AcceptanceRule::Metropolis { temperature: 5.0 }),
                ])),
            },
        ]);
        let a = execute(&ast, &knapsack(), 77).expect("valid");
        let b = execute(&ast, &knapsack(), 77).expect("valid");
        assert_eq!(a.best, b.best);
        assert_eq!(a.trace.canonical_json(), b.trace.canonical_json());
        assert_eq!(a.counters, b.counters);
    }

    #[test]
    fn test_widen() {
        assert_eq!(widen(0.3), 0.3);
        assert_eq!(widen(1.0), 1.0);
    }
}
