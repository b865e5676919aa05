//! Random generation and variation of ILS programs.
//!
//! # Algorithm
//!
//! *Ramped half-and-half*: a target depth `d` is drawn from
//! `[min_depth, max_depth]`. The root is `Seq[GreedyConstruct, s₁ … sₘ]`
//! with `m ∈ 1..=3`, so every tree starts by building a solution. Each
//! statement is grown with a depth budget of `d − 1`: at every expansion a
//! fair coin chooses *full* (control nodes only) or *grow* (any node type),
//! the node type is drawn uniformly from that set, and only terminals are
//! emitted once the budget reaches one level.
//!
//! *Fixed shape*: `Seq[GreedyConstruct, If(cond, LocalSearch, Perturbation)]`.
//!
//! *Mutation* regrows one uniformly drawn sub-node within the depth left at
//! its position; drawing the root regrows the whole tree. *Crossover* swaps
//! uniformly drawn non-root sub-nodes between two trees.
//!
//! Every output is validated against the grammar; failed attempts are
//! retried up to `max_attempts` times.
//!
//! # Reference
//!
//! Koza, J. R. (1992). *Genetic Programming*, ch. 6.

mod config;

pub use config::GeneratorConfig;

use std::fmt;

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::grammar::{AcceptanceRule, Budget, Condition, Grammar, Node, StopRule, ValidationError};
use crate::models::Domain;
use crate::operators::LocalSearchName;

/// The generator could not produce a valid tree.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The configuration failed validation.
    InvalidConfig(String),
    /// Every attempt produced an invalid tree.
    Exhausted {
        attempts: usize,
        last: Option<ValidationError>,
    },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(reason) => write!(f, "invalid generator configuration: {reason}"),
            Self::Exhausted {
                attempts,
                last: Some(last),
            } => write!(f, "no valid tree after {attempts} attempts (last: {last})"),
            Self::Exhausted { attempts, last: None } => {
                write!(f, "no valid tree after {attempts} attempts")
            }
        }
    }
}

impl std::error::Error for GenerationError {}

#[derive(Clone, Copy)]
enum Kind {
    Seq,
    If,
    While,
    For,
    ChooseBestOf,
    ApplyUntilNoImprove,
    GreedyConstruct,
    LocalSearch,
    Perturbation,
    Repair,
}

const CONTROL: [Kind; 6] = [
    Kind::Seq,
    Kind::If,
    Kind::While,
    Kind::For,
    Kind::ChooseBestOf,
    Kind::ApplyUntilNoImprove,
];

const TERMINAL: [Kind; 4] = [Kind::GreedyConstruct, Kind::LocalSearch, Kind::Perturbation, Kind::Repair];

/// Random program generator for one domain.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    grammar: Grammar,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        config.validate().map_err(GenerationError::InvalidConfig)?;
        let grammar = Grammar::new(config.grammar.clone());
        Ok(Self { config, grammar })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Draws trees until one validates. A draw returning `None` counts as a
    /// failed attempt.
    fn retry<R: Rng>(
        &self,
        rng: &mut R,
        mut draw: impl FnMut(&mut R) -> Option<Node>,
    ) -> Result<Node, GenerationError> {
        let mut last = None;
        for attempt in 0..self.config.max_attempts {
            let Some(tree) = draw(rng) else {
                trace!(attempt, "generated draw discarded");
                continue;
            };
            match self.grammar.validate(&tree) {
                Ok(()) => return Ok(tree),
                Err(e) => {
                    trace!(attempt, error = %e, "generated tree rejected");
                    last = Some(e);
                }
            }
        }
        Err(GenerationError::Exhausted {
            attempts: self.config.max_attempts,
            last,
        })
    }

    /// Ramped half-and-half tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use u_ils::generator::{Generator, GeneratorConfig};
    /// use u_ils::grammar::Node;
    /// use u_ils::models::Domain;
    ///
    /// let generator = Generator::new(GeneratorConfig::new(Domain::Knapsack)).unwrap();
    /// let mut rng = ChaCha8Rng::seed_from_u64(7);
    /// let tree = generator.ramped_half_and_half(&mut rng).unwrap();
    /// assert!(matches!(tree.subtree(1), Some(Node::GreedyConstruct { .. })));
    /// assert!(generator.grammar().validate(&tree).is_ok());
    /// ```
    pub fn ramped_half_and_half<R: Rng>(&self, rng: &mut R) -> Result<Node, GenerationError> {
        self.retry(rng, |rng| Some(self.draw_ramped(rng)))
    }

    fn draw_ramped<R: Rng>(&self, rng: &mut R) -> Node {
        let limits = self.grammar.config();
        let depth = rng.random_range(limits.min_depth..=limits.max_depth);
        let statements = rng.random_range(1..=3);
        let mut body = Vec::with_capacity(statements + 1);
        body.push(self.terminal(Kind::GreedyConstruct, rng));
        for _ in 0..statements {
            body.push(self.grow(depth - 1, rng));
        }
        Node::Seq { body }
    }

    /// `Seq[GreedyConstruct, If(cond, LocalSearch, Perturbation)]` with
    /// random operators and arguments.
    pub fn fixed_shape<R: Rng>(&self, rng: &mut R) -> Result<Node, GenerationError> {
        self.retry(rng, |rng| {
            Some(Node::Seq {
                body: vec![
                    self.terminal(Kind::GreedyConstruct, rng),
                    Node::If {
                        cond: self.condition(rng),
                        then: Box::new(self.terminal(Kind::LocalSearch, rng)),
                        otherwise: Some(Box::new(self.terminal(Kind::Perturbation, rng))),
                    },
                ],
            })
        })
    }

    /// Replaces one sub-node of `tree` with a fresh subtree.
    pub fn mutate<R: Rng>(&self, tree: &Node, rng: &mut R) -> Result<Node, GenerationError> {
        let max_depth = self.grammar.config().max_depth;
        self.retry(rng, |rng| {
            let index = rng.random_range(0..tree.size());
            if index == 0 {
                return Some(self.draw_ramped(rng));
            }
            let at = tree.depth_at(index).unwrap_or(max_depth);
            let budget = (max_depth + 1).saturating_sub(at).max(1);
            let mut child = tree.clone();
            child.replace_subtree(index, self.grow(budget, rng)).ok()?;
            Some(child)
        })
    }

    /// Swaps one non-root sub-node between `a` and `b`. Both offspring
    /// must validate; otherwise the draw is repeated.
    pub fn crossover<R: Rng>(&self, a: &Node, b: &Node, rng: &mut R) -> Result<(Node, Node), GenerationError> {
        if a.size() < 2 || b.size() < 2 {
            return Err(GenerationError::Exhausted { attempts: 0, last: None });
        }
        let mut last = None;
        for attempt in 0..self.config.max_attempts {
            let i = rng.random_range(1..a.size());
            let j = rng.random_range(1..b.size());
            let (Some(sub_a), Some(sub_b)) = (a.subtree(i), b.subtree(j)) else {
                continue;
            };
            let mut child_a = a.clone();
            let mut child_b = b.clone();
            if child_a.replace_subtree(i, sub_b.clone()).is_err()
                || child_b.replace_subtree(j, sub_a.clone()).is_err()
            {
                continue;
            }
            let checked = self
                .grammar
                .validate(&child_a)
                .and_then(|()| self.grammar.validate(&child_b));
            match checked {
                Ok(()) => return Ok((child_a, child_b)),
                Err(e) => {
                    trace!(attempt, error = %e, "crossover offspring rejected");
                    last = Some(e);
                }
            }
        }
        Err(GenerationError::Exhausted {
            attempts: self.config.max_attempts,
            last,
        })
    }

    /// A subtree of depth at most `budget`.
    fn grow<R: Rng>(&self, budget: usize, rng: &mut R) -> Node {
        if budget <= 1 {
            return self.terminal(TERMINAL[rng.random_range(0..TERMINAL.len())], rng);
        }
        let full = rng.random_bool(0.5);
        let kind = if full {
            CONTROL[rng.random_range(0..CONTROL.len())]
        } else {
            let i = rng.random_range(0..CONTROL.len() + TERMINAL.len());
            if i < CONTROL.len() {
                CONTROL[i]
            } else {
                TERMINAL[i - CONTROL.len()]
            }
        };
        let below = budget - 1;
        match kind {
            Kind::Seq => {
                let n = rng.random_range(1..=3);
                Node::Seq {
                    body: (0..n).map(|_| self.grow(below, rng)).collect(),
                }
            }
            Kind::If => {
                let cond = self.condition(rng);
                let then = Box::new(self.grow(below, rng));
                let otherwise = rng.random_bool(0.5).then(|| Box::new(self.grow(below, rng)));
                Node::If { cond, then, otherwise }
            }
            Kind::While => Node::While {
                budget: self.budget(rng),
                body: Box::new(self.grow(below, rng)),
            },
            Kind::For => Node::For {
                iterations: pick(&self.config.loop_budgets, rng, 10),
                body: Box::new(self.grow(below, rng)),
            },
            Kind::ChooseBestOf => Node::ChooseBestOf {
                n: pick(&self.config.choose_best_of, rng, 2),
                body: Box::new(self.grow(below, rng)),
            },
            Kind::ApplyUntilNoImprove => Node::ApplyUntilNoImprove {
                body: Box::new(self.grow(below, rng)),
                stop: self.stop_rule(rng),
            },
            terminal => self.terminal(terminal, rng),
        }
    }

    fn terminal<R: Rng>(&self, kind: Kind, rng: &mut R) -> Node {
        let g = &self.grammar;
        match kind {
            Kind::LocalSearch => {
                let mut neighborhood = pick(g.local_searches(), rng, LocalSearchName::TwoOpt);
                if let LocalSearchName::TabuColoring { tenure } = &mut neighborhood {
                    *tenure = pick(&self.config.tabu_tenures, rng, *tenure);
                }
                Node::LocalSearch {
                    neighborhood,
                    acceptance: self.acceptance(rng),
                    iter_cap: pick(&self.config.iterations, rng, 100),
                }
            }
            Kind::Perturbation => Node::Perturbation {
                operator: pick(g.perturbations(), rng, crate::operators::PerturbationName::RandomRemoval),
                intensity: self.intensity(rng),
            },
            Kind::Repair => Node::Repair {
                operator: pick(g.repairs(), rng, crate::operators::RepairName::GreedyRepair),
            },
            _ => Node::GreedyConstruct {
                heuristic: pick(g.constructors(), rng, crate::operators::ConstructorName::NearestNeighbor),
            },
        }
    }

    fn intensity<R: Rng>(&self, rng: &mut R) -> f32 {
        let (lo, hi) = self.config.intensity_range;
        let x = if lo < hi { rng.random_range(lo..=hi) } else { lo };
        ((x * 100.0).round() / 100.0) as f32
    }

    fn condition<R: Rng>(&self, rng: &mut R) -> Condition {
        match rng.random_range(0..4) {
            0 => Condition::IsFeasible,
            1 => Condition::Improves,
            2 => Condition::Stagnation {
                k: pick(&self.config.stagnation, rng, 10),
            },
            _ => Condition::Prob {
                p: pick(&self.config.probabilities, rng, 0.5),
            },
        }
    }

    fn budget<R: Rng>(&self, rng: &mut R) -> Budget {
        if self.config.allow_time_budget && rng.random_bool(0.5) {
            Budget::TimeBudget {
                seconds: pick(&self.config.time_budgets, rng, 1.0),
            }
        } else {
            Budget::IterBudget {
                n: pick(&self.config.loop_budgets, rng, 10),
            }
        }
    }

    fn stop_rule<R: Rng>(&self, rng: &mut R) -> StopRule {
        if rng.random_bool(0.5) {
            StopRule::MaxIter {
                n: pick(&self.config.loop_budgets, rng, 10),
            }
        } else {
            StopRule::Stagnation {
                k: pick(&self.config.stagnation, rng, 10),
            }
        }
    }

    fn acceptance<R: Rng>(&self, rng: &mut R) -> AcceptanceRule {
        match rng.random_range(0..4) {
            0 => AcceptanceRule::Improving,
            1 => AcceptanceRule::FirstImproving,
            2 => AcceptanceRule::Metropolis {
                temperature: pick(&self.config.temperatures, rng, 1.0),
            },
            _ => AcceptanceRule::AlwaysAccept,
        }
    }
}

/// Uniform choice; `fallback` only for an empty set, which a validated
/// configuration rules out.
fn pick<T: Copy, R: Rng>(set: &[T], rng: &mut R, fallback: T) -> T {
    set.choose(rng).copied().unwrap_or(fallback)
}

/// One ramped half-and-half tree for `domain` with default settings.
pub fn generate(domain: Domain, seed: u64) -> Result<Node, GenerationError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Generator::new(GeneratorConfig::new(domain))?.ramped_half_and_half(&mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarConfig;

    fn generator(domain: Domain) -> Generator {
        Generator::new(GeneratorConfig::new(domain)).expect("valid config")
    }

    #[test]
    fn test_ramped_trees_are_valid() {
        for domain in Domain::ALL {
            let g = generator(domain);
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            for _ in 0..50 {
                let tree = g.ramped_half_and_half(&mut rng).expect("generated");
                assert!(g.grammar().validate(&tree).is_ok());
                assert!(matches!(tree.subtree(1), Some(Node::GreedyConstruct { .. })));
            }
        }
    }

    #[test]
    fn test_ramped_never_emits_call() {
        let g = generator(Domain::Vrptw);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..30 {
            let tree = g.ramped_half_and_half(&mut rng).expect("generated");
            assert!(tree.preorder().iter().all(|n| !matches!(n, Node::Call { .. })));
        }
    }

    #[test]
    fn test_ramped_covers_depth_range() {
        let g = generator(Domain::GraphColoring);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let depths: Vec<usize> = (0..200)
            .map(|_| g.ramped_half_and_half(&mut rng).expect("generated").depth())
            .collect();
        assert!(depths.iter().all(|d| (2..=5).contains(d)));
        assert!(depths.contains(&2));
        assert!(depths.contains(&5));
    }

    #[test]
    fn test_generation_is_seeded() {
        let a = generate(Domain::Knapsack, 42).expect("generated");
        let b = generate(Domain::Knapsack, 42).expect("generated");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fixed_shape() {
        let g = generator(Domain::Knapsack);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tree = g.fixed_shape(&mut rng).expect("generated");
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.depth(), 3);
        let kinds: Vec<&str> = tree.preorder().iter().map(|n| n.kind()).collect();
        assert_eq!(kinds, ["Seq", "GreedyConstruct", "If", "LocalSearch", "Perturbation"]);
    }

    #[test]
    fn test_intensity_is_rounded() {
        let g = generator(Domain::Vrptw);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            let x = g.intensity(&mut rng);
            assert!((0.1..=0.4).contains(&x));
            assert!(((x * 100.0).round() - x * 100.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_mutation_stays_valid() {
        let g = generator(Domain::GraphColoring);
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut tree = g.ramped_half_and_half(&mut rng).expect("generated");
        for _ in 0..50 {
            tree = g.mutate(&tree, &mut rng).expect("mutated");
            assert!(g.grammar().validate(&tree).is_ok());
        }
    }

    #[test]
    fn test_mutation_changes_the_tree() {
        let g = generator(Domain::Knapsack);
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        let tree = g.ramped_half_and_half(&mut rng).expect("generated");
        let changed = (0..20)
            .filter(|_| g.mutate(&tree, &mut rng).expect("mutated") != tree)
            .count();
        assert!(changed > 0);
    }

    #[test]
    fn test_discarded_draws_count_as_attempts() {
        let g = Generator::new(GeneratorConfig::new(Domain::Knapsack).with_max_attempts(4)).expect("valid config");
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut draws = 0;
        let out = g.retry(&mut rng, |_| {
            draws += 1;
            None
        });
        assert_eq!(draws, 4);
        assert!(matches!(out, Err(GenerationError::Exhausted { attempts: 4, last: None })));
    }

    #[test]
    fn test_crossover_stays_valid() {
        let g = generator(Domain::Vrptw);
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..20 {
            let a = g.ramped_half_and_half(&mut rng).expect("generated");
            let b = g.ramped_half_and_half(&mut rng).expect("generated");
            let (c, d) = g.crossover(&a, &b, &mut rng).expect("crossed");
            assert!(g.grammar().validate(&c).is_ok());
            assert!(g.grammar().validate(&d).is_ok());
            assert_eq!(c.size() + d.size(), a.size() + b.size());
        }
    }

    #[test]
    fn test_exhaustion() {
        // Fixed shape has depth 3, which this grammar forbids.
        let config =
            GeneratorConfig::new(Domain::Knapsack).with_grammar(GrammarConfig::new(Domain::Knapsack).with_max_depth(2));
        let g = Generator::new(config.with_max_attempts(3)).expect("valid config");
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            g.fixed_shape(&mut rng),
            Err(GenerationError::Exhausted { attempts: 3, last: Some(_) })
        ));
    }

    #[test]
    fn test_invalid_config() {
        let config = GeneratorConfig::new(Domain::Knapsack).with_max_attempts(0);
        assert!(matches!(Generator::new(config), Err(GenerationError::InvalidConfig(_))));
    }
}
