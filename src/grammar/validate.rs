//! Tree validation.
//!
//! A tree is valid for a [`GrammarConfig`] when
//! 1. every operator leaf, `Call` included, belongs to the active domain,
//! 2. its depth and size are within the configured limits,
//! 3. every control node and numeric argument is in range,
//! 4. a constructor precedes, in pre-order, every other operator leaf.
//!
//! Errors carry the pre-order index of the offending node.

use std::fmt;

use super::{AcceptanceRule, Budget, Condition, GrammarConfig, Node, StopRule};
use crate::models::Domain;
use crate::operators::{lower_call, registry::MAX_ITER_CAP, LocalSearchName, OperatorError};

/// A tree the grammar rejects.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Depth outside `[min, max]`.
    Depth { depth: usize, min: usize, max: usize },
    /// More nodes than allowed.
    Size { size: usize, max: usize },
    /// An operator of another domain.
    WrongDomain {
        index: usize,
        operator: String,
        expected: Domain,
        found: Domain,
    },
    /// A `Call` that does not lower to a valid terminal.
    InvalidCall { index: usize, reason: String },
    /// A `Seq` without statements.
    EmptySeq { index: usize },
    /// A parameter outside its range.
    Parameter { index: usize, reason: String },
    /// An improvement leaf with no constructor before it.
    ConstructorNotFirst { index: usize, kind: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Depth { depth, min, max } => {
                write!(f, "depth {depth} outside [{min}, {max}]")
            }
            Self::Size { size, max } => write!(f, "{size} nodes exceed the limit of {max}"),
            Self::WrongDomain {
                index,
                operator,
                expected,
                found,
            } => write!(f, "node {index}: {operator} is a {found} operator, expected {expected}"),
            Self::InvalidCall { index, reason } => write!(f, "node {index}: {reason}"),
            Self::EmptySeq { index } => write!(f, "node {index}: empty Seq"),
            Self::Parameter { index, reason } => write!(f, "node {index}: {reason}"),
            Self::ConstructorNotFirst { index, kind } => {
                write!(f, "node {index}: {kind} before any GreedyConstruct")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn parameter(index: usize, reason: String) -> Result<(), ValidationError> {
    Err(ValidationError::Parameter { index, reason })
}

fn positive(index: usize, what: &str, n: u32) -> Result<(), ValidationError> {
    if n == 0 {
        return parameter(index, format!("{what} must be positive"));
    }
    Ok(())
}

fn check_domain(index: usize, operator: &str, found: Domain, expected: Domain) -> Result<(), ValidationError> {
    if found != expected {
        return Err(ValidationError::WrongDomain {
            index,
            operator: operator.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

fn check_acceptance(index: usize, rule: &AcceptanceRule) -> Result<(), ValidationError> {
    if let AcceptanceRule::Metropolis { temperature } = rule {
        if !(temperature.is_finite() && *temperature > 0.0) {
            return parameter(index, format!("Metropolis temperature must be positive, got {temperature}"));
        }
    }
    Ok(())
}

/// Checks one node's own fields, lowering `Call` first. Returns the
/// terminal the node acts as, if any.
fn check_node(node: &Node, index: usize, domain: Domain) -> Result<Option<Node>, ValidationError> {
    match node {
        Node::Seq { body } if body.is_empty() => return Err(ValidationError::EmptySeq { index }),
        Node::Seq { .. } => {}
        Node::If { cond, .. } => match cond {
            Condition::Stagnation { k } => positive(index, "Stagnation k", *k)?,
            Condition::Prob { p } if !(0.0..=1.0).contains(p) => {
                parameter(index, format!("Prob p must lie in [0, 1], got {p}"))?
            }
            _ => {}
        },
        Node::While { budget, .. } => match budget {
            Budget::IterBudget { n } => positive(index, "IterBudget", *n)?,
            Budget::TimeBudget { seconds } if !(seconds.is_finite() && *seconds > 0.0) => {
                parameter(index, format!("TimeBudget must be positive, got {seconds}"))?
            }
            Budget::TimeBudget { .. } => {}
        },
        Node::For { iterations, .. } => positive(index, "For iterations", *iterations)?,
        Node::ChooseBestOf { n, .. } => positive(index, "ChooseBestOf n", *n)?,
        Node::ApplyUntilNoImprove { stop, .. } => match stop {
            StopRule::MaxIter { n } => positive(index, "MaxIter", *n)?,
            StopRule::Stagnation { k } => positive(index, "Stagnation k", *k)?,
        },
        Node::GreedyConstruct { heuristic } => {
            check_domain(index, heuristic.as_str(), heuristic.domain(), domain)?;
            return Ok(Some(node.clone()));
        }
        Node::LocalSearch {
            neighborhood,
            acceptance,
            iter_cap,
        } => {
            check_domain(index, neighborhood.as_str(), neighborhood.domain(), domain)?;
            check_acceptance(index, acceptance)?;
            if !(1..=MAX_ITER_CAP).contains(iter_cap) {
                parameter(index, format!("iter_cap must lie in [1, {MAX_ITER_CAP}], got {iter_cap}"))?;
            }
            if let LocalSearchName::TabuColoring { tenure } = neighborhood {
                positive(index, "tabu tenure", *tenure)?;
            }
            return Ok(Some(node.clone()));
        }
        Node::Perturbation { operator, intensity } => {
            check_domain(index, operator.as_str(), operator.domain(), domain)?;
            if !(*intensity > 0.0 && *intensity <= 1.0) {
                parameter(index, format!("intensity must lie in (0, 1], got {intensity}"))?;
            }
            return Ok(Some(node.clone()));
        }
        Node::Repair { operator } => {
            check_domain(index, operator.as_str(), operator.domain(), domain)?;
            return Ok(Some(node.clone()));
        }
        Node::Call { operator_name, args } => {
            let lowered = lower_call(operator_name, args, domain).map_err(|e| match e {
                OperatorError::DomainMismatch {
                    operator,
                    expected,
                    found,
                } => ValidationError::WrongDomain {
                    index,
                    operator,
                    expected: found,
                    found: expected,
                },
                other => ValidationError::InvalidCall {
                    index,
                    reason: other.to_string(),
                },
            })?;
            return check_node(&lowered, index, domain);
        }
    }
    Ok(None)
}

/// Validates `tree` against `config`.
///
/// # Examples
///
/// ```
/// use u_ils::grammar::{validate, GrammarConfig, Node, ValidationError};
/// use u_ils::models::Domain;
/// use u_ils::operators::{ConstructorName, RepairName};
///
/// let tree = Node::Seq {
///     body: vec![
///         Node::Repair { operator: RepairName::GreedyRefill },
///         Node::GreedyConstruct { heuristic: ConstructorName::ByRatio },
///     ],
/// };
/// let err = validate(&tree, &GrammarConfig::new(Domain::Knapsack)).unwrap_err();
/// assert_eq!(err, ValidationError::ConstructorNotFirst { index: 1, kind: "Repair" });
/// ```
pub fn validate(tree: &Node, config: &GrammarConfig) -> Result<(), ValidationError> {
    let depth = tree.depth();
    if depth < config.min_depth || depth > config.max_depth {
        return Err(ValidationError::Depth {
            depth,
            min: config.min_depth,
            max: config.max_depth,
        });
    }
    let size = tree.size();
    if size > config.max_size {
        return Err(ValidationError::Size {
            size,
            max: config.max_size,
        });
    }

    let mut constructed = false;
    for (index, node) in tree.preorder().into_iter().enumerate() {
        match check_node(node, index, config.domain)? {
            Some(Node::GreedyConstruct { .. }) => constructed = true,
            Some(leaf) if !constructed => {
                return Err(ValidationError::ConstructorNotFirst {
                    index,
                    kind: leaf.kind(),
                })
            }
            _ => {}
        }
    }
    Ok(())
}
