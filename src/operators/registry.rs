//! Compile-time operator registry.
//!
//! The registry is the four name enums: [`resolve`] looks a string up in
//! all of them and keeps the match of the requested domain. A `Call` node
//! is lowered through [`lower_call`] into the specialized node it stands
//! for, so validation and interpretation share one code path.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{ConstructorName, LocalSearchName, OperatorError, PerturbationName, RepairName};
use crate::grammar::{AcceptanceRule, Node};
use crate::models::Domain;

/// `iter_cap` of a `Call` local search without one.
pub const DEFAULT_CALL_ITER_CAP: u32 = 100;

/// Upper bound on `iter_cap`.
pub const MAX_ITER_CAP: u32 = 100_000;

/// A resolved operator of one of the four families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Constructor(ConstructorName),
    LocalSearch(LocalSearchName),
    Perturbation(PerturbationName),
    Repair(RepairName),
}

impl Operator {
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Constructor(n) => n.as_str(),
            Operator::LocalSearch(n) => n.as_str(),
            Operator::Perturbation(n) => n.as_str(),
            Operator::Repair(n) => n.as_str(),
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            Operator::Constructor(n) => n.domain(),
            Operator::LocalSearch(n) => n.domain(),
            Operator::Perturbation(n) => n.domain(),
            Operator::Repair(n) => n.domain(),
        }
    }

    /// Every operator of `domain`: constructors, local searches,
    /// perturbations, then repairs.
    pub fn all(domain: Domain) -> Vec<Operator> {
        let mut ops: Vec<Operator> = ConstructorName::for_domain(domain)
            .into_iter()
            .map(Operator::Constructor)
            .collect();
        ops.extend(LocalSearchName::for_domain(domain).into_iter().map(Operator::LocalSearch));
        ops.extend(PerturbationName::for_domain(domain).into_iter().map(Operator::Perturbation));
        ops.extend(RepairName::for_domain(domain).into_iter().map(Operator::Repair));
        ops
    }
}

/// Resolves a variant name or alias against the registry of `domain`.
///
/// # Examples
///
/// ```
/// use u_ils::models::Domain;
/// use u_ils::operators::{resolve, ConstructorName, Operator};
///
/// let op = resolve("largest_first", Domain::GraphColoring).unwrap();
/// assert_eq!(op, Operator::Constructor(ConstructorName::LargestFirst));
/// assert!(resolve("largest_first", Domain::Knapsack).is_err());
/// assert!(resolve("Sweep", Domain::Vrptw).is_err());
/// ```
pub fn resolve(name: &str, domain: Domain) -> Result<Operator, OperatorError> {
    let candidates = [
        name.parse().ok().map(Operator::Constructor),
        name.parse().ok().map(Operator::LocalSearch),
        name.parse().ok().map(Operator::Perturbation),
        name.parse().ok().map(Operator::Repair),
    ];
    let mut found = None;
    for op in candidates.into_iter().flatten() {
        if op.domain() == domain {
            return Ok(op);
        }
        found.get_or_insert(op);
    }
    match found {
        Some(op) => Err(OperatorError::mismatch(op.name(), op.domain(), domain)),
        None => Err(OperatorError::UnknownOperator {
            name: name.to_string(),
            domain,
        }),
    }
}

fn invalid(operator: &str, reason: impl Into<String>) -> OperatorError {
    OperatorError::InvalidArgument {
        operator: operator.to_string(),
        reason: reason.into(),
    }
}

fn positive_u32(operator: &str, key: &str, value: &Value) -> Result<u32, OperatorError> {
    value
        .as_u64()
        .filter(|&v| v > 0)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| invalid(operator, format!("`{key}` must be a positive integer, got {value}")))
}

fn acceptance_arg(operator: &str, value: &Value) -> Result<AcceptanceRule, OperatorError> {
    let rule = match value {
        Value::String(s) => s.parse::<AcceptanceRule>(),
        other => serde_json::from_value(other.clone()).map_err(|e| e.to_string()),
    };
    rule.map_err(|reason| invalid(operator, format!("`acceptance`: {reason}")))
}

/// Lowers `Call(name, args)` into the specialized terminal it denotes.
///
/// Recognized arguments: `acceptance` (rule object or bare rule name,
/// default `Improving`), `iter_cap` (default 100) and `tenure` for local
/// searches; `intensity` (required) for perturbations. Constructors and
/// repairs take none. Unknown keys are rejected.
pub fn lower_call(name: &str, args: &BTreeMap<String, Value>, domain: Domain) -> Result<Node, OperatorError> {
    let op = resolve(name, domain)?;
    let allowed: &[&str] = match op {
        Operator::Constructor(_) | Operator::Repair(_) => &[],
        Operator::LocalSearch(LocalSearchName::TabuColoring { .. }) => &["acceptance", "iter_cap", "tenure"],
        Operator::LocalSearch(_) => &["acceptance", "iter_cap"],
        Operator::Perturbation(_) => &["intensity"],
    };
    if let Some(key) = args.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(invalid(op.name(), format!("unexpected argument `{key}`")));
    }

    let node = match op {
        Operator::Constructor(heuristic) => Node::GreedyConstruct { heuristic },
        Operator::Repair(operator) => Node::Repair { operator },
        Operator::LocalSearch(mut neighborhood) => {
            let acceptance = match args.get("acceptance") {
                Some(v) => acceptance_arg(op.name(), v)?,
                None => AcceptanceRule::Improving,
            };
            let iter_cap = match args.get("iter_cap") {
                Some(v) => positive_u32(op.name(), "iter_cap", v)?,
                None => DEFAULT_CALL_ITER_CAP,
            };
            if let (LocalSearchName::TabuColoring { tenure }, Some(v)) = (&mut neighborhood, args.get("tenure")) {
                *tenure = positive_u32(op.name(), "tenure", v)?;
            }
            Node::LocalSearch {
                neighborhood,
                acceptance,
                iter_cap,
            }
        }
        Operator::Perturbation(operator) => {
            let value = args
                .get("intensity")
                .ok_or_else(|| invalid(op.name(), "missing `intensity`"))?;
            let intensity = value
                .as_f64()
                .ok_or_else(|| invalid(op.name(), format!("`intensity` must be a number, got {value}")))?;
            Node::Perturbation {
                operator,
                intensity: intensity as f32,
            }
        }
    };
    Ok(node)
}
