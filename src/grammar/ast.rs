//! Abstract syntax of ILS programs.
//!
//! A program is an owned tree of [`Node`]s. Control nodes compose and loop;
//! terminal nodes are the only ones that touch the solution. Positions in a
//! tree are pre-order indices (the root is 0), which is how mutation and
//! crossover address sub-nodes.
//!
//! The canonical serialized form is a nested JSON object per node,
//! `{"type": <variant>, ...fields}`, and round-trips exactly.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operators::{ConstructorName, LocalSearchName, PerturbationName, RepairName};

/// Branch predicate of an `If` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Condition {
    /// The current solution is feasible.
    IsFeasible,
    /// The previous iteration improved the current fitness.
    Improves,
    /// At least `k` iterations since the best last improved.
    Stagnation { k: u32 },
    /// Bernoulli draw from the context RNG.
    Prob { p: f64 },
}

/// Loop budget of a `While` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Budget {
    IterBudget { n: u32 },
    TimeBudget { seconds: f64 },
}

/// Termination rule of an `ApplyUntilNoImprove` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StopRule {
    /// At most `n` passes, stopping early on the first non-improving pass.
    MaxIter { n: u32 },
    /// Stop after `k` consecutive non-improving passes.
    Stagnation { k: u32 },
}

/// How a local search accepts neighbors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AcceptanceRule {
    /// Best-improvement descent.
    Improving,
    /// First-improvement descent.
    FirstImproving,
    /// Accept worsening moves with probability `exp(−ΔE/T)`.
    Metropolis { temperature: f64 },
    /// Random walk.
    AlwaysAccept,
}

impl fmt::Display for AcceptanceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptanceRule::Improving => f.write_str("Improving"),
            AcceptanceRule::FirstImproving => f.write_str("FirstImproving"),
            AcceptanceRule::Metropolis { temperature } => write!(f, "Metropolis({temperature})"),
            AcceptanceRule::AlwaysAccept => f.write_str("AlwaysAccept"),
        }
    }
}

impl FromStr for AcceptanceRule {
    type Err = String;

    /// Accepts the rule names in any case, with or without separators, and
    /// `Metropolis(T)` / `metropolis:T` for the annealing rule.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "improving" => return Ok(AcceptanceRule::Improving),
            "firstimproving" => return Ok(AcceptanceRule::FirstImproving),
            "alwaysaccept" => return Ok(AcceptanceRule::AlwaysAccept),
            _ => {}
        }
        let temperature = key
            .strip_prefix("metropolis")
            .map(|rest| rest.trim_start_matches(['(', ':', '=']).trim_end_matches(')'))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| format!("unknown acceptance rule `{s}`"))?;
        temperature
            .parse::<f64>()
            .map(|temperature| AcceptanceRule::Metropolis { temperature })
            .map_err(|_| format!("bad Metropolis temperature in `{s}`"))
    }
}

/// One node of an ILS program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Seq {
        body: Vec<Node>,
    },
    If {
        cond: Condition,
        then: Box<Node>,
        #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<Node>>,
    },
    While {
        budget: Budget,
        body: Box<Node>,
    },
    For {
        iterations: u32,
        body: Box<Node>,
    },
    ChooseBestOf {
        n: u32,
        body: Box<Node>,
    },
    ApplyUntilNoImprove {
        body: Box<Node>,
        stop: StopRule,
    },
    GreedyConstruct {
        heuristic: ConstructorName,
    },
    LocalSearch {
        neighborhood: LocalSearchName,
        acceptance: AcceptanceRule,
        iter_cap: u32,
    },
    Perturbation {
        operator: PerturbationName,
        intensity: f32,
    },
    Repair {
        operator: RepairName,
    },
    Call {
        operator_name: String,
        #[serde(default)]
        args: BTreeMap<String, Value>,
    },
}

impl Node {
    /// Variant name, as written in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Seq { .. } => "Seq",
            Node::If { .. } => "If",
            Node::While { .. } => "While",
            Node::For { .. } => "For",
            Node::ChooseBestOf { .. } => "ChooseBestOf",
            Node::ApplyUntilNoImprove { .. } => "ApplyUntilNoImprove",
            Node::GreedyConstruct { .. } => "GreedyConstruct",
            Node::LocalSearch { .. } => "LocalSearch",
            Node::Perturbation { .. } => "Perturbation",
            Node::Repair { .. } => "Repair",
            Node::Call { .. } => "Call",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Node::GreedyConstruct { .. }
                | Node::LocalSearch { .. }
                | Node::Perturbation { .. }
                | Node::Repair { .. }
                | Node::Call { .. }
        )
    }

    /// Loop nodes: their body runs in passes.
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            Node::While { .. } | Node::For { .. } | Node::ChooseBestOf { .. } | Node::ApplyUntilNoImprove { .. }
        )
    }

    /// Direct children in pre-order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Seq { body } => body.iter().collect(),
            Node::If { then, otherwise, .. } => {
                let mut out = vec![then.as_ref()];
                out.extend(otherwise.as_deref());
                out
            }
            Node::While { body, .. }
            | Node::For { body, .. }
            | Node::ChooseBestOf { body, .. }
            | Node::ApplyUntilNoImprove { body, .. } => vec![body.as_ref()],
            _ => Vec::new(),
        }
    }

    fn children_mut(&mut self) -> Vec<&mut Node> {
        match self {
            Node::Seq { body } => body.iter_mut().collect(),
            Node::If { then, otherwise, .. } => {
                let mut out = vec![then.as_mut()];
                out.extend(otherwise.as_deref_mut());
                out
            }
            Node::While { body, .. }
            | Node::For { body, .. }
            | Node::ChooseBestOf { body, .. }
            | Node::ApplyUntilNoImprove { body, .. } => vec![body.as_mut()],
            _ => Vec::new(),
        }
    }

    /// Total node count.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(|c| c.size()).sum::<usize>()
    }

    /// Longest root-to-leaf path in nodes; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// All nodes in pre-order, the root first.
    pub fn preorder(&self) -> Vec<&Node> {
        let mut out = Vec::with_capacity(self.size());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children().into_iter().rev());
        }
        out
    }

    /// The node at pre-order index `index` and its depth (root = 1).
    fn locate(&self, index: usize, depth: usize) -> Option<(&Node, usize)> {
        if index == 0 {
            return Some((self, depth));
        }
        let mut offset = 1;
        for child in self.children() {
            let size = child.size();
            if index < offset + size {
                return child.locate(index - offset, depth + 1);
            }
            offset += size;
        }
        None
    }

    /// Sub-node at pre-order index `index`.
    pub fn subtree(&self, index: usize) -> Option<&Node> {
        self.locate(index, 1).map(|(node, _)| node)
    }

    /// Depth of the sub-node at `index`, counting the root as 1.
    pub fn depth_at(&self, index: usize) -> Option<usize> {
        self.locate(index, 1).map(|(_, depth)| depth)
    }

    /// Puts `replacement` at pre-order index `index` and returns the
    /// sub-tree it displaced, or gives `replacement` back when `index` is
    /// out of range.
    pub fn replace_subtree(&mut self, index: usize, replacement: Node) -> Result<Node, Node> {
        if index == 0 {
            return Ok(std::mem::replace(self, replacement));
        }
        let mut offset = 1;
        for child in self.children_mut() {
            let size = child.size();
            if index < offset + size {
                return child.replace_subtree(index - offset, replacement);
            }
            offset += size;
        }
        Err(replacement)
    }

    /// Canonical dictionary form.
    pub fn to_value(&self) -> Value {
        // Serializing owned enums, maps, and finite numbers cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn from_value(value: Value) -> Result<Node, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.to_value()).unwrap_or_default()
    }

    pub fn from_json(s: &str) -> Result<Node, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Indented pseudocode, two spaces per level.
    pub fn pseudocode(&self) -> String {
        let mut out = String::new();
        self.write_pseudocode(&mut out, 0);
        out
    }

    fn write_pseudocode(&self, out: &mut String, level: usize) {
        let pad = "  ".repeat(level);
        let line = match self {
            Node::Seq { .. } => "seq".to_string(),
            Node::If { cond, .. } => format!("if {}", condition_text(cond)),
            Node::While { budget, .. } => match budget {
                Budget::IterBudget { n } => format!("while iterations < {n}"),
                Budget::TimeBudget { seconds } => format!("while elapsed < {seconds}s"),
            },
            Node::For { iterations, .. } => format!("repeat {iterations} times"),
            Node::ChooseBestOf { n, .. } => format!("best of {n}"),
            Node::ApplyUntilNoImprove { stop, .. } => match stop {
                StopRule::MaxIter { n } => format!("until no improvement (max {n})"),
                StopRule::Stagnation { k } => format!("until no improvement for {k}"),
            },
            Node::GreedyConstruct { heuristic } => format!("construct {heuristic}"),
            Node::LocalSearch {
                neighborhood,
                acceptance,
                iter_cap,
            } => match neighborhood {
                LocalSearchName::TabuColoring { tenure } => {
                    format!("local_search TabuColoring(tenure {tenure}) [{acceptance}, cap {iter_cap}]")
                }
                n => format!("local_search {n} [{acceptance}, cap {iter_cap}]"),
            },
            Node::Perturbation { operator, intensity } => format!("perturb {operator}({intensity:.2})"),
            Node::Repair { operator } => format!("repair {operator}"),
            Node::Call { operator_name, args } => {
                let args: Vec<String> = args.iter().map(|(k, v)| format!("{k}={v}")).collect();
                format!("call {operator_name}({})", args.join(", "))
            }
        };
        out.push_str(&pad);
        out.push_str(&line);
        out.push('\n');

        if let Node::If { then, otherwise, .. } = self {
            then.write_pseudocode(out, level + 1);
            if let Some(other) = otherwise {
                out.push_str(&pad);
                out.push_str("else\n");
                other.write_pseudocode(out, level + 1);
            }
            return;
        }
        for child in self.children() {
            child.write_pseudocode(out, level + 1);
        }
    }
}

fn condition_text(cond: &Condition) -> String {
    match cond {
        Condition::IsFeasible => "feasible".to_string(),
        Condition::Improves => "improved".to_string(),
        Condition::Stagnation { k } => format!("stagnating for {k}"),
        Condition::Prob { p } => format!("random < {p}"),
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pseudocode())
    }
}
