//! Errors raised when a problem instance violates its invariants.

use std::fmt;

/// An invariant of a problem instance does not hold.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The instance has no vertices, items, or customers.
    Empty,
    /// An edge joins a vertex to itself.
    SelfLoop {
        /// Offending vertex (0-based).
        vertex: usize,
    },
    /// The same undirected edge appears twice.
    DuplicateEdge {
        /// First endpoint (0-based).
        u: usize,
        /// Second endpoint (0-based).
        v: usize,
    },
    /// An edge endpoint is not a vertex of the graph.
    VertexOutOfRange {
        /// Offending vertex (0-based).
        vertex: usize,
        /// Number of vertices.
        n: usize,
    },
    /// A knapsack item has zero weight or zero value.
    NonPositiveItem {
        /// Offending item index.
        item: usize,
    },
    /// The knapsack or vehicle capacity is not positive.
    NonPositiveCapacity,
    /// The depot carries demand.
    DepotDemand {
        /// Demand found at node 0.
        demand: i32,
    },
    /// A customer has negative demand or negative service time.
    NegativeParameter {
        /// Offending node id.
        node: usize,
    },
    /// Customer ids are not `0..=n` in order.
    NonConsecutiveIds {
        /// Position in the customer list.
        position: usize,
        /// Id found at that position.
        id: usize,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "instance is empty"),
            Self::SelfLoop { vertex } => write!(f, "self loop on vertex {}", vertex + 1),
            Self::DuplicateEdge { u, v } => {
                write!(f, "duplicate edge ({}, {})", u + 1, v + 1)
            }
            Self::VertexOutOfRange { vertex, n } => {
                write!(f, "vertex {} out of range for n = {}", vertex + 1, n)
            }
            Self::NonPositiveItem { item } => {
                write!(f, "item {item} must have positive weight and value")
            }
            Self::NonPositiveCapacity => write!(f, "capacity must be positive"),
            Self::DepotDemand { demand } => {
                write!(f, "depot demand must be zero, found {demand}")
            }
            Self::NegativeParameter { node } => {
                write!(f, "node {node} has a negative demand or service time")
            }
            Self::NonConsecutiveIds { position, id } => {
                write!(f, "expected customer id {position}, found {id}")
            }
        }
    }
}

impl std::error::Error for ModelError {}
