use std::fmt;

use crate::models::Domain;

/// An operator could not be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorError {
    /// The operator, problem, or solution belong to different domains.
    DomainMismatch {
        operator: String,
        expected: Domain,
        found: Domain,
    },
    /// No current solution to work on.
    MissingSolution { operator: String },
    /// The name does not resolve in the domain's registry.
    UnknownOperator { name: String, domain: Domain },
    /// An argument is missing, mistyped, or out of range.
    InvalidArgument { operator: String, reason: String },
}

impl OperatorError {
    pub(crate) fn mismatch(operator: &str, expected: Domain, found: Domain) -> Self {
        Self::DomainMismatch {
            operator: operator.to_string(),
            expected,
            found,
        }
    }
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomainMismatch {
                operator,
                expected,
                found,
            } => write!(f, "{operator} works on {expected}, got {found}"),
            Self::MissingSolution { operator } => {
                write!(f, "{operator} needs a current solution")
            }
            Self::UnknownOperator { name, domain } => {
                write!(f, "no operator `{name}` for {domain}")
            }
            Self::InvalidArgument { operator, reason } => {
                write!(f, "invalid argument for {operator}: {reason}")
            }
        }
    }
}

impl std::error::Error for OperatorError {}
