//! Crate-wide error type and runner exit codes.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::generator::GenerationError;
use crate::grammar::ValidationError;
use crate::interpreter::{Execution, InterpreterError, RunStatus};
use crate::io::LoadError;
use crate::models::ModelError;
use crate::operators::OperatorError;

/// Any failure surfaced to a caller of the library or the runner.
#[derive(Debug)]
pub enum Error {
    Load(LoadError),
    Model(ModelError),
    Generation(GenerationError),
    Validation(ValidationError),
    Interpreter(InterpreterError),
    Operator(OperatorError),
    /// A run stopped on its wall-clock limit.
    BudgetExceeded {
        elapsed: Duration,
    },
    /// A configuration value is out of range.
    Config(String),
    /// A program or output file named on the command line could not be
    /// read or written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Process exit code used by the runner.
    ///
    /// | code | cause |
    /// |------|-------|
    /// | 1 | instance load failure |
    /// | 2 | generation or validation failure |
    /// | 3 | interpreter failure |
    /// | 4 | invalid configuration, unusable program or output path |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Load(_) | Self::Model(_) => 1,
            Self::Generation(GenerationError::InvalidConfig(_)) => 4,
            Self::Generation(_) | Self::Validation(_) => 2,
            Self::Interpreter(InterpreterError::InvalidConfig(_)) => 4,
            Self::Interpreter(InterpreterError::Validation(_)) => 2,
            Self::Interpreter(_) | Self::Operator(_) | Self::BudgetExceeded { .. } => 3,
            Self::Config(_) | Self::Io { .. } => 4,
        }
    }

    /// Turns a finished run into an error unless it completed.
    pub fn check(execution: Execution) -> Result<Execution> {
        match &execution.status {
            RunStatus::Completed => Ok(execution),
            RunStatus::BudgetExceeded => Err(Self::BudgetExceeded {
                elapsed: execution.elapsed,
            }),
            RunStatus::Failed { error } => Err(Self::Interpreter(error.clone())),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "failed to load instance: {e}"),
            Self::Model(e) => write!(f, "invalid instance: {e}"),
            Self::Generation(e) => write!(f, "generation failed: {e}"),
            Self::Validation(e) => write!(f, "invalid program: {e}"),
            Self::Interpreter(e) => write!(f, "interpretation failed: {e}"),
            Self::Operator(e) => write!(f, "operator failed: {e}"),
            Self::BudgetExceeded { elapsed } => {
                write!(f, "time budget exceeded after {:.3}s", elapsed.as_secs_f64())
            }
            Self::Config(reason) => write!(f, "invalid configuration: {reason}"),
            Self::Io { path, source } => write!(f, "cannot access {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Model(e) => Some(e),
            Self::Generation(e) => Some(e),
            Self::Validation(e) => Some(e),
            Self::Interpreter(e) => Some(e),
            Self::Operator(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::BudgetExceeded { .. } | Self::Config(_) => None,
        }
    }
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

impl From<ModelError> for Error {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

impl From<GenerationError> for Error {
    fn from(e: GenerationError) -> Self {
        Self::Generation(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<InterpreterError> for Error {
    fn from(e: InterpreterError) -> Self {
        Self::Interpreter(e)
    }
}

impl From<OperatorError> for Error {
    fn from(e: OperatorError) -> Self {
        Self::Operator(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
