//! Instance loaders.
//!
//! Each loader reads one text format and produces a validated problem model:
//!
//! - [`dimacs`]: DIMACS `.col` graphs for coloring
//! - [`knapsack`]: `n W` headers followed by `value weight` rows, with an
//!   optional `<stem>.opt` sibling holding the optimum
//! - [`solomon`]: Solomon VRPTW benchmark files
//!
//! [`load`] picks the loader for a [`Domain`].

pub mod dimacs;
pub mod knapsack;
pub mod solomon;

use std::fmt;
use std::path::Path;

use crate::models::{Domain, ModelError, Problem};

pub use solomon::SolomonLoader;

/// Error raised while reading an instance file.
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    /// The input ended while `expected` was still missing.
    UnexpectedEof {
        expected: &'static str,
    },
    /// A line could not be parsed.
    Parse {
        /// 1-based line number.
        line: usize,
        message: String,
    },
    /// The file parsed but does not describe an acceptable instance.
    Invalid(String),
    /// The parsed data break an instance invariant.
    Model(ModelError),
}

impl LoadError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            Self::Parse { line, message } => write!(f, "line {line}: {message}"),
            Self::Invalid(msg) => write!(f, "invalid instance: {msg}"),
            Self::Model(e) => write!(f, "invalid instance: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ModelError> for LoadError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

/// Loads an instance of `domain` from `path` with default loader settings.
pub fn load(domain: Domain, path: impl AsRef<Path>) -> Result<Problem, LoadError> {
    let path = path.as_ref();
    Ok(match domain {
        Domain::GraphColoring => dimacs::from_path(path)?.into(),
        Domain::Knapsack => knapsack::from_path(path)?.into(),
        Domain::Vrptw => SolomonLoader::new().from_path(path)?.into(),
    })
}

/// File stem used as the instance name.
pub(crate) fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parses one whitespace token as `T`, reporting `what` on failure.
pub(crate) fn field<T: std::str::FromStr>(
    token: Option<&str>,
    line: usize,
    what: &str,
) -> Result<T, LoadError> {
    let token = token.ok_or_else(|| LoadError::parse(line, format!("missing {what}")))?;
    token
        .parse()
        .map_err(|_| LoadError::parse(line, format!("invalid {what} `{token}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_reports_line() {
        let err = field::<u64>(Some("x1"), 7, "weight").unwrap_err();
        assert_eq!(err.to_string(), "line 7: invalid weight `x1`");
        let err = field::<u64>(None, 2, "value").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_model_error_converts() {
        let err: LoadError = ModelError::Empty.into();
        assert!(matches!(err, LoadError::Model(ModelError::Empty)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_missing_file_is_io() {
        let err = load(Domain::Knapsack, "/nonexistent/u-ils/instance.txt").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
