//! Grammar limits.

use crate::models::Domain;

/// Structural limits and the active domain of a grammar.
///
/// # Examples
///
/// ```
/// use u_ils::grammar::GrammarConfig;
/// use u_ils::models::Domain;
///
/// let config = GrammarConfig::new(Domain::Knapsack)
///     .with_min_depth(3)
///     .with_max_depth(6)
///     .with_max_size(60);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarConfig {
    /// Domain whose vocabularies operator leaves must use.
    pub domain: Domain,

    /// Minimum tree depth (a lone leaf has depth 1).
    pub min_depth: usize,

    /// Maximum tree depth.
    pub max_depth: usize,

    /// Maximum node count.
    pub max_size: usize,
}

impl GrammarConfig {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            min_depth: 2,
            max_depth: 5,
            max_size: 100,
        }
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_min_depth(mut self, depth: usize) -> Self {
        self.min_depth = depth;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        // A constructor and one more statement need a Seq root.
        if self.min_depth < 2 {
            return Err(format!("min_depth must be at least 2, got {}", self.min_depth));
        }
        if self.max_depth < self.min_depth {
            return Err(format!(
                "max_depth ({}) must be at least min_depth ({})",
                self.max_depth, self.min_depth
            ));
        }
        if self.max_size < self.min_depth + 1 {
            return Err(format!(
                "max_size ({}) cannot hold a tree of depth {}",
                self.max_size, self.min_depth
            ));
        }
        Ok(())
    }
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self::new(Domain::GraphColoring)
    }
}
