//! Generator configuration and parameter sets.

use crate::grammar::GrammarConfig;
use crate::models::Domain;

/// Configuration for program generation.
///
/// Numeric node arguments are drawn uniformly from the explicit sets below,
/// except perturbation intensity, which is uniform on `intensity_range` and
/// rounded to two decimals.
///
/// # Examples
///
/// ```
/// use u_ils::generator::GeneratorConfig;
/// use u_ils::models::Domain;
///
/// let config = GeneratorConfig::new(Domain::Vrptw)
///     .with_max_attempts(20)
///     .with_iterations(vec![10, 20])
///     .with_loop_budgets(vec![5]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Domain and structural limits.
    pub grammar: GrammarConfig,

    /// Generation attempts before giving up.
    pub max_attempts: usize,

    /// Local-search `iter_cap` choices.
    pub iterations: Vec<u32>,

    /// `While`, `For` and `MaxIter` budgets.
    pub loop_budgets: Vec<u32>,

    /// Perturbation intensity bounds, inclusive.
    pub intensity_range: (f64, f64),

    /// TabuCol tenures.
    pub tabu_tenures: Vec<u32>,

    /// Metropolis temperatures.
    pub temperatures: Vec<f64>,

    /// `Prob` probabilities.
    pub probabilities: Vec<f64>,

    /// `Stagnation` thresholds, for conditions and stop rules.
    pub stagnation: Vec<u32>,

    /// `ChooseBestOf` counts.
    pub choose_best_of: Vec<u32>,

    /// Whether `While` may draw a wall-clock budget. Off by default, since
    /// time budgets make a run depend on machine speed.
    pub allow_time_budget: bool,

    /// `TimeBudget` choices in seconds.
    pub time_budgets: Vec<f64>,
}

impl GeneratorConfig {
    pub fn new(domain: Domain) -> Self {
        Self {
            grammar: GrammarConfig::new(domain),
            max_attempts: 100,
            iterations: vec![50, 100, 200, 500],
            loop_budgets: vec![10, 20, 50, 100],
            intensity_range: (0.1, 0.4),
            tabu_tenures: vec![5, 10, 15, 20],
            temperatures: vec![0.5, 1.0, 2.0, 5.0, 10.0],
            probabilities: vec![0.1, 0.3, 0.5, 0.7],
            stagnation: vec![5, 10, 20, 50],
            choose_best_of: vec![2, 3, 5],
            allow_time_budget: false,
            time_budgets: vec![0.5, 1.0, 2.0],
        }
    }

    pub fn with_grammar(mut self, grammar: GrammarConfig) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn with_max_attempts(mut self, n: usize) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn with_iterations(mut self, set: Vec<u32>) -> Self {
        self.iterations = set;
        self
    }

    pub fn with_loop_budgets(mut self, set: Vec<u32>) -> Self {
        self.loop_budgets = set;
        self
    }

    pub fn with_intensity_range(mut self, lo: f64, hi: f64) -> Self {
        self.intensity_range = (lo, hi);
        self
    }

    pub fn with_tabu_tenures(mut self, set: Vec<u32>) -> Self {
        self.tabu_tenures = set;
        self
    }

    pub fn with_temperatures(mut self, set: Vec<f64>) -> Self {
        self.temperatures = set;
        self
    }

    pub fn with_probabilities(mut self, set: Vec<f64>) -> Self {
        self.probabilities = set;
        self
    }

    pub fn with_stagnation(mut self, set: Vec<u32>) -> Self {
        self.stagnation = set;
        self
    }

    pub fn with_choose_best_of(mut self, set: Vec<u32>) -> Self {
        self.choose_best_of = set;
        self
    }

    pub fn with_time_budgets(mut self, allow: bool, set: Vec<f64>) -> Self {
        self.allow_time_budget = allow;
        self.time_budgets = set;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.grammar.validate()?;
        if self.max_attempts == 0 {
            return Err("max_attempts must be positive".into());
        }
        let positive_sets = [
            ("iterations", &self.iterations),
            ("loop_budgets", &self.loop_budgets),
            ("tabu_tenures", &self.tabu_tenures),
            ("stagnation", &self.stagnation),
            ("choose_best_of", &self.choose_best_of),
        ];
        for (name, set) in positive_sets {
            if set.is_empty() || set.contains(&0) {
                return Err(format!("{name} must be a non-empty set of positive values"));
            }
        }
        if self.iterations.iter().any(|&n| n > crate::operators::registry::MAX_ITER_CAP) {
            return Err("iterations exceed the iter_cap limit".into());
        }
        let (lo, hi) = self.intensity_range;
        if !(lo > 0.0 && lo <= hi && hi <= 1.0) {
            return Err(format!("intensity_range must satisfy 0 < lo <= hi <= 1, got ({lo}, {hi})"));
        }
        // Rounding to two decimals must not reach zero.
        if (lo * 100.0).round() < 1.0 {
            return Err(format!("intensity lower bound {lo} rounds to zero"));
        }
        if self.temperatures.is_empty() || self.temperatures.iter().any(|t| !(t.is_finite() && *t > 0.0)) {
            return Err("temperatures must be a non-empty set of positive values".into());
        }
        if self.probabilities.is_empty() || self.probabilities.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err("probabilities must be a non-empty subset of [0, 1]".into());
        }
        if self.allow_time_budget
            && (self.time_budgets.is_empty() || self.time_budgets.iter().any(|s| !(s.is_finite() && *s > 0.0)))
        {
            return Err("time_budgets must be a non-empty set of positive values".into());
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(Domain::GraphColoring)
    }
}
