//! Grammar of ILS programs.
//!
//! ```text
//! node      := control | terminal
//! control   := Seq(node+) | If(cond, node, node?) | While(budget, node)
//!            | For(n, node) | ChooseBestOf(n, node)
//!            | ApplyUntilNoImprove(node, stop)
//! terminal  := GreedyConstruct(constructor)
//!            | LocalSearch(neighborhood, acceptance, iter_cap)
//!            | Perturbation(perturbation, intensity)
//!            | Repair(repair) | Call(name, args)
//! ```
//!
//! The operator vocabularies are per domain; [`Grammar`] bundles the
//! vocabularies of one domain with its [`GrammarConfig`] limits.

mod ast;
mod config;
mod validate;

pub use ast::{AcceptanceRule, Budget, Condition, Node, StopRule};
pub use config::GrammarConfig;
pub use validate::{validate, ValidationError};

use crate::operators::{ConstructorName, LocalSearchName, PerturbationName, RepairName};

/// The vocabularies and limits of one domain.
#[derive(Debug, Clone)]
pub struct Grammar {
    config: GrammarConfig,
    constructors: Vec<ConstructorName>,
    local_searches: Vec<LocalSearchName>,
    perturbations: Vec<PerturbationName>,
    repairs: Vec<RepairName>,
}

impl Grammar {
    pub fn new(config: GrammarConfig) -> Self {
        let domain = config.domain;
        Self {
            config,
            constructors: ConstructorName::for_domain(domain),
            local_searches: LocalSearchName::for_domain(domain),
            perturbations: PerturbationName::for_domain(domain),
            repairs: RepairName::for_domain(domain),
        }
    }

    pub fn config(&self) -> &GrammarConfig {
        &self.config
    }

    pub fn constructors(&self) -> &[ConstructorName] {
        &self.constructors
    }

    pub fn local_searches(&self) -> &[LocalSearchName] {
        &self.local_searches
    }

    pub fn perturbations(&self) -> &[PerturbationName] {
        &self.perturbations
    }

    pub fn repairs(&self) -> &[RepairName] {
        &self.repairs
    }

    pub fn validate(&self, tree: &Node) -> Result<(), ValidationError> {
        validate(tree, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Domain;

    #[test]
    fn test_vocabularies_per_domain() {
        let g = Grammar::new(GrammarConfig::new(Domain::GraphColoring));
        assert_eq!(g.constructors().len(), 5);
        assert_eq!(g.local_searches().len(), 4);
        assert_eq!(g.perturbations().len(), 2);
        assert_eq!(g.repairs().len(), 2);

        let g = Grammar::new(GrammarConfig::new(Domain::Vrptw));
        assert_eq!(g.constructors().len(), 6);
        assert_eq!(g.local_searches().len(), 8);
        assert_eq!(g.perturbations().len(), 4);
        assert_eq!(g.repairs().len(), 3);
    }
}
