//! Operator vocabularies, contracts and registry.
//!
//! Every operator is a pure function of `(name, problem, solution, rng)`.
//! The name enums double as the registry: implementing [`Constructor`],
//! [`Improver`], [`Perturber`] and [`Repairer`] on them gives the
//! interpreter a flat match per node, with no runtime type hierarchy.

mod error;
mod names;
pub mod registry;
mod traits;

pub use error::OperatorError;
pub use names::{ConstructorName, LocalSearchName, PerturbationName, RepairName, DEFAULT_TABU_TENURE};
pub use registry::{lower_call, resolve, Operator};
pub use traits::{Constructor, Improver, Perturber, Repairer};
