//! # u-ils
//!
//! Grammar-driven iterated local search for graph coloring, 0/1 knapsack and
//! VRPTW. Algorithms are programs: abstract syntax trees over a small grammar
//! of control nodes and operator terminals, generated at random and run by a
//! seeded, deterministic interpreter.
//!
//! ## Modules
//!
//! - [`models`] — Problem instances (graphs, item lists, customers) and [`models::Problem`]
//! - [`distance`] — Travel distance matrix for VRPTW
//! - [`solution`] — Colorings, knapsack assignments and route plans
//! - [`evaluation`] — Lexicographic fitness, route evaluation and scoring
//! - [`constructive`] — Greedy constructors per domain
//! - [`local_search`] — Neighborhoods, descent driver and TabuCol
//! - [`perturbation`] — Kicks parameterised by an intensity in (0, 1]
//! - [`repair`] — Feasibility restoration
//! - [`operators`] — Operator vocabularies, traits and registry
//! - [`grammar`] — AST, grammar configuration and validation
//! - [`generator`] — Ramped half-and-half generation, mutation and crossover
//! - [`interpreter`] — AST execution with trace and counters
//! - [`io`] — DIMACS, knapsack and Solomon loaders
//! - [`error`] — Crate-wide error and runner exit codes
//!
//! ## Example
//!
//! ```
//! use u_ils::generator::generate;
//! use u_ils::interpreter::execute;
//! use u_ils::models::{Domain, GraphProblem, Problem};
//!
//! let petersen = GraphProblem::new(
//!     10,
//!     [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (0, 5), (1, 6), (2, 7), (3, 8), (4, 9),
//!      (5, 7), (7, 9), (9, 6), (6, 8), (8, 5)],
//! )
//! .unwrap();
//! let problem = Problem::from(petersen);
//!
//! let program = generate(Domain::GraphColoring, 42).unwrap();
//! let run = execute(&program, &problem, 42).unwrap();
//! assert!(run.best.unwrap().is_feasible());
//! ```

pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod generator;
pub mod grammar;
pub mod interpreter;
pub mod io;
pub mod local_search;
pub mod models;
pub mod operators;
pub mod perturbation;
pub mod repair;
pub mod solution;

pub use error::{Error, Result};
