//! Neighborhoods and the descent driver that walks them.
//!
//! Graph coloring:
//! - [`OneVertexMove`], [`SwapColors`], [`KempeChain`]
//! - [`tabu_coloring`] — TabuCol with a shrinking number of colors
//!
//! Knapsack:
//! - [`FlipBestItem`], [`FlipWorstItem`], [`OneExchange`], [`TwoExchange`]
//!
//! VRPTW, intra-route:
//! - [`TwoOpt`] — Segment reversal
//! - [`OrOpt`] — Segment (2–3 customers) relocation
//! - [`Relocate`] — Single customer relocation
//! - [`ThreeOpt`] — Seven reconnection patterns
//!
//! VRPTW, inter-route:
//! - [`CrossExchange`] — Swap segments of 1–3 customers
//! - [`TwoOptStar`] — Swap route tails
//! - [`SwapCustomers`] — Swap two customers
//! - [`InterRelocate`] — Move a customer to another route
//!
//! Routing neighborhoods are wrapped in [`RoutingNeighborhood`], which
//! prices every move by re-measuring only the routes it touches.

mod coloring;
mod exchange;
mod knapsack;
mod or_opt;
mod relocate;
mod routing;
mod tabu;
mod three_opt;
mod two_opt;

pub use coloring::{kempe_chain, KempeChain, OneVertexMove, SwapColors};
pub use exchange::{CrossExchange, SwapCustomers, TwoOptStar};
pub use knapsack::{FlipBestItem, FlipWorstItem, OneExchange, TwoExchange};
pub use or_opt::{OrOpt, Relocate};
pub use relocate::InterRelocate;
pub use routing::{RouteChange, RouteMoves, RoutingNeighborhood};
pub use tabu::tabu_coloring;
pub use three_opt::ThreeOpt;
pub use two_opt::TwoOpt;

use rand::Rng;

use crate::grammar::AcceptanceRule;
use crate::solution::Scored;

/// A move structure over one solution type.
pub trait Neighborhood {
    type Solution: Clone + Scored;

    /// Best strictly improving neighbor, or the first one found when
    /// `first` is set. `None` at a local optimum.
    fn improving(&self, current: &Self::Solution, first: bool) -> Option<Self::Solution>;

    /// A uniformly sampled neighbor, `None` if the neighborhood is empty.
    fn random<R: Rng>(&self, current: &Self::Solution, rng: &mut R) -> Option<Self::Solution>;
}

/// Outcome of [`descend`].
#[derive(Debug, Clone)]
pub struct Descent<S> {
    /// Best solution seen, never worse than the start.
    pub solution: S,
    /// Moves performed.
    pub steps: usize,
    /// Moves accepted (equal to `steps` for the descending rules).
    pub accepted: usize,
    /// ΔE of the last Metropolis candidate.
    pub last_delta: Option<f64>,
    /// Whether the last Metropolis candidate was taken.
    pub last_accepted: Option<bool>,
}

impl<S> Descent<S> {
    /// Converts the solution, keeping the counters.
    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Descent<T> {
        Descent {
            solution: f(self.solution),
            steps: self.steps,
            accepted: self.accepted,
            last_delta: self.last_delta,
            last_accepted: self.last_accepted,
        }
    }
}

/// Runs a neighborhood under an acceptance rule for at most `iter_cap` steps.
///
/// - `Improving` and `FirstImproving` take best (resp. first) improving
///   moves until none is left.
/// - `Metropolis(T)` samples random neighbors and accepts a worsening of
///   ΔE (scalar fitness) with probability `exp(−ΔE/T)`.
/// - `AlwaysAccept` is a random walk.
///
/// The best solution seen is returned in every case, so the result is never
/// worse than `start`.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_ils::grammar::AcceptanceRule;
/// use u_ils::local_search::{descend, FlipBestItem};
/// use u_ils::models::{Item, KnapsackProblem};
/// use u_ils::solution::KnapsackAssignment;
///
/// let p = KnapsackProblem::new(
///     vec![Item { value: 10, weight: 5 }, Item { value: 40, weight: 4 }],
///     6,
/// )
/// .unwrap();
/// let start = KnapsackAssignment::empty(&p);
/// let mut rng = ChaCha8Rng::seed_from_u64(0);
/// let out = descend(&FlipBestItem::new(&p), &start, &AcceptanceRule::Improving, 10, &mut rng);
/// assert_eq!(out.solution.value(), 40);
/// ```
pub fn descend<N, R>(
    neighborhood: &N,
    start: &N::Solution,
    acceptance: &AcceptanceRule,
    iter_cap: u32,
    rng: &mut R,
) -> Descent<N::Solution>
where
    N: Neighborhood,
    R: Rng,
{
    let cap = iter_cap as usize;
    let mut current = start.clone();
    let mut current_fit = current.fitness();
    let mut best = current.clone();
    let mut best_fit = current_fit;
    let mut steps = 0;
    let mut accepted = 0;
    let mut last_delta = None;
    let mut last_accepted = None;

    match acceptance {
        AcceptanceRule::Improving | AcceptanceRule::FirstImproving => {
            let first = matches!(acceptance, AcceptanceRule::FirstImproving);
            while steps < cap {
                let Some(next) = neighborhood.improving(&current, first) else {
                    break;
                };
                let next_fit = next.fitness();
                if !next_fit.is_better_than(&current_fit) {
                    break;
                }
                current = next;
                current_fit = next_fit;
                steps += 1;
                accepted += 1;
            }
            best = current;
        }
        AcceptanceRule::Metropolis { temperature } => {
            while steps < cap {
                let Some(candidate) = neighborhood.random(&current, rng) else {
                    break;
                };
                steps += 1;
                let cand_fit = candidate.fitness();
                let delta = cand_fit.scalar() - current_fit.scalar();
                last_delta = Some(delta);
                let accept = delta <= 0.0 || rng.random::<f64>() < (-delta / temperature).exp();
                last_accepted = Some(accept);
                if accept {
                    current = candidate;
                    current_fit = cand_fit;
                    accepted += 1;
                    if current_fit.is_better_than(&best_fit) {
                        best = current.clone();
                        best_fit = current_fit;
                    }
                }
            }
        }
        AcceptanceRule::AlwaysAccept => {
            while steps < cap {
                let Some(candidate) = neighborhood.random(&current, rng) else {
                    break;
                };
                steps += 1;
                accepted += 1;
                current = candidate;
                current_fit = current.fitness();
                if current_fit.is_better_than(&best_fit) {
                    best = current.clone();
                    best_fit = current_fit;
                }
            }
        }
    }

    Descent {
        solution: best,
        steps,
        accepted,
        last_delta,
        last_accepted,
    }
}
