//! TabuCol: tabu search over k-colorings with a shrinking k.
//!
//! # Algorithm
//!
//! Colors are restricted to `1..=k`, starting from the number of colors of
//! the input. Each iteration moves a conflicting vertex to the color with the
//! smallest conflict delta, read from the matrix `γ[v][c]` = number of
//! neighbors of v colored c. The vertex may not return to its old color for
//! `tenure + ⌊0.6 · |conflicting vertices|⌋` iterations unless the move
//! reaches fewer conflicts than ever seen at this k (aspiration).
//!
//! Once the coloring is proper, class k is dissolved into `1..k` and the
//! search continues with one color fewer.
//!
//! # Complexity
//!
//! O(|V| · k) per iteration for the move scan, O(deg) for the γ update.
//!
//! # Reference
//!
//! Hertz, A. & de Werra, D. (1987). "Using Tabu Search Techniques for Graph
//! Coloring", *Computing* 39(4), 345-351.
//!
//! Galinier, P. & Hao, J.-K. (1999). "Hybrid Evolutionary Algorithms for
//! Graph Coloring", *Journal of Combinatorial Optimization* 3(4), 379-397.

use rand::Rng;
use tracing::trace;

use crate::models::GraphProblem;
use crate::solution::Coloring;

/// Dynamic part of the tenure, per conflicting vertex.
const TENURE_SLOPE: f64 = 0.6;

struct TabuState<'a> {
    graph: &'a GraphProblem,
    coloring: Coloring,
    k: usize,
    /// `gamma[v * (k + 1) + c]`.
    gamma: Vec<usize>,
    /// Iteration until which `(v, c)` is tabu, same layout as `gamma`.
    tabu_until: Vec<u32>,
}

impl<'a> TabuState<'a> {
    fn new(graph: &'a GraphProblem, coloring: Coloring, k: usize) -> Self {
        let mut state = Self {
            graph,
            coloring,
            k,
            gamma: Vec::new(),
            tabu_until: Vec::new(),
        };
        state.rebuild();
        state
    }

    fn width(&self) -> usize {
        self.k + 1
    }

    fn rebuild(&mut self) {
        let n = self.coloring.len();
        let w = self.width();
        self.gamma = vec![0; n * w];
        self.tabu_until = vec![0; n * w];
        for &(u, v) in self.graph.edges() {
            self.gamma[u * w + self.coloring.color(v)] += 1;
            self.gamma[v * w + self.coloring.color(u)] += 1;
        }
    }

    fn recolor(&mut self, v: usize, c: usize) {
        let w = self.width();
        let old = self.coloring.color(v);
        for &u in self.graph.neighbors(v) {
            self.gamma[u * w + old] -= 1;
            self.gamma[u * w + c] += 1;
        }
        self.coloring.set_color(self.graph, v, c);
    }

    /// Best admissible move `(v, c, delta)`, ties broken uniformly.
    fn best_move<R: Rng>(&self, iter: u32, best_conflicts: usize, rng: &mut R) -> Option<(usize, usize, i64)> {
        let w = self.width();
        let conflicts = self.coloring.conflicts() as i64;
        let mut best: Option<(usize, usize, i64)> = None;
        let mut ties = 0u32;
        for v in self.coloring.conflicting_vertices(self.graph) {
            let cur = self.coloring.color(v);
            let here = self.gamma[v * w + cur] as i64;
            for c in 1..=self.k {
                if c == cur {
                    continue;
                }
                let delta = self.gamma[v * w + c] as i64 - here;
                let tabu = self.tabu_until[v * w + c] > iter;
                if tabu && conflicts + delta >= best_conflicts as i64 {
                    continue;
                }
                match best {
                    Some((_, _, d)) if delta > d => {}
                    Some((_, _, d)) if delta == d => {
                        ties += 1;
                        if rng.random_range(0..=ties) == 0 {
                            best = Some((v, c, delta));
                        }
                    }
                    _ => {
                        ties = 0;
                        best = Some((v, c, delta));
                    }
                }
            }
        }
        best
    }

    /// Moves every vertex of class k to its least conflicting color below k.
    fn drop_top_color(&mut self) {
        let top = self.k;
        let w = self.width();
        let members: Vec<usize> = (0..self.coloring.len())
            .filter(|&v| self.coloring.color(v) == top)
            .collect();
        for v in members {
            let c = (1..top)
                .min_by_key(|&c| (self.gamma[v * w + c], c))
                .unwrap_or(1);
            self.recolor(v, c);
        }
        self.k -= 1;
        self.rebuild();
    }
}

/// Runs TabuCol for at most `iter_cap` iterations.
///
/// Uncolored vertices are first given their smallest free color. The
/// returned coloring is the best seen (by fitness) and never worse than the
/// input.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_ils::local_search::tabu_coloring;
/// use u_ils::models::GraphProblem;
/// use u_ils::solution::Coloring;
///
/// // Even cycle colored with 3 colors
/// let g = GraphProblem::new(6, [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)]).unwrap();
/// let start = Coloring::from_colors(&g, vec![1, 2, 1, 2, 1, 3]);
/// let mut rng = ChaCha8Rng::seed_from_u64(0);
/// let out = tabu_coloring(&g, &start, 10, 500, &mut rng);
/// assert!(out.is_feasible());
/// assert_eq!(out.num_colors(), 2);
/// ```
pub fn tabu_coloring<R: Rng>(
    graph: &GraphProblem,
    start: &Coloring,
    tenure: u32,
    iter_cap: u32,
    rng: &mut R,
) -> Coloring {
    let mut best = start.clone();
    let mut best_fit = best.fitness();

    let mut working = start.clone();
    for v in 0..working.len() {
        if working.color(v) == 0 {
            let c = working.smallest_free_color(graph, v);
            working.set_color(graph, v, c);
        }
    }
    working.normalize();
    if working.fitness() < best_fit {
        best = working.clone();
        best_fit = best.fitness();
    }
    let k = working.num_colors().max(1);
    let mut state = TabuState::new(graph, working, k);
    let mut best_conflicts = state.coloring.conflicts();

    for iter in 0..iter_cap {
        if state.coloring.conflicts() == 0 {
            let fit = state.coloring.fitness();
            if fit < best_fit {
                best = state.coloring.clone();
                best_fit = fit;
            }
            if state.k <= 1 {
                break;
            }
            state.drop_top_color();
            best_conflicts = state.coloring.conflicts();
            trace!(k = state.k, iter, "tabucol: trying fewer colors");
            continue;
        }

        let Some((v, c, _)) = state.best_move(iter, best_conflicts, rng) else {
            break;
        };
        let old = state.coloring.color(v);
        state.recolor(v, c);
        let w = state.width();
        let conflicting = state.coloring.conflicting_vertices(graph).len();
        state.tabu_until[v * w + old] = iter + 1 + tenure + (TENURE_SLOPE * conflicting as f64) as u32;

        best_conflicts = best_conflicts.min(state.coloring.conflicts());
        let fit = state.coloring.fitness();
        if fit < best_fit {
            best = state.coloring.clone();
            best_fit = fit;
        }
    }

    best.normalize();
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn petersen() -> GraphProblem {
        let outer = (0..5).map(|i| (i, (i + 1) % 5));
        let spokes = (0..5).map(|i| (i, i + 5));
        let inner = (0..5).map(|i| (5 + i, 5 + (i + 2) % 5));
        GraphProblem::new(10, outer.chain(spokes).chain(inner).collect::<Vec<_>>()).expect("valid")
    }

    #[test]
    fn test_resolves_conflicts() {
        // The Petersen graph has chromatic number 3
        let g = petersen();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let wide = Coloring::from_colors(&g, (0..10).map(|v| v % 4 + 1).collect());
        assert!(!wide.is_feasible());
        let out = tabu_coloring(&g, &wide, 10, 2000, &mut rng);
        assert!(out.is_feasible());
        assert_eq!(out.num_colors(), 3);
    }

    #[test]
    fn test_single_color_has_no_moves() {
        let g = petersen();
        let start = Coloring::from_colors(&g, vec![1; 10]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(tabu_coloring(&g, &start, 10, 50, &mut rng), start);
    }

    #[test]
    fn test_colors_uncolored_vertices() {
        let g = GraphProblem::new(3, [(0, 1), (1, 2)]).expect("valid");
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = tabu_coloring(&g, &Coloring::uncolored(3), 10, 100, &mut rng);
        assert!(out.is_feasible());
        assert_eq!(out.num_colors(), 2);
    }

    #[test]
    fn test_never_worse_with_zero_budget() {
        let g = petersen();
        let start = Coloring::from_colors(&g, vec![1, 2, 1, 2, 3, 2, 3, 3, 1, 1]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = tabu_coloring(&g, &start, 10, 0, &mut rng);
        assert!(out.fitness() <= start.fitness());
    }
}
