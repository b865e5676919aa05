//! Graph coloring neighborhoods.
//!
//! Moves are priced from neighbor color counts before anything is applied;
//! only the chosen move is materialized.

use std::collections::VecDeque;

use rand::seq::IndexedRandom;
use rand::Rng;

use super::Neighborhood;
use crate::evaluation::Fitness;
use crate::models::GraphProblem;
use crate::solution::Coloring;

/// Fitness after moving `v` from its color to `c`, given the number of
/// neighbors of `v` with its old color and with `c`.
fn recolor_fitness(coloring: &Coloring, v: usize, c: usize, same_old: usize, same_new: usize) -> Fitness {
    let old = coloring.color(v);
    let mut conflicts = coloring.conflicts() + same_new;
    let mut uncolored = coloring.uncolored_count();
    let mut k = coloring.num_colors();
    let mut square = coloring.square_sum();
    if old == 0 {
        uncolored -= 1;
    } else {
        conflicts -= same_old;
        let s = coloring.class_size(old);
        square -= 2 * s - 1;
        if s == 1 {
            k -= 1;
        }
    }
    let s = coloring.class_size(c);
    square += 2 * s + 1;
    if s == 0 {
        k += 1;
    }
    Coloring::score(conflicts + uncolored, k, square, coloring.len())
}

/// Count of neighbors of `v` per color, indexed by color.
fn neighbor_colors(graph: &GraphProblem, coloring: &Coloring, v: usize, out: &mut Vec<usize>) {
    out.clear();
    out.resize(coloring.max_color() + 1, 0);
    for &u in graph.neighbors(v) {
        let c = coloring.color(u);
        if c < out.len() {
            out[c] += 1;
        }
    }
}

/// Target colors for recoloring: the used ones, or color 1 on a blank slate.
fn target_colors(coloring: &Coloring) -> Vec<usize> {
    let used = coloring.used_colors();
    if used.is_empty() {
        vec![1]
    } else {
        used
    }
}

/// Recolor one vertex with a color already in use.
pub struct OneVertexMove<'a> {
    graph: &'a GraphProblem,
}

impl<'a> OneVertexMove<'a> {
    pub fn new(graph: &'a GraphProblem) -> Self {
        Self { graph }
    }
}

impl Neighborhood for OneVertexMove<'_> {
    type Solution = Coloring;

    fn improving(&self, current: &Coloring, first: bool) -> Option<Coloring> {
        let base = current.fitness();
        let targets = target_colors(current);
        let mut counts = Vec::new();
        let mut best: Option<(usize, usize, Fitness)> = None;

        'scan: for v in 0..current.len() {
            neighbor_colors(self.graph, current, v, &mut counts);
            let old = current.color(v);
            let same_old = counts.get(old).copied().unwrap_or(0);
            for &c in &targets {
                if c == old {
                    continue;
                }
                let same_new = counts.get(c).copied().unwrap_or(0);
                let fit = recolor_fitness(current, v, c, same_old, same_new);
                if fit < best.map_or(base, |b| b.2) {
                    best = Some((v, c, fit));
                    if first {
                        break 'scan;
                    }
                }
            }
        }

        best.map(|(v, c, _)| {
            let mut next = current.clone();
            next.set_color(self.graph, v, c);
            next
        })
    }

    fn random<R: Rng>(&self, current: &Coloring, rng: &mut R) -> Option<Coloring> {
        if current.is_empty() {
            return None;
        }
        let v = rng.random_range(0..current.len());
        let choices: Vec<usize> = target_colors(current)
            .into_iter()
            .filter(|&c| c != current.color(v))
            .collect();
        let &c = choices.choose(rng)?;
        let mut next = current.clone();
        next.set_color(self.graph, v, c);
        Some(next)
    }
}

/// Exchange the colors of two differently colored vertices.
///
/// Class sizes never change, so only moves touching a conflicting vertex
/// can improve.
pub struct SwapColors<'a> {
    graph: &'a GraphProblem,
}

impl<'a> SwapColors<'a> {
    pub fn new(graph: &'a GraphProblem) -> Self {
        Self { graph }
    }

    fn swapped_conflicts(&self, coloring: &Coloring, u: usize, v: usize) -> usize {
        let (a, b) = (coloring.color(u), coloring.color(v));
        let adjacent = usize::from(self.graph.are_adjacent(u, v));
        coloring.conflicts() + coloring.neighbors_with(self.graph, u, b) + coloring.neighbors_with(self.graph, v, a)
            - coloring.neighbors_with(self.graph, u, a)
            - coloring.neighbors_with(self.graph, v, b)
            - 2 * adjacent
    }

    fn apply(&self, coloring: &Coloring, u: usize, v: usize) -> Coloring {
        let (a, b) = (coloring.color(u), coloring.color(v));
        let mut next = coloring.clone();
        next.set_color(self.graph, u, b);
        next.set_color(self.graph, v, a);
        next
    }
}

impl Neighborhood for SwapColors<'_> {
    type Solution = Coloring;

    fn improving(&self, current: &Coloring, first: bool) -> Option<Coloring> {
        let conflicting = current.conflicting_vertices(self.graph);
        let mut best: Option<(usize, usize, usize)> = None;
        let mut best_conflicts = current.conflicts();

        'scan: for &u in &conflicting {
            for v in 0..current.len() {
                let (a, b) = (current.color(u), current.color(v));
                if b == 0 || a == b {
                    continue;
                }
                let conflicts = self.swapped_conflicts(current, u, v);
                if conflicts < best_conflicts {
                    best_conflicts = conflicts;
                    best = Some((u, v, conflicts));
                    if first {
                        break 'scan;
                    }
                }
            }
        }

        best.map(|(u, v, _)| self.apply(current, u, v))
    }

    fn random<R: Rng>(&self, current: &Coloring, rng: &mut R) -> Option<Coloring> {
        let colored: Vec<usize> = (0..current.len()).filter(|&v| current.color(v) != 0).collect();
        let &u = colored.choose(rng)?;
        let others: Vec<usize> = colored
            .iter()
            .copied()
            .filter(|&v| current.color(v) != current.color(u))
            .collect();
        let &v = others.choose(rng)?;
        Some(self.apply(current, u, v))
    }
}

/// Vertices of the Kempe chain through `v` for colors `color(v)` and `other`:
/// the connected component of `v` in the subgraph induced by both colors.
///
/// Returned in BFS order starting at `v`.
pub fn kempe_chain(graph: &GraphProblem, coloring: &Coloring, v: usize, other: usize) -> Vec<usize> {
    let a = coloring.color(v);
    let mut seen = vec![false; coloring.len()];
    let mut chain = Vec::new();
    let mut queue = VecDeque::from([v]);
    seen[v] = true;
    while let Some(u) = queue.pop_front() {
        chain.push(u);
        for &w in graph.neighbors(u) {
            let c = coloring.color(w);
            if !seen[w] && (c == a || c == other) {
                seen[w] = true;
                queue.push_back(w);
            }
        }
    }
    chain
}

/// Swap two colors along a Kempe chain.
///
/// Conflicts are unchanged by such a swap, so moves improve by emptying a
/// color or by unbalancing the class sizes.
pub struct KempeChain<'a> {
    graph: &'a GraphProblem,
}

impl<'a> KempeChain<'a> {
    pub fn new(graph: &'a GraphProblem) -> Self {
        Self { graph }
    }

    fn apply(&self, coloring: &Coloring, chain: &[usize], a: usize, b: usize) -> Coloring {
        let mut next = coloring.clone();
        for &u in chain {
            let c = if coloring.color(u) == a { b } else { a };
            next.set_color(self.graph, u, c);
        }
        next
    }
}

impl Neighborhood for KempeChain<'_> {
    type Solution = Coloring;

    fn improving(&self, current: &Coloring, first: bool) -> Option<Coloring> {
        let base = current.fitness();
        let used = current.used_colors();
        let n = current.len();
        let mut best: Option<(Vec<usize>, usize, usize, Fitness)> = None;
        let mut seen = vec![false; n];

        'scan: for (ia, &a) in used.iter().enumerate() {
            for &b in &used[ia + 1..] {
                seen.iter_mut().for_each(|s| *s = false);
                for v in 0..n {
                    if seen[v] || (current.color(v) != a && current.color(v) != b) {
                        continue;
                    }
                    let chain = kempe_chain(self.graph, current, v, if current.color(v) == a { b } else { a });
                    let on_a = chain.iter().filter(|&&u| current.color(u) == a).count();
                    let on_b = chain.len() - on_a;
                    for &u in &chain {
                        seen[u] = true;
                    }

                    let (sa, sb) = (current.class_size(a), current.class_size(b));
                    let (na, nb) = (sa - on_a + on_b, sb - on_b + on_a);
                    let k = current.num_colors() - usize::from(na == 0) - usize::from(nb == 0);
                    let square = current.square_sum() - sa * sa - sb * sb + na * na + nb * nb;
                    let fit = Coloring::score(
                        current.conflicts() + current.uncolored_count(),
                        k,
                        square,
                        n,
                    );
                    if fit < best.as_ref().map_or(base, |m| m.3) {
                        best = Some((chain, a, b, fit));
                        if first {
                            break 'scan;
                        }
                    }
                }
            }
        }

        best.map(|(chain, a, b, _)| self.apply(current, &chain, a, b))
    }

    fn random<R: Rng>(&self, current: &Coloring, rng: &mut R) -> Option<Coloring> {
        let colored: Vec<usize> = (0..current.len()).filter(|&v| current.color(v) != 0).collect();
        let &v = colored.choose(rng)?;
        let a = current.color(v);
        let others: Vec<usize> = current.used_colors().into_iter().filter(|&c| c != a).collect();
        let &b = others.choose(rng)?;
        let chain = kempe_chain(self.graph, current, v, b);
        Some(self.apply(current, &chain, a, b))
    }
}
