use std::collections::VecDeque;

use rand::seq::{index, IndexedRandom};
use rand::Rng;

use super::element_count;
use crate::models::GraphProblem;
use crate::solution::Coloring;

/// Gives `⌈ρ·n⌉` distinct random vertices a random color among those in use,
/// different from their own when another one exists.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use u_ils::models::GraphProblem;
/// use u_ils::perturbation::random_recolor;
/// use u_ils::solution::Coloring;
///
/// let g = GraphProblem::new(4, [(0, 1), (1, 2), (2, 3)]).unwrap();
/// let c = Coloring::from_colors(&g, vec![1, 2, 1, 2]);
/// let mut rng = ChaCha8Rng::seed_from_u64(0);
/// let out = random_recolor(&g, &c, 0.5, &mut rng);
/// assert_eq!(out.colors().iter().zip(c.colors()).filter(|(a, b)| a != b).count(), 2);
/// ```
pub fn random_recolor<R: Rng>(graph: &GraphProblem, coloring: &Coloring, rho: f64, rng: &mut R) -> Coloring {
    let mut next = coloring.clone();
    let palette = match coloring.used_colors() {
        used if used.is_empty() => vec![1],
        used => used,
    };
    let count = element_count(rho, coloring.len());
    for v in index::sample(rng, coloring.len(), count) {
        let own = next.color(v);
        let others: Vec<usize> = palette.iter().copied().filter(|&c| c != own).collect();
        let &c = others.choose(rng).unwrap_or(&palette[0]);
        next.set_color(graph, v, c);
    }
    next
}

/// Uncolors a breadth-first region of `⌈ρ·n⌉` vertices grown from a random
/// vertex. When the component runs out, the region continues from another
/// random vertex.
pub fn partial_destroy<R: Rng>(graph: &GraphProblem, coloring: &Coloring, rho: f64, rng: &mut R) -> Coloring {
    let n = coloring.len();
    let target = element_count(rho, n);
    let mut next = coloring.clone();
    let mut seen = vec![false; n];
    let mut removed = 0;
    let mut queue = VecDeque::new();

    while removed < target {
        if queue.is_empty() {
            let fresh: Vec<usize> = (0..n).filter(|&v| !seen[v]).collect();
            let Some(&start) = fresh.choose(rng) else {
                break;
            };
            seen[start] = true;
            queue.push_back(start);
        }
        while let Some(v) = queue.pop_front() {
            next.set_color(graph, v, 0);
            removed += 1;
            if removed == target {
                break;
            }
            for &u in graph.neighbors(v) {
                if !seen[u] {
                    seen[u] = true;
                    queue.push_back(u);
                }
            }
        }
        queue.clear();
    }
    next
}
