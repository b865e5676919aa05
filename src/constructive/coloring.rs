//! Greedy graph coloring constructors.
//!
//! Every constructor returns a complete proper coloring with colors
//! `1..=k`.
//!
//! # Reference
//!
//! Brélaz, D. (1979). "New methods to color the vertices of a graph",
//! *Communications of the ACM* 22(4), 251-256.
//!
//! Leighton, F.T. (1979). "A graph coloring algorithm for large scheduling
//! problems", *Journal of Research of the NBS* 84(6), 489-506.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::GraphProblem;
use crate::solution::Coloring;

/// Colors vertices in the given order, each with its smallest free color.
pub fn greedy_in_order(graph: &GraphProblem, order: &[usize]) -> Coloring {
    let mut coloring = Coloring::uncolored(graph.num_vertices());
    for &v in order {
        let c = coloring.smallest_free_color(graph, v);
        coloring.set_color(graph, v, c);
    }
    coloring
}

/// DSATUR: repeatedly color the uncolored vertex with the most distinct
/// neighbor colors, ties by degree then lowest id.
///
/// # Complexity
///
/// O(n² + m log Δ).
///
/// # Examples
///
/// ```
/// use u_ils::models::GraphProblem;
/// use u_ils::constructive::dsatur;
///
/// let g = GraphProblem::new(3, [(0, 1), (1, 2), (0, 2)]).unwrap();
/// let c = dsatur(&g);
/// assert!(c.is_feasible());
/// assert_eq!(c.num_colors(), 3);
/// ```
pub fn dsatur(graph: &GraphProblem) -> Coloring {
    let n = graph.num_vertices();
    let mut coloring = Coloring::uncolored(n);
    // Sorted distinct colors seen among each vertex's neighbors
    let mut seen: Vec<Vec<usize>> = vec![Vec::new(); n];

    for _ in 0..n {
        let Some(v) = (0..n)
            .filter(|&v| coloring.color(v) == 0)
            .max_by(|&a, &b| {
                seen[a]
                    .len()
                    .cmp(&seen[b].len())
                    .then(graph.degree(a).cmp(&graph.degree(b)))
                    .then(b.cmp(&a))
            })
        else {
            break;
        };

        let c = (1..)
            .find(|c| seen[v].binary_search(c).is_err())
            .unwrap_or(1);
        coloring.set_color(graph, v, c);

        for &u in graph.neighbors(v) {
            if let Err(pos) = seen[u].binary_search(&c) {
                seen[u].insert(pos, c);
            }
        }
    }
    coloring
}

/// Welsh-Powell: vertices by decreasing degree, ties by id.
pub fn largest_first(graph: &GraphProblem) -> Coloring {
    let mut order: Vec<usize> = (0..graph.num_vertices()).collect();
    order.sort_by(|&a, &b| graph.degree(b).cmp(&graph.degree(a)).then(a.cmp(&b)));
    greedy_in_order(graph, &order)
}

/// Smallest-last: repeatedly peel the vertex of minimum remaining degree,
/// then color in reverse peeling order.
pub fn smallest_last(graph: &GraphProblem) -> Coloring {
    let n = graph.num_vertices();
    let mut degree: Vec<usize> = (0..n).map(|v| graph.degree(v)).collect();
    let mut removed = vec![false; n];
    let mut peeled = Vec::with_capacity(n);

    for _ in 0..n {
        let Some(v) = (0..n)
            .filter(|&v| !removed[v])
            .min_by(|&a, &b| degree[a].cmp(&degree[b]).then(a.cmp(&b)))
        else {
            break;
        };
        removed[v] = true;
        peeled.push(v);
        for &u in graph.neighbors(v) {
            if !removed[u] {
                degree[u] -= 1;
            }
        }
    }

    peeled.reverse();
    greedy_in_order(graph, &peeled)
}

/// Greedy coloring over a uniformly random vertex order.
pub fn random_sequential<R: Rng>(graph: &GraphProblem, rng: &mut R) -> Coloring {
    let mut order: Vec<usize> = (0..graph.num_vertices()).collect();
    order.shuffle(rng);
    greedy_in_order(graph, &order)
}

/// Recursive Largest First: builds one maximal independent class at a time.
///
/// Each class starts from the uncolored vertex with most uncolored
/// neighbors; then repeatedly adds the candidate adjacent to the most
/// vertices already excluded from the class, ties by fewest candidate
/// neighbors then lowest id.
pub fn rlf(graph: &GraphProblem) -> Coloring {
    let n = graph.num_vertices();
    let mut coloring = Coloring::uncolored(n);
    let mut color = 0;

    while coloring.uncolored_count() > 0 {
        color += 1;
        // candidate: uncolored and not adjacent to the class
        let mut candidate: Vec<bool> = (0..n).map(|v| coloring.color(v) == 0).collect();
        let mut adj_excluded = vec![0usize; n];
        let mut adj_candidate: Vec<usize> = (0..n)
            .map(|v| graph.neighbors(v).iter().filter(|&&u| candidate[u]).count())
            .collect();

        let mut first = true;
        loop {
            let pick = (0..n).filter(|&v| candidate[v]).max_by(|&a, &b| {
                if first {
                    adj_candidate[a].cmp(&adj_candidate[b]).then(b.cmp(&a))
                } else {
                    adj_excluded[a]
                        .cmp(&adj_excluded[b])
                        .then(adj_candidate[b].cmp(&adj_candidate[a]))
                        .then(b.cmp(&a))
                }
            });
            let Some(v) = pick else { break };
            first = false;

            coloring.set_color(graph, v, color);
            candidate[v] = false;
            for &u in graph.neighbors(v) {
                adj_candidate[u] = adj_candidate[u].saturating_sub(1);
            }
            for &u in graph.neighbors(v) {
                if candidate[u] {
                    candidate[u] = false;
                    for &w in graph.neighbors(u) {
                        adj_candidate[w] = adj_candidate[w].saturating_sub(1);
                        adj_excluded[w] += 1;
                    }
                }
            }
        }
    }
    coloring
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn petersen() -> GraphProblem {
        let edges = [
            (0, 1), (1, 2), (2, 3), (3, 4), (4, 0),
            (0, 5), (1, 6), (2, 7), (3, 8), (4, 9),
            (5, 7), (7, 9), (9, 6), (6, 8), (8, 5),
        ];
        GraphProblem::new(10, edges).expect("valid")
    }

    fn crown(n: usize) -> GraphProblem {
        // K_{n,n} minus a perfect matching: bipartite, hard for bad orders
        let mut edges = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    edges.push((i, n + j));
                }
            }
        }
        GraphProblem::new(2 * n, edges).expect("valid")
    }

    #[test]
    fn test_all_constructors_proper() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for g in [petersen(), crown(4)] {
            for c in [
                dsatur(&g),
                largest_first(&g),
                smallest_last(&g),
                random_sequential(&g, &mut rng),
                rlf(&g),
            ] {
                assert!(c.is_feasible());
                assert_eq!(c.max_color(), c.num_colors());
            }
        }
    }

    #[test]
    fn test_dsatur_bipartite_optimal() {
        // DSATUR is exact on bipartite graphs
        assert_eq!(dsatur(&crown(5)).num_colors(), 2);
    }

    #[test]
    fn test_rlf_petersen() {
        let c = rlf(&petersen());
        assert!(c.num_colors() <= 4);
    }

    #[test]
    fn test_isolated_vertices() {
        let g = GraphProblem::new(4, []).expect("valid");
        assert_eq!(dsatur(&g).num_colors(), 1);
        assert_eq!(rlf(&g).num_colors(), 1);
    }
}
