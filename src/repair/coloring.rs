use crate::constructive::dsatur;
use crate::models::GraphProblem;
use crate::solution::Coloring;

/// Share of monochromatic edges above which [`greedy_rebuild`] starts over.
pub const REBUILD_DENSITY: f64 = 0.1;

/// Visits vertices by id and gives every uncolored or conflicting one the
/// smallest color free among its neighbors, opening a new color when all
/// used ones are taken. The result is a proper coloring with compact labels.
///
/// # Examples
///
/// ```
/// use u_ils::models::GraphProblem;
/// use u_ils::repair::sequential_resolution;
/// use u_ils::solution::Coloring;
///
/// let g = GraphProblem::new(3, [(0, 1), (1, 2), (0, 2)]).unwrap();
/// let c = Coloring::from_colors(&g, vec![1, 1, 0]);
/// let fixed = sequential_resolution(&g, &c);
/// assert!(fixed.is_feasible());
/// assert_eq!(fixed.num_colors(), 3);
/// ```
pub fn sequential_resolution(graph: &GraphProblem, coloring: &Coloring) -> Coloring {
    let mut next = coloring.clone();
    for v in 0..next.len() {
        if next.color(v) == 0 || next.is_conflicting(graph, v) {
            let c = next.smallest_free_color(graph, v);
            next.set_color(graph, v, c);
        }
    }
    next.normalize();
    next
}

/// DSATUR rebuild when more than [`REBUILD_DENSITY`] of the edges are
/// monochromatic, sequential resolution otherwise.
pub fn greedy_rebuild(graph: &GraphProblem, coloring: &Coloring) -> Coloring {
    let edges = graph.num_edges();
    let density = if edges == 0 {
        0.0
    } else {
        coloring.conflicts() as f64 / edges as f64
    };
    if density > REBUILD_DENSITY {
        dsatur(graph)
    } else {
        sequential_resolution(graph, coloring)
    }
}
