//! Vertex coloring with incrementally maintained conflicts.

use crate::evaluation::Fitness;
use crate::models::GraphProblem;

/// Assignment of colors to vertices; color 0 means uncolored.
///
/// Class sizes, the number of used colors `k`, the sum of squared class sizes
/// and the number of monochromatic edges are kept up to date by
/// [`set_color`](Self::set_color) in O(deg(v)).
///
/// The fitness is `(conflicts + uncolored, k, −Σ|Cᵢ|²)`: the tie-breaker
/// favors unbalanced classes, which gives plateau moves a direction towards
/// emptying a color.
///
/// # Examples
///
/// ```
/// use u_ils::models::GraphProblem;
/// use u_ils::solution::Coloring;
///
/// let g = GraphProblem::new(3, [(0, 1), (1, 2)]).unwrap();
/// let mut c = Coloring::uncolored(3);
/// c.set_color(&g, 0, 1);
/// c.set_color(&g, 1, 1);
/// assert_eq!(c.conflicts(), 1);
/// c.set_color(&g, 1, 2);
/// c.set_color(&g, 2, 1);
/// assert!(c.is_feasible());
/// assert_eq!(c.num_colors(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Coloring {
    colors: Vec<usize>,
    class_sizes: Vec<usize>,
    num_colors: usize,
    conflicts: usize,
    square_sum: usize,
}

impl Coloring {
    /// All vertices uncolored.
    pub fn uncolored(n: usize) -> Self {
        Self {
            colors: vec![0; n],
            class_sizes: vec![n],
            num_colors: 0,
            conflicts: 0,
            square_sum: 0,
        }
    }

    /// Builds a coloring from an explicit color vector.
    ///
    /// # Panics
    ///
    /// Panics if `colors.len()` differs from the vertex count.
    pub fn from_colors(graph: &GraphProblem, colors: Vec<usize>) -> Self {
        assert_eq!(colors.len(), graph.num_vertices());
        let max = colors.iter().copied().max().unwrap_or(0);
        let mut class_sizes = vec![0; max + 1];
        for &c in &colors {
            class_sizes[c] += 1;
        }
        let conflicts = graph
            .edges()
            .iter()
            .filter(|&&(u, v)| colors[u] != 0 && colors[u] == colors[v])
            .count();
        let num_colors = class_sizes[1..].iter().filter(|&&s| s > 0).count();
        let square_sum = class_sizes[1..].iter().map(|&s| s * s).sum();
        Self {
            colors,
            class_sizes,
            num_colors,
            conflicts,
            square_sum,
        }
    }

    /// Color of vertex `v` (0 if uncolored).
    pub fn color(&self, v: usize) -> usize {
        self.colors[v]
    }

    pub fn colors(&self) -> &[usize] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of distinct colors in use (k).
    pub fn num_colors(&self) -> usize {
        self.num_colors
    }

    /// Number of monochromatic edges.
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    pub fn uncolored_count(&self) -> usize {
        self.class_sizes[0]
    }

    /// Size of color class `c`.
    pub fn class_size(&self, c: usize) -> usize {
        self.class_sizes.get(c).copied().unwrap_or(0)
    }

    /// Highest color index with a non-empty class.
    pub fn max_color(&self) -> usize {
        (1..self.class_sizes.len())
            .rev()
            .find(|&c| self.class_sizes[c] > 0)
            .unwrap_or(0)
    }

    /// Colors with non-empty classes, ascending.
    pub fn used_colors(&self) -> Vec<usize> {
        (1..self.class_sizes.len())
            .filter(|&c| self.class_sizes[c] > 0)
            .collect()
    }

    /// Sum of squared class sizes over used colors.
    pub fn square_sum(&self) -> usize {
        self.square_sum
    }

    /// Number of neighbors of `v` that currently have color `c`.
    pub fn neighbors_with(&self, graph: &GraphProblem, v: usize, c: usize) -> usize {
        graph
            .neighbors(v)
            .iter()
            .filter(|&&u| self.colors[u] == c)
            .count()
    }

    /// Returns `true` if `v` shares its (positive) color with a neighbor.
    pub fn is_conflicting(&self, graph: &GraphProblem, v: usize) -> bool {
        let c = self.colors[v];
        c != 0 && graph.neighbors(v).iter().any(|&u| self.colors[u] == c)
    }

    /// Vertices involved in at least one conflict, ascending.
    pub fn conflicting_vertices(&self, graph: &GraphProblem) -> Vec<usize> {
        (0..self.colors.len())
            .filter(|&v| self.is_conflicting(graph, v))
            .collect()
    }

    /// Smallest positive color not used by any neighbor of `v`.
    pub fn smallest_free_color(&self, graph: &GraphProblem, v: usize) -> usize {
        let mut taken = vec![false; graph.degree(v) + 2];
        for &u in graph.neighbors(v) {
            let c = self.colors[u];
            if c < taken.len() {
                taken[c] = true;
            }
        }
        (1..taken.len()).find(|&c| !taken[c]).unwrap_or(taken.len())
    }

    /// Recolors `v`, updating every derived quantity in O(deg(v)).
    pub fn set_color(&mut self, graph: &GraphProblem, v: usize, c: usize) {
        let old = self.colors[v];
        if old == c {
            return;
        }
        if old != 0 {
            self.conflicts -= self.neighbors_with(graph, v, old);
        }
        if c != 0 {
            self.conflicts += self.neighbors_with(graph, v, c);
        }
        if c >= self.class_sizes.len() {
            self.class_sizes.resize(c + 1, 0);
        }

        if old != 0 {
            let s = self.class_sizes[old];
            self.square_sum -= 2 * s - 1;
            if s == 1 {
                self.num_colors -= 1;
            }
        }
        self.class_sizes[old] -= 1;

        if c != 0 {
            let s = self.class_sizes[c];
            self.square_sum += 2 * s + 1;
            if s == 0 {
                self.num_colors += 1;
            }
        }
        self.class_sizes[c] += 1;
        self.colors[v] = c;
    }

    /// Relabels used colors to `1..=k`, keeping their relative order.
    pub fn normalize(&mut self) {
        let mut map = vec![0; self.class_sizes.len()];
        let mut next = 0;
        for (c, slot) in map.iter_mut().enumerate().skip(1) {
            if self.class_sizes[c] > 0 {
                next += 1;
                *slot = next;
            }
        }
        for color in &mut self.colors {
            *color = map[*color];
        }
        let mut sizes = vec![0; next + 1];
        sizes[0] = self.class_sizes[0];
        for (c, &m) in map.iter().enumerate().skip(1) {
            if m > 0 {
                sizes[m] = self.class_sizes[c];
            }
        }
        self.class_sizes = sizes;
    }

    /// Zero conflicts and every vertex colored.
    pub fn is_feasible(&self) -> bool {
        self.conflicts == 0 && self.uncolored_count() == 0
    }

    pub fn fitness(&self) -> Fitness {
        Self::score(
            self.conflicts + self.uncolored_count(),
            self.num_colors,
            self.square_sum,
            self.colors.len(),
        )
    }

    /// Fitness for hypothetical counts, used to price moves.
    pub fn score(violations: usize, colors: usize, square_sum: usize, n: usize) -> Fitness {
        Fitness::coloring(violations as u64, colors, -(square_sum as f64), n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> GraphProblem {
        GraphProblem::new(4, [(0, 1), (1, 2), (2, 3)]).expect("valid")
    }

    #[test]
    fn test_incremental_matches_rebuild() {
        let g = path();
        let mut c = Coloring::uncolored(4);
        for (v, col) in [(0, 1), (1, 1), (2, 2), (3, 2), (1, 3), (3, 0), (0, 3)] {
            c.set_color(&g, v, col);
            let rebuilt = Coloring::from_colors(&g, c.colors().to_vec());
            assert_eq!(c.conflicts(), rebuilt.conflicts());
            assert_eq!(c.num_colors(), rebuilt.num_colors());
            assert_eq!(c.square_sum(), rebuilt.square_sum());
            assert_eq!(c.uncolored_count(), rebuilt.uncolored_count());
        }
    }

    #[test]
    fn test_normalize() {
        let g = path();
        let mut c = Coloring::from_colors(&g, vec![5, 2, 5, 2]);
        assert_eq!(c.max_color(), 5);
        c.normalize();
        assert_eq!(c.colors(), &[2, 1, 2, 1]);
        assert_eq!(c.max_color(), 2);
        assert_eq!(c.num_colors(), 2);
        assert!(c.is_feasible());
    }

    #[test]
    fn test_smallest_free_color() {
        let g = path();
        let c = Coloring::from_colors(&g, vec![1, 0, 2, 0]);
        assert_eq!(c.smallest_free_color(&g, 1), 3);
        assert_eq!(c.smallest_free_color(&g, 3), 1);
    }

    #[test]
    fn test_fitness_prefers_fewer_violations() {
        let g = path();
        let proper = Coloring::from_colors(&g, vec![1, 2, 1, 2]);
        let partial = Coloring::from_colors(&g, vec![1, 0, 1, 0]);
        assert!(proper.fitness() < partial.fitness());
        assert_eq!(partial.fitness().violations, 2);
        assert_eq!(proper.conflicting_vertices(&g), Vec::<usize>::new());
    }
}
