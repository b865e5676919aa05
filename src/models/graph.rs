//! Undirected graph for the coloring domain.

use super::ModelError;

/// An undirected simple graph with sorted adjacency lists.
///
/// Vertices are numbered `0..n`. Construction rejects self loops, duplicate
/// edges and out-of-range endpoints.
///
/// # Examples
///
/// ```
/// use u_ils::models::GraphProblem;
///
/// let g = GraphProblem::new(3, [(0, 1), (0, 2), (1, 2)]).unwrap();
/// assert_eq!(g.num_edges(), 3);
/// assert_eq!(g.neighbors(0), &[1, 2]);
/// assert!((g.density() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct GraphProblem {
    name: String,
    edges: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
    known_chromatic: Option<usize>,
    lower_bound: Option<usize>,
}

impl GraphProblem {
    /// Builds a graph with `n` vertices from 0-based edges.
    pub fn new<I>(n: usize, edges: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        if n == 0 {
            return Err(ModelError::Empty);
        }
        let mut adjacency = vec![Vec::new(); n];
        let mut list = Vec::new();
        for (u, v) in edges {
            if u >= n {
                return Err(ModelError::VertexOutOfRange { vertex: u, n });
            }
            if v >= n {
                return Err(ModelError::VertexOutOfRange { vertex: v, n });
            }
            if u == v {
                return Err(ModelError::SelfLoop { vertex: u });
            }
            if adjacency[u].contains(&v) {
                return Err(ModelError::DuplicateEdge { u, v });
            }
            adjacency[u].push(v);
            adjacency[v].push(u);
            list.push((u.min(v), u.max(v)));
        }
        for adj in &mut adjacency {
            adj.sort_unstable();
        }
        Ok(Self {
            name: String::new(),
            edges: list,
            adjacency,
            known_chromatic: None,
            lower_bound: None,
        })
    }

    /// Sets the instance name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Records the known chromatic number.
    pub fn with_known_chromatic(mut self, chi: usize) -> Self {
        self.known_chromatic = Some(chi);
        self
    }

    /// Records a lower bound on the chromatic number.
    pub fn with_lower_bound(mut self, bound: usize) -> Self {
        self.lower_bound = Some(bound);
        self
    }

    /// Instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edges as `(min, max)` pairs in insertion order.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Sorted neighbors of `v`.
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjacency[v]
    }

    /// Degree of `v`.
    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    /// Returns `true` if `u` and `v` share an edge.
    pub fn are_adjacent(&self, u: usize, v: usize) -> bool {
        self.adjacency[u].binary_search(&v).is_ok()
    }

    pub fn max_degree(&self) -> usize {
        self.adjacency.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn min_degree(&self) -> usize {
        self.adjacency.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn avg_degree(&self) -> f64 {
        2.0 * self.num_edges() as f64 / self.num_vertices() as f64
    }

    /// Edge density `2m / (n (n - 1))`; zero for a single vertex.
    pub fn density(&self) -> f64 {
        let n = self.num_vertices() as f64;
        if n < 2.0 {
            return 0.0;
        }
        2.0 * self.num_edges() as f64 / (n * (n - 1.0))
    }

    /// Known chromatic number, if recorded.
    pub fn known_chromatic(&self) -> Option<usize> {
        self.known_chromatic
    }

    /// Lower bound on the chromatic number, if recorded.
    pub fn lower_bound(&self) -> Option<usize> {
        self.lower_bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_self_loop() {
        assert_eq!(
            GraphProblem::new(3, [(1, 1)]).unwrap_err(),
            ModelError::SelfLoop { vertex: 1 }
        );
    }

    #[test]
    fn test_rejects_duplicate_in_either_direction() {
        let err = GraphProblem::new(3, [(0, 1), (1, 0)]).unwrap_err();
        assert_eq!(err, ModelError::DuplicateEdge { u: 1, v: 0 });
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            GraphProblem::new(2, [(0, 2)]),
            Err(ModelError::VertexOutOfRange { vertex: 2, n: 2 })
        ));
        assert_eq!(GraphProblem::new(0, []).unwrap_err(), ModelError::Empty);
    }

    #[test]
    fn test_degree_statistics() {
        // Star with center 0
        let g = GraphProblem::new(4, [(0, 1), (0, 2), (0, 3)]).expect("valid");
        assert_eq!(g.max_degree(), 3);
        assert_eq!(g.min_degree(), 1);
        assert!((g.avg_degree() - 1.5).abs() < 1e-12);
        assert!((g.density() - 0.5).abs() < 1e-12);
        assert!(g.are_adjacent(2, 0));
        assert!(!g.are_adjacent(2, 3));
    }
}
