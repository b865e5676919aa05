//! Inter-route relocation.
//!
//! # Algorithm
//!
//! Removes one customer from its route and inserts it at any position of
//! another route. Moving the last customer out of a route empties it, which
//! the driver counts as one route fewer.
//!
//! # Complexity
//!
//! O(n · R · m) moves, m = customers in the target route.
//!
//! # Reference
//!
//! Savelsbergh, M.W.P. (1992). "The Vehicle Routing Problem with Time
//! Windows: Minimizing Route Duration", *ORSA Journal on Computing* 4(2),
//! 146-154.

use rand::Rng;

use super::routing::{routes_with_len, two_routes, RouteChange, RouteMoves};

/// Move one customer to another route.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterRelocate;

fn relocated(s1: &[usize], s2: &[usize], i: usize, j: usize, a: &mut Vec<usize>, b: &mut Vec<usize>) {
    a.clear();
    a.extend_from_slice(&s1[..i]);
    a.extend_from_slice(&s1[i + 1..]);
    b.clear();
    b.extend_from_slice(&s2[..j]);
    b.push(s1[i]);
    b.extend_from_slice(&s2[j..]);
}

impl RouteMoves for InterRelocate {
    fn scan<F>(&self, routes: &[Vec<usize>], mut visit: F)
    where
        F: FnMut(&[(usize, &[usize])]) -> bool,
    {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        for (r1, s1) in routes.iter().enumerate() {
            for (r2, s2) in routes.iter().enumerate() {
                if r1 == r2 {
                    continue;
                }
                for i in 0..s1.len() {
                    for j in 0..=s2.len() {
                        relocated(s1, s2, i, j, &mut a, &mut b);
                        if visit(&[(r1, a.as_slice()), (r2, b.as_slice())]) {
                            return;
                        }
                    }
                }
            }
        }
    }

    fn sample<R: Rng>(&self, routes: &[Vec<usize>], rng: &mut R) -> Option<Vec<RouteChange>> {
        let (r1, r2) = two_routes(&routes_with_len(routes, 0), rng)?;
        let (s1, s2) = (&routes[r1], &routes[r2]);
        if s1.is_empty() {
            return None;
        }
        let i = rng.random_range(0..s1.len());
        let j = rng.random_range(0..=s2.len());
        let (mut a, mut b) = (Vec::new(), Vec::new());
        relocated(s1, s2, i, j, &mut a, &mut b);
        Some(vec![(r1, a), (r2, b)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_search::{Neighborhood, RoutingNeighborhood};
    use crate::models::{Customer, VrptwProblem};
    use crate::solution::RoutingSolution;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_relocated() {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        relocated(&[1, 2, 3], &[4, 5], 1, 1, &mut a, &mut b);
        assert_eq!(a, vec![1, 3]);
        assert_eq!(b, vec![4, 2, 5]);
    }

    #[test]
    fn test_moves_customer_to_its_cluster() {
        let customers = vec![
            Customer::depot(0.0, 0.0),
            Customer::new(1, 1.0, 0.0, 10, 0.0),
            Customer::new(2, 2.0, 0.0, 10, 0.0),
            Customer::new(3, -1.0, 0.0, 10, 0.0),
            Customer::new(4, 3.0, 0.0, 10, 0.0),
        ];
        // Capacity 30 keeps two routes; 4 belongs with 1 and 2
        let p = VrptwProblem::new(customers, 30, 2).expect("valid");
        let start = RoutingSolution::from_sequences(&p, vec![vec![1, 2], vec![3, 4]]);
        let next = RoutingNeighborhood::new(&p, InterRelocate)
            .improving(&start, false)
            .expect("improving");
        assert!(next.total_distance() < start.total_distance());
        assert_eq!(next.num_served(), 4);
    }

    #[test]
    fn test_scan_count() {
        let routes = vec![vec![1, 2], vec![3]];
        let mut count = 0;
        InterRelocate.scan(&routes, |_| {
            count += 1;
            false
        });
        // 2 customers × 2 slots + 1 customer × 3 slots
        assert_eq!(count, 7);
    }

    #[test]
    fn test_sample() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let routes = vec![vec![1, 2], vec![3]];
        for _ in 0..20 {
            if let Some(changes) = InterRelocate.sample(&routes, &mut rng) {
                let served: usize = changes.iter().map(|(_, s)| s.len()).sum();
                assert_eq!(served, 3);
            }
        }
        assert!(InterRelocate.sample(&[vec![1]], &mut rng).is_none());
    }
}
