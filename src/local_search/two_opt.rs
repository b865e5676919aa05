//! Intra-route 2-opt.
//!
//! # Algorithm
//!
//! For each pair of positions (i, j) in a route, reverse the segment
//! `r[i..=j]`. On a symmetric matrix the distance change is
//!
//! ```text
//! delta = d(r[i-1], r[j]) + d(r[i], r[j+1]) - d(r[i-1], r[i]) - d(r[j], r[j+1])
//! ```
//!
//! with the depot standing in for `r[-1]` and `r[n]`. The reversed route is
//! re-timed by the driver since reversal can break time windows.
//!
//! # Complexity
//!
//! O(n²) moves per route.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::routing::{routes_with_len, RouteChange, RouteMoves};

/// Segment reversal within one route.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoOpt;

fn reversed(seq: &[usize], i: usize, j: usize, out: &mut Vec<usize>) {
    out.clear();
    out.extend_from_slice(&seq[..i]);
    out.extend(seq[i..=j].iter().rev());
    out.extend_from_slice(&seq[j + 1..]);
}

impl RouteMoves for TwoOpt {
    fn scan<F>(&self, routes: &[Vec<usize>], mut visit: F)
    where
        F: FnMut(&[(usize, &[usize])]) -> bool,
    {
        let mut buf = Vec::new();
        for (r, seq) in routes.iter().enumerate() {
            let n = seq.len();
            for i in 0..n.saturating_sub(1) {
                for j in i + 1..n {
                    reversed(seq, i, j, &mut buf);
                    if visit(&[(r, buf.as_slice())]) {
                        return;
                    }
                }
            }
        }
    }

    fn sample<R: Rng>(&self, routes: &[Vec<usize>], rng: &mut R) -> Option<Vec<RouteChange>> {
        let &r = routes_with_len(routes, 2).choose(rng)?;
        let n = routes[r].len();
        let i = rng.random_range(0..n - 1);
        let j = rng.random_range(i + 1..n);
        let mut buf = Vec::with_capacity(n);
        reversed(&routes[r], i, j, &mut buf);
        Some(vec![(r, buf)])
    }
}
