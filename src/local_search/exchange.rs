//! Inter-route exchange neighborhoods.
//!
//! # Algorithm
//!
//! All three operate on an ordered route pair r1 < r2:
//!
//! - **CROSS exchange** swaps a segment of 1–3 customers of r1 with a
//!   segment of 1–3 customers of r2, both keeping their orientation.
//! - **2-opt\*** swaps the tails:
//!   `R1' = R1[..i] ++ R2[j..]`, `R2' = R2[..j] ++ R1[i..]`.
//!   A tail swap that empties a route is allowed.
//! - **Swap** exchanges one customer of r1 with one customer of r2.
//!
//! # Complexity
//!
//! O(R² · n²) moves for 2-opt\* and swap, times 9 segment-length pairs for
//! CROSS.
//!
//! # Reference
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1995). "An Exchange Heuristic for
//! Routeing Problems with Time Windows", *Journal of the Operational Research
//! Society* 46(12), 1433-1446.
//!
//! Taillard, É. et al. (1997). "A Tabu Search Heuristic for the Vehicle
//! Routing Problem with Soft Time Windows", *Transportation Science* 31(2),
//! 170-186.

use rand::Rng;

use super::routing::{routes_with_len, two_routes, RouteChange, RouteMoves};

/// Longest segment moved by [`CrossExchange`].
const MAX_SEGMENT: usize = 3;

/// Swap segments of 1–3 customers between two routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossExchange;

/// Swap the tails of two routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoOptStar;

/// Swap one customer of a route with one customer of another.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapCustomers;

/// Replaces `s1[i..i + l1]` with `s2[j..j + l2]` into `a`, and the converse
/// into `b`.
#[allow(clippy::too_many_arguments)]
fn crossed(
    s1: &[usize],
    s2: &[usize],
    i: usize,
    l1: usize,
    j: usize,
    l2: usize,
    a: &mut Vec<usize>,
    b: &mut Vec<usize>,
) {
    a.clear();
    a.extend_from_slice(&s1[..i]);
    a.extend_from_slice(&s2[j..j + l2]);
    a.extend_from_slice(&s1[i + l1..]);
    b.clear();
    b.extend_from_slice(&s2[..j]);
    b.extend_from_slice(&s1[i..i + l1]);
    b.extend_from_slice(&s2[j + l2..]);
}

fn tails_swapped(s1: &[usize], s2: &[usize], i: usize, j: usize, a: &mut Vec<usize>, b: &mut Vec<usize>) {
    a.clear();
    a.extend_from_slice(&s1[..i]);
    a.extend_from_slice(&s2[j..]);
    b.clear();
    b.extend_from_slice(&s2[..j]);
    b.extend_from_slice(&s1[i..]);
}

/// Orders a sampled pair so the lower index comes first.
fn ordered((x, y): (usize, usize)) -> (usize, usize) {
    (x.min(y), x.max(y))
}

impl RouteMoves for CrossExchange {
    fn scan<F>(&self, routes: &[Vec<usize>], mut visit: F)
    where
        F: FnMut(&[(usize, &[usize])]) -> bool,
    {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        for r1 in 0..routes.len() {
            for r2 in r1 + 1..routes.len() {
                let (s1, s2) = (&routes[r1], &routes[r2]);
                for l1 in 1..=MAX_SEGMENT.min(s1.len()) {
                    for l2 in 1..=MAX_SEGMENT.min(s2.len()) {
                        for i in 0..=s1.len() - l1 {
                            for j in 0..=s2.len() - l2 {
                                crossed(s1, s2, i, l1, j, l2, &mut a, &mut b);
                                if visit(&[(r1, a.as_slice()), (r2, b.as_slice())]) {
                                    return;
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn sample<R: Rng>(&self, routes: &[Vec<usize>], rng: &mut R) -> Option<Vec<RouteChange>> {
        let (r1, r2) = ordered(two_routes(&routes_with_len(routes, 1), rng)?);
        let (s1, s2) = (&routes[r1], &routes[r2]);
        let l1 = rng.random_range(1..=MAX_SEGMENT.min(s1.len()));
        let l2 = rng.random_range(1..=MAX_SEGMENT.min(s2.len()));
        let i = rng.random_range(0..=s1.len() - l1);
        let j = rng.random_range(0..=s2.len() - l2);
        let (mut a, mut b) = (Vec::new(), Vec::new());
        crossed(s1, s2, i, l1, j, l2, &mut a, &mut b);
        Some(vec![(r1, a), (r2, b)])
    }
}

impl RouteMoves for TwoOptStar {
    fn scan<F>(&self, routes: &[Vec<usize>], mut visit: F)
    where
        F: FnMut(&[(usize, &[usize])]) -> bool,
    {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        for r1 in 0..routes.len() {
            for r2 in r1 + 1..routes.len() {
                let (s1, s2) = (&routes[r1], &routes[r2]);
                let (n1, n2) = (s1.len(), s2.len());
                for i in 0..=n1 {
                    for j in 0..=n2 {
                        // Whole-route swaps only relabel the routes
                        if (i == 0 && j == 0) || (i == n1 && j == n2) {
                            continue;
                        }
                        tails_swapped(s1, s2, i, j, &mut a, &mut b);
                        if visit(&[(r1, a.as_slice()), (r2, b.as_slice())]) {
                            return;
                        }
                    }
                }
            }
        }
    }

    fn sample<R: Rng>(&self, routes: &[Vec<usize>], rng: &mut R) -> Option<Vec<RouteChange>> {
        let (r1, r2) = ordered(two_routes(&routes_with_len(routes, 1), rng)?);
        let (s1, s2) = (&routes[r1], &routes[r2]);
        let (n1, n2) = (s1.len(), s2.len());
        let (i, j) = loop {
            let i = rng.random_range(0..=n1);
            let j = rng.random_range(0..=n2);
            if !((i == 0 && j == 0) || (i == n1 && j == n2)) {
                break (i, j);
            }
        };
        let (mut a, mut b) = (Vec::new(), Vec::new());
        tails_swapped(s1, s2, i, j, &mut a, &mut b);
        Some(vec![(r1, a), (r2, b)])
    }
}

impl RouteMoves for SwapCustomers {
    fn scan<F>(&self, routes: &[Vec<usize>], mut visit: F)
    where
        F: FnMut(&[(usize, &[usize])]) -> bool,
    {
        for r1 in 0..routes.len() {
            for r2 in r1 + 1..routes.len() {
                let mut a = routes[r1].clone();
                let mut b = routes[r2].clone();
                for i in 0..a.len() {
                    for j in 0..b.len() {
                        std::mem::swap(&mut a[i], &mut b[j]);
                        let stop = visit(&[(r1, a.as_slice()), (r2, b.as_slice())]);
                        std::mem::swap(&mut a[i], &mut b[j]);
                        if stop {
                            return;
                        }
                    }
                }
            }
        }
    }

    fn sample<R: Rng>(&self, routes: &[Vec<usize>], rng: &mut R) -> Option<Vec<RouteChange>> {
        let (r1, r2) = ordered(two_routes(&routes_with_len(routes, 1), rng)?);
        let mut a = routes[r1].clone();
        let mut b = routes[r2].clone();
        let i = rng.random_range(0..a.len());
        let j = rng.random_range(0..b.len());
        std::mem::swap(&mut a[i], &mut b[j]);
        Some(vec![(r1, a), (r2, b)])
    }
}
