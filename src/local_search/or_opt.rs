//! Intra-route Or-opt and relocate.
//!
//! # Algorithm
//!
//! Or-opt moves a segment of consecutive customers to another position in
//! the same route, keeping its orientation. Relocate is the single-customer
//! case.
//!
//! # Complexity
//!
//! O(n² · s) moves per route, s = number of segment lengths.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Regional Blood Banking", PhD thesis,
//! Northwestern University.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::routing::{routes_with_len, RouteChange, RouteMoves};

/// Relocation of segments of 2 or 3 customers within their route.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrOpt;

/// Relocation of a single customer within its route.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relocate;

/// Moves `seq[from..from + len]` so that it starts at `to` in the sequence
/// left after removing it.
fn moved_segment(seq: &[usize], from: usize, len: usize, to: usize, rest: &mut Vec<usize>, out: &mut Vec<usize>) {
    rest.clear();
    rest.extend_from_slice(&seq[..from]);
    rest.extend_from_slice(&seq[from + len..]);
    out.clear();
    out.extend_from_slice(&rest[..to]);
    out.extend_from_slice(&seq[from..from + len]);
    out.extend_from_slice(&rest[to..]);
}

fn scan_segments<F>(routes: &[Vec<usize>], min_len: usize, max_len: usize, mut visit: F)
where
    F: FnMut(&[(usize, &[usize])]) -> bool,
{
    let mut rest = Vec::new();
    let mut buf = Vec::new();
    for (r, seq) in routes.iter().enumerate() {
        let n = seq.len();
        for len in min_len..=max_len.min(n.saturating_sub(1)) {
            for from in 0..=n - len {
                for to in 0..=n - len {
                    if to == from {
                        continue;
                    }
                    moved_segment(seq, from, len, to, &mut rest, &mut buf);
                    if visit(&[(r, buf.as_slice())]) {
                        return;
                    }
                }
            }
        }
    }
}

fn sample_segment<R: Rng>(
    routes: &[Vec<usize>],
    min_len: usize,
    max_len: usize,
    rng: &mut R,
) -> Option<Vec<RouteChange>> {
    let &r = routes_with_len(routes, min_len + 1).choose(rng)?;
    let seq = &routes[r];
    let n = seq.len();
    let len = rng.random_range(min_len..=max_len.min(n - 1));
    let from = rng.random_range(0..=n - len);
    let mut to = rng.random_range(0..n - len);
    if to >= from {
        to += 1;
    }
    let (mut rest, mut buf) = (Vec::with_capacity(n), Vec::with_capacity(n));
    moved_segment(seq, from, len, to, &mut rest, &mut buf);
    Some(vec![(r, buf)])
}

impl RouteMoves for OrOpt {
    fn scan<F>(&self, routes: &[Vec<usize>], visit: F)
    where
        F: FnMut(&[(usize, &[usize])]) -> bool,
    {
        scan_segments(routes, 2, 3, visit);
    }

    fn sample<R: Rng>(&self, routes: &[Vec<usize>], rng: &mut R) -> Option<Vec<RouteChange>> {
        sample_segment(routes, 2, 3, rng)
    }
}

impl RouteMoves for Relocate {
    fn scan<F>(&self, routes: &[Vec<usize>], visit: F)
    where
        F: FnMut(&[(usize, &[usize])]) -> bool,
    {
        scan_segments(routes, 1, 1, visit);
    }

    fn sample<R: Rng>(&self, routes: &[Vec<usize>], rng: &mut R) -> Option<Vec<RouteChange>> {
        sample_segment(routes, 1, 1, rng)
    }
}
