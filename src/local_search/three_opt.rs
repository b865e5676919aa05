//! Intra-route 3-opt.
//!
//! # Algorithm
//!
//! Three cuts split a route into `A | B | C | D` with B and C non-empty
//! (A and D may be empty, in which case the depot closes the route). Seven
//! reconnections are tried:
//!
//! ```text
//! 1: A B  C' D     4: A C  B  D
//! 2: A B' C  D     5: A C  B' D
//! 3: A B' C' D     6: A C' B  D
//!                  7: A C' B' D
//! ```
//!
//! where `X'` is X reversed. Reconnections that reproduce the route (a
//! reversed single customer) are skipped.
//!
//! # Complexity
//!
//! O(n³) moves per route.
//!
//! # Reference
//!
//! Lin, S. (1965). "Computer Solutions of the Traveling Salesman Problem",
//! *Bell System Technical Journal* 44(10), 2245-2269.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::routing::{routes_with_len, RouteChange, RouteMoves};

/// Number of non-identity reconnection patterns.
const PATTERNS: u8 = 7;

/// Three-cut reconnection within one route.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeOpt;

/// Writes the reconnection `pattern` of cuts `p < q < r` into `out`.
///
/// B = `seq[p..q]`, C = `seq[q..r]`.
fn reconnect(seq: &[usize], p: usize, q: usize, r: usize, pattern: u8, out: &mut Vec<usize>) {
    let (a, b, c, d) = (&seq[..p], &seq[p..q], &seq[q..r], &seq[r..]);
    out.clear();
    out.extend_from_slice(a);
    let (first, first_rev, second, second_rev) = match pattern {
        1 => (b, false, c, true),
        2 => (b, true, c, false),
        3 => (b, true, c, true),
        4 => (c, false, b, false),
        5 => (c, false, b, true),
        6 => (c, true, b, false),
        _ => (c, true, b, true),
    };
    for (segment, rev) in [(first, first_rev), (second, second_rev)] {
        if rev {
            out.extend(segment.iter().rev());
        } else {
            out.extend_from_slice(segment);
        }
    }
    out.extend_from_slice(d);
}

/// Returns `true` if `pattern` only reverses single customers, which leaves
/// the route unchanged.
fn is_identity(pattern: u8, len_b: usize, len_c: usize) -> bool {
    match pattern {
        1 => len_c == 1,
        2 => len_b == 1,
        3 => len_b == 1 && len_c == 1,
        _ => false,
    }
}

impl RouteMoves for ThreeOpt {
    fn scan<F>(&self, routes: &[Vec<usize>], mut visit: F)
    where
        F: FnMut(&[(usize, &[usize])]) -> bool,
    {
        let mut buf = Vec::new();
        for (ri, seq) in routes.iter().enumerate() {
            let n = seq.len();
            for p in 0..n.saturating_sub(1) {
                for q in p + 1..n {
                    for r in q + 1..=n {
                        for pattern in 1..=PATTERNS {
                            if is_identity(pattern, q - p, r - q) {
                                continue;
                            }
                            reconnect(seq, p, q, r, pattern, &mut buf);
                            if visit(&[(ri, buf.as_slice())]) {
                                return;
                            }
                        }
                    }
                }
            }
        }
    }

    fn sample<R: Rng>(&self, routes: &[Vec<usize>], rng: &mut R) -> Option<Vec<RouteChange>> {
        let &ri = routes_with_len(routes, 2).choose(rng)?;
        let seq = &routes[ri];
        let n = seq.len();
        let p = rng.random_range(0..n - 1);
        let q = rng.random_range(p + 1..n);
        let r = rng.random_range(q + 1..=n);
        let candidates: Vec<u8> = (1..=PATTERNS)
            .filter(|&pat| !is_identity(pat, q - p, r - q))
            .collect();
        let &pattern = candidates.choose(rng)?;
        let mut buf = Vec::with_capacity(n);
        reconnect(seq, p, q, r, pattern, &mut buf);
        Some(vec![(ri, buf)])
    }
}
