//! Knapsack neighborhoods.
//!
//! Every move is priced from cached totals through
//! [`KnapsackAssignment::score`], so a full scan never clones the bitmap.

use rand::seq::IndexedRandom;
use rand::Rng;

use super::Neighborhood;
use crate::constructive::fill_from;
use crate::evaluation::Fitness;
use crate::models::KnapsackProblem;
use crate::solution::KnapsackAssignment;

/// Number of items considered on each side by [`TwoExchange`].
const TWO_EXCHANGE_POOL: usize = 16;

/// Tracks the best move seen during a scan.
struct BestMove<M> {
    base: Fitness,
    found: Option<(M, Fitness)>,
}

impl<M> BestMove<M> {
    fn new(base: Fitness) -> Self {
        Self { base, found: None }
    }

    /// Records `mv` if it beats everything so far; returns `true` if kept.
    fn offer(&mut self, mv: M, fit: Fitness) -> bool {
        let bar = self.found.as_ref().map_or(self.base, |(_, f)| *f);
        if fit < bar {
            self.found = Some((mv, fit));
            true
        } else {
            false
        }
    }

    fn into_move(self) -> Option<M> {
        self.found.map(|(mv, _)| mv)
    }
}

/// Totals after removing `out` and adding `inn`.
fn exchanged(a: &KnapsackAssignment, problem: &KnapsackProblem, out: &[usize], inn: &[usize]) -> (u64, u64) {
    let w = a.weight() - out.iter().map(|&i| problem.weight(i)).sum::<u64>()
        + inn.iter().map(|&i| problem.weight(i)).sum::<u64>();
    let v = a.value() - out.iter().map(|&i| problem.value(i)).sum::<u64>()
        + inn.iter().map(|&i| problem.value(i)).sum::<u64>();
    (w, v)
}

fn apply_exchange(a: &KnapsackAssignment, problem: &KnapsackProblem, out: &[usize], inn: &[usize]) -> KnapsackAssignment {
    let mut next = a.clone();
    for &i in out.iter().chain(inn) {
        next.flip(problem, i);
    }
    next
}

/// Flip any single item.
pub struct FlipBestItem<'a> {
    problem: &'a KnapsackProblem,
}

impl<'a> FlipBestItem<'a> {
    pub fn new(problem: &'a KnapsackProblem) -> Self {
        Self { problem }
    }
}

impl Neighborhood for FlipBestItem<'_> {
    type Solution = KnapsackAssignment;

    fn improving(&self, current: &KnapsackAssignment, first: bool) -> Option<KnapsackAssignment> {
        let mut best = BestMove::new(current.fitness());
        for i in 0..current.len() {
            let (w, v) = if current.is_selected(i) {
                exchanged(current, self.problem, &[i], &[])
            } else {
                exchanged(current, self.problem, &[], &[i])
            };
            if best.offer(i, current.score(w, v)) && first {
                break;
            }
        }
        best.into_move().map(|i| {
            let mut next = current.clone();
            next.flip(self.problem, i);
            next
        })
    }

    fn random<R: Rng>(&self, current: &KnapsackAssignment, rng: &mut R) -> Option<KnapsackAssignment> {
        if current.is_empty() {
            return None;
        }
        let mut next = current.clone();
        next.flip(self.problem, rng.random_range(0..current.len()));
        Some(next)
    }
}

/// Drop one selected item, then refill greedily by ratio without it.
///
/// Candidates are tried from the worst ratio up.
pub struct FlipWorstItem<'a> {
    problem: &'a KnapsackProblem,
}

impl<'a> FlipWorstItem<'a> {
    pub fn new(problem: &'a KnapsackProblem) -> Self {
        Self { problem }
    }

    fn drop_and_refill(&self, current: &KnapsackAssignment, i: usize) -> KnapsackAssignment {
        let mut next = current.clone();
        next.deselect(self.problem, i);
        let order: Vec<usize> = self
            .problem
            .ratio_order()
            .iter()
            .copied()
            .filter(|&j| j != i)
            .collect();
        fill_from(self.problem, &mut next, &order);
        next
    }
}

impl Neighborhood for FlipWorstItem<'_> {
    type Solution = KnapsackAssignment;

    fn improving(&self, current: &KnapsackAssignment, first: bool) -> Option<KnapsackAssignment> {
        let mut best = BestMove::new(current.fitness());
        for &i in self.problem.ratio_order().iter().rev() {
            if !current.is_selected(i) {
                continue;
            }
            let next = self.drop_and_refill(current, i);
            let fit = next.fitness();
            if best.offer(next, fit) && first {
                break;
            }
        }
        best.into_move()
    }

    fn random<R: Rng>(&self, current: &KnapsackAssignment, rng: &mut R) -> Option<KnapsackAssignment> {
        let &i = current.selected_items().choose(rng)?;
        Some(self.drop_and_refill(current, i))
    }
}

/// Swap one selected item for one unselected item.
pub struct OneExchange<'a> {
    problem: &'a KnapsackProblem,
}

impl<'a> OneExchange<'a> {
    pub fn new(problem: &'a KnapsackProblem) -> Self {
        Self { problem }
    }
}

impl Neighborhood for OneExchange<'_> {
    type Solution = KnapsackAssignment;

    fn improving(&self, current: &KnapsackAssignment, first: bool) -> Option<KnapsackAssignment> {
        let selected = current.selected_items();
        let unselected = current.unselected_items();
        let mut best = BestMove::new(current.fitness());
        'scan: for &i in &selected {
            for &j in &unselected {
                let (w, v) = exchanged(current, self.problem, &[i], &[j]);
                if best.offer((i, j), current.score(w, v)) && first {
                    break 'scan;
                }
            }
        }
        best.into_move()
            .map(|(i, j)| apply_exchange(current, self.problem, &[i], &[j]))
    }

    fn random<R: Rng>(&self, current: &KnapsackAssignment, rng: &mut R) -> Option<KnapsackAssignment> {
        let &i = current.selected_items().choose(rng)?;
        let &j = current.unselected_items().choose(rng)?;
        Some(apply_exchange(current, self.problem, &[i], &[j]))
    }
}

/// 1↔2, 2↔1 and 2↔2 exchanges between the worst-ratio selected items and
/// the best-ratio unselected items.
pub struct TwoExchange<'a> {
    problem: &'a KnapsackProblem,
}

impl<'a> TwoExchange<'a> {
    pub fn new(problem: &'a KnapsackProblem) -> Self {
        Self { problem }
    }

    /// Worst selected and best unselected items, at most
    /// [`TWO_EXCHANGE_POOL`] each.
    fn pools(&self, current: &KnapsackAssignment) -> (Vec<usize>, Vec<usize>) {
        let order = self.problem.ratio_order();
        let worst_in = order
            .iter()
            .rev()
            .copied()
            .filter(|&i| current.is_selected(i))
            .take(TWO_EXCHANGE_POOL)
            .collect();
        let best_out = order
            .iter()
            .copied()
            .filter(|&i| !current.is_selected(i))
            .take(TWO_EXCHANGE_POOL)
            .collect();
        (worst_in, best_out)
    }
}

fn pairs(items: &[usize]) -> Vec<[usize; 2]> {
    let mut out = Vec::with_capacity(items.len() * items.len().saturating_sub(1) / 2);
    for (x, &a) in items.iter().enumerate() {
        for &b in &items[x + 1..] {
            out.push([a, b]);
        }
    }
    out
}

impl Neighborhood for TwoExchange<'_> {
    type Solution = KnapsackAssignment;

    fn improving(&self, current: &KnapsackAssignment, first: bool) -> Option<KnapsackAssignment> {
        let (ins, outs) = self.pools(current);
        let singles_in: Vec<Vec<usize>> = ins.iter().map(|&i| vec![i]).collect();
        let singles_out: Vec<Vec<usize>> = outs.iter().map(|&j| vec![j]).collect();
        let pairs_in: Vec<Vec<usize>> = pairs(&ins).into_iter().map(Vec::from).collect();
        let pairs_out: Vec<Vec<usize>> = pairs(&outs).into_iter().map(Vec::from).collect();

        let shapes: [(&[Vec<usize>], &[Vec<usize>]); 3] = [
            (singles_in.as_slice(), pairs_out.as_slice()),
            (pairs_in.as_slice(), singles_out.as_slice()),
            (pairs_in.as_slice(), pairs_out.as_slice()),
        ];

        let mut best = BestMove::new(current.fitness());
        'scan: for (removed, added) in shapes {
            for out in removed {
                for inn in added {
                    let (w, v) = exchanged(current, self.problem, out, inn);
                    if best.offer((out, inn), current.score(w, v)) && first {
                        break 'scan;
                    }
                }
            }
        }
        best.into_move()
            .map(|(out, inn)| apply_exchange(current, self.problem, out, inn))
    }

    fn random<R: Rng>(&self, current: &KnapsackAssignment, rng: &mut R) -> Option<KnapsackAssignment> {
        let (ins, outs) = self.pools(current);
        let mut shapes = Vec::with_capacity(3);
        if !ins.is_empty() && outs.len() >= 2 {
            shapes.push((1, 2));
        }
        if ins.len() >= 2 && !outs.is_empty() {
            shapes.push((2, 1));
        }
        if ins.len() >= 2 && outs.len() >= 2 {
            shapes.push((2, 2));
        }
        let &(k_out, k_in) = shapes.choose(rng)?;
        let out: Vec<usize> = ins.choose_multiple(rng, k_out).copied().collect();
        let inn: Vec<usize> = outs.choose_multiple(rng, k_in).copied().collect();
        Some(apply_exchange(current, self.problem, &out, &inn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;

    fn problem() -> KnapsackProblem {
        KnapsackProblem::new(
            vec![
                Item { value: 10, weight: 5 },
                Item { value: 40, weight: 4 },
                Item { value: 30, weight: 6 },
                Item { value: 50, weight: 3 },
            ],
            10,
        )
        .expect("valid")
    }

    fn select(p: &KnapsackProblem, items: &[usize]) -> KnapsackAssignment {
        let mut sel = vec![false; p.num_items()];
        for &i in items {
            sel[i] = true;
        }
        KnapsackAssignment::from_selection(p, sel)
    }

    #[test]
    fn test_flip_best_removes_overweight() {
        let p = problem();
        let a = select(&p, &[0, 1, 2, 3]);
        let next = FlipBestItem::new(&p).improving(&a, false).expect("improving");
        // Dropping the 6-weight item leaves 12; dropping 0 leaves 13
        assert_eq!(next.selected_items(), vec![0, 1, 3]);
    }

    #[test]
    fn test_flip_worst_refills() {
        let p = problem();
        // {0, 3}: value 60, weight 8; dropping 0 lets 1 in: {1, 3} = 90
        let a = select(&p, &[0, 3]);
        let next = FlipWorstItem::new(&p).improving(&a, false).expect("improving");
        assert_eq!(next.selected_items(), vec![1, 3]);
        assert_eq!(next.value(), 90);
    }

    #[test]
    fn test_one_exchange() {
        let p = problem();
        // {2, 3}: value 80, weight 9; swapping 2 for 1 gives 90
        let a = select(&p, &[2, 3]);
        let next = OneExchange::new(&p).improving(&a, false).expect("improving");
        assert_eq!(next.value(), 90);
        assert!(next.is_feasible());
    }

    #[test]
    fn test_two_exchange_two_for_one() {
        let p = KnapsackProblem::new(
            vec![
                Item { value: 6, weight: 5 },
                Item { value: 6, weight: 5 },
                Item { value: 13, weight: 10 },
            ],
            10,
        )
        .expect("valid");
        let a = select(&p, &[0, 1]);
        assert!(OneExchange::new(&p).improving(&a, false).is_none());
        let next = TwoExchange::new(&p).improving(&a, false).expect("improving");
        assert_eq!(next.selected_items(), vec![2]);
    }

    #[test]
    fn test_local_optimum() {
        let p = problem();
        let a = select(&p, &[1, 3]);
        assert!(FlipBestItem::new(&p).improving(&a, false).is_none());
        assert!(OneExchange::new(&p).improving(&a, false).is_none());
        assert!(TwoExchange::new(&p).improving(&a, false).is_none());
    }
}
