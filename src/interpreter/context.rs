//! Mutable state of one run.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use super::trace::{Trace, TraceListener, TraceRecord};
use crate::evaluation::Fitness;
use crate::models::Problem;
use crate::solution::Solution;

/// Run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Loop passes, at any nesting level.
    pub iterations: usize,
    /// Solutions produced by operators, local-search steps included.
    pub evaluations: usize,
    /// Times the best-so-far solution improved.
    pub improvements: usize,
    /// Passes since the best last improved.
    pub since_improvement: usize,
}

/// Acceptance details of the last local search, reported by the next
/// trace record.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Decision {
    pub accepted: Option<bool>,
    pub delta_e: Option<f64>,
    pub temperature: Option<f64>,
}

/// State threaded through one interpretation: the problem, the seeded RNG,
/// current and best solutions, counters and the trace.
pub struct ExecutionContext<'a> {
    problem: &'a Problem,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) current: Option<Solution>,
    best: Option<Solution>,
    pub(crate) counters: Counters,
    /// Whether the previous pass or top-level statement improved the
    /// current solution.
    pub(crate) last_improved: bool,
    pub(crate) decision: Decision,
    start: Instant,
    trace: Trace,
    listener: Option<&'a mut dyn TraceListener>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(problem: &'a Problem, seed: u64) -> Self {
        Self {
            problem,
            rng: ChaCha8Rng::seed_from_u64(seed),
            current: None,
            best: None,
            counters: Counters::default(),
            last_improved: false,
            decision: Decision::default(),
            start: Instant::now(),
            trace: Trace::new(),
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: &'a mut dyn TraceListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    pub fn current(&self) -> Option<&Solution> {
        self.current.as_ref()
    }

    pub fn best(&self) -> Option<&Solution> {
        self.best.as_ref()
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn current_fitness(&self) -> Option<Fitness> {
        self.current.as_ref().map(Solution::fitness)
    }

    pub fn best_fitness(&self) -> Option<Fitness> {
        self.best.as_ref().map(Solution::fitness)
    }

    /// `Stagnation(k)` predicate.
    pub fn is_stagnating(&self, k: u32) -> bool {
        self.counters.since_improvement >= k as usize
    }

    /// Installs `solution` as current and promotes it to best when it is
    /// strictly better.
    pub(crate) fn set_current(&mut self, solution: Solution) {
        self.counters.evaluations += 1;
        let better = match &self.best {
            None => true,
            Some(best) => solution.is_better_than(best),
        };
        if better {
            self.best = Some(solution.clone());
            self.counters.improvements += 1;
        }
        self.current = Some(solution);
    }

    /// Appends one trace record and notifies the listener.
    pub(crate) fn record(&mut self, error: Option<String>) {
        let decision = std::mem::take(&mut self.decision);
        let record = TraceRecord {
            iter: self.trace.len(),
            current_fitness: self.current_fitness().map(|f| f.scalar()),
            best_fitness: self.best_fitness().map(|f| f.scalar()),
            elapsed_s: self.elapsed().as_secs_f64(),
            accepted: decision.accepted,
            delta_e: decision.delta_e,
            temperature: decision.temperature,
            error,
        };
        if let Some(listener) = self.listener.as_deref_mut() {
            listener.on_record(&record);
        }
        self.trace.push(record);
    }

    pub(crate) fn into_parts(self) -> (Option<Solution>, Trace, Counters) {
        (self.best, self.trace, self.counters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, KnapsackProblem};
    use crate::solution::KnapsackAssignment;

    fn problem() -> Problem {
        KnapsackProblem::new(vec![Item { value: 5, weight: 2 }, Item { value: 3, weight: 2 }], 3)
            .expect("valid")
            .into()
    }

    #[test]
    fn test_best_tracks_strict_improvements() {
        let p = problem();
        let k = p.as_knapsack().expect("knapsack");
        let mut ctx = ExecutionContext::new(&p, 0);
        ctx.set_current(KnapsackAssignment::from_selection(k, vec![false, true]).into());
        ctx.set_current(KnapsackAssignment::from_selection(k, vec![true, false]).into());
        ctx.set_current(KnapsackAssignment::from_selection(k, vec![true, true]).into());
        assert_eq!(ctx.counters().improvements, 2);
        assert_eq!(ctx.counters().evaluations, 3);
        let best = ctx.best().and_then(Solution::as_knapsack).expect("best");
        assert_eq!(best.value(), 5);
        assert!(!ctx.current().map(Solution::is_feasible).unwrap_or(true));
    }

    #[test]
    fn test_record_drains_decision() {
        let p = problem();
        let mut ctx = ExecutionContext::new(&p, 0);
        ctx.decision = Decision {
            accepted: Some(true),
            delta_e: Some(-1.0),
            temperature: Some(2.0),
        };
        ctx.record(None);
        ctx.record(None);
        let records = ctx.trace().records();
        assert_eq!(records[0].accepted, Some(true));
        assert_eq!(records[0].current_fitness, None);
        assert_eq!(records[1].iter, 1);
        assert_eq!(records[1].accepted, None);
    }

    #[test]
    fn test_listener_sees_every_record() {
        let p = problem();
        let mut seen = 0;
        let mut listener = |_: &TraceRecord| seen += 1;
        {
            let mut ctx = ExecutionContext::new(&p, 0).with_listener(&mut listener);
            ctx.record(None);
            ctx.record(None);
        }
        assert_eq!(seen, 2);
    }
}
