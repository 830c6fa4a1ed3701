//! 1-D adaptive search: the per-dimension wrapper plus a default heuristic.
//!
//! The hierarchical driver owns two fully independent instances of
//! [`AdaptiveSearchState`], one per regularization level. They interact only
//! indirectly: both current trial values are re-submitted to the fold
//! evaluator on every iteration, whichever dimension last advanced.

use crate::types::{AggregateStatistic, DimensionTag, SearchDimension};

/// One proposal from a 1-D search heuristic.
#[derive(Debug, Clone, Copy)]
pub struct SearchStep {
    /// False once the heuristic considers this dimension converged.
    pub should_continue: bool,
    /// Next trial value, or the final value when `should_continue` is false.
    pub next_value: f64,
}

/// Contract of a 1-D adaptive search heuristic over a noisy unimodal
/// objective. Observations arrive through `tried`; each `step` proposes the
/// next trial from the complete history so far.
pub trait UnimodalSearch {
    fn tried(&mut self, value: f64, mean: f64, std_dev: f64);
    fn step(&mut self) -> SearchStep;
}

/// One search dimension together with its heuristic instance.
pub struct AdaptiveSearchState<S> {
    dimension: SearchDimension,
    searcher: S,
}

impl<S: UnimodalSearch> AdaptiveSearchState<S> {
    pub fn new(tag: DimensionTag, initial_value: f64, searcher: S) -> Self {
        Self {
            dimension: SearchDimension::new(tag, initial_value),
            searcher,
        }
    }

    pub fn tag(&self) -> DimensionTag {
        self.dimension.tag
    }

    pub fn trial_value(&self) -> f64 {
        self.dimension.trial_value
    }

    pub fn finished(&self) -> bool {
        self.dimension.finished
    }

    pub fn dimension(&self) -> SearchDimension {
        self.dimension
    }

    /// Records this iteration's statistic against the current trial value and
    /// adopts the heuristic's next proposal. A `should_continue == false`
    /// proposal fixes the dimension's final value; callers must not advance a
    /// finished dimension again.
    pub fn advance(&mut self, stat: AggregateStatistic) -> SearchStep {
        debug_assert!(!self.dimension.finished);
        self.searcher
            .tried(self.dimension.trial_value, stat.mean, stat.std_dev);
        let next = self.searcher.step();
        self.dimension.trial_value = next.next_value;
        if !next.should_continue {
            self.dimension.finished = true;
        }
        log::info!(
            "[CV] next {:?} point at {:.6e} (continue: {})",
            self.dimension.tag,
            next.next_value,
            next.should_continue
        );
        next
    }
}

/// One recorded observation of a search heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub value: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// Default [`UnimodalSearch`] heuristic: log-scale bracketing of a noisy
/// unimodal maximum.
///
/// While the best observed value sits at an edge of the tried range, the
/// range is expanded past that edge by a fixed log step. Once the best value
/// is interior, the bracket around it is narrowed by bisecting the wider
/// neighbouring log-gap. The search stops when the bracket is tighter than
/// twice `min_resolution` in log space or when the trial budget is
/// exhausted, and proposes the best observed value as final.
pub struct LogBracketSearch {
    max_trials: usize,
    min_resolution: f64,
    log_step: f64,
    // Kept sorted by value; one entry per distinct trial value.
    history: Vec<Observation>,
}

impl LogBracketSearch {
    pub fn new(max_trials: usize, min_resolution: f64, log_step: f64) -> Self {
        Self {
            max_trials,
            min_resolution,
            log_step,
            history: Vec::with_capacity(max_trials),
        }
    }

    /// Observations so far, ordered by trial value.
    pub fn history(&self) -> &[Observation] {
        &self.history
    }

    fn best_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, obs) in self.history.iter().enumerate() {
            match best {
                Some(b) if self.history[b].mean >= obs.mean => {}
                _ => best = Some(i),
            }
        }
        best
    }
}

impl Default for LogBracketSearch {
    /// The contract configuration: 10 trials, 0.01 log resolution, steps of
    /// ln 1.5.
    fn default() -> Self {
        Self::new(10, 0.01, 1.5_f64.ln())
    }
}

fn log_midpoint(a: f64, b: f64) -> f64 {
    (0.5 * (a.ln() + b.ln())).exp()
}

impl UnimodalSearch for LogBracketSearch {
    fn tried(&mut self, value: f64, mean: f64, std_dev: f64) {
        let obs = Observation {
            value,
            mean,
            std_dev,
        };
        match self
            .history
            .binary_search_by(|probe| probe.value.total_cmp(&value))
        {
            Ok(i) => self.history[i] = obs,
            Err(i) => self.history.insert(i, obs),
        }
    }

    fn step(&mut self) -> SearchStep {
        let best = match self.best_index() {
            Some(i) => i,
            // No observations to react to; nothing sensible to propose.
            None => {
                return SearchStep {
                    should_continue: false,
                    next_value: 0.0,
                };
            }
        };
        let best_value = self.history[best].value;

        if self.history.len() >= self.max_trials {
            return SearchStep {
                should_continue: false,
                next_value: best_value,
            };
        }

        // Expand past whichever edge the maximum still sits on. A lone seed
        // observation counts as the right edge, so the first move is upward.
        if best == self.history.len() - 1 {
            return SearchStep {
                should_continue: true,
                next_value: (best_value.ln() + self.log_step).exp(),
            };
        }
        if best == 0 {
            return SearchStep {
                should_continue: true,
                next_value: (best_value.ln() - self.log_step).exp(),
            };
        }

        let left = self.history[best - 1].value;
        let right = self.history[best + 1].value;
        if right.ln() - left.ln() <= 2.0 * self.min_resolution {
            return SearchStep {
                should_continue: false,
                next_value: best_value,
            };
        }
        let left_gap = best_value.ln() - left.ln();
        let right_gap = right.ln() - best_value.ln();
        let next_value = if left_gap > right_gap {
            log_midpoint(left, best_value)
        } else {
            log_midpoint(best_value, right)
        };
        SearchStep {
            should_continue: true,
            next_value,
        }
    }
}
