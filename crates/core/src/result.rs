//! Search outcome representation.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of an ordering search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchOutcome {
    /// Best ordering found (indices into the caller's item list).
    pub best_ordering: Vec<usize>,

    /// Cost of `best_ordering`.
    pub best_cost: f64,

    /// Cost of the search's current state when it stopped.
    ///
    /// For the genetic strategy this is the best cost of the last population.
    pub current_cost: f64,

    /// Iterations (or generations) actually performed.
    pub iterations: u64,

    /// Number of fitness oracle calls, including the initial ordering.
    pub evaluations: u64,

    /// Best cost after the initial evaluation and after every iteration.
    pub history: Vec<f64>,

    /// Strategy used for the search.
    pub strategy: String,

    /// Whether the genetic strategy stopped on stagnation.
    pub stopped_early: bool,

    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl SearchOutcome {
    /// Creates an outcome for a search that never left its starting point.
    pub fn unmoved(ordering: Vec<usize>, cost: f64, strategy: impl Into<String>) -> Self {
        Self {
            best_ordering: ordering,
            best_cost: cost,
            current_cost: cost,
            iterations: 0,
            evaluations: 1,
            history: vec![cost],
            strategy: strategy.into(),
            stopped_early: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Cost reduction relative to the first recorded cost.
    pub fn improvement(&self) -> f64 {
        self.history
            .first()
            .map(|first| first - self.best_cost)
            .unwrap_or(0.0)
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}
