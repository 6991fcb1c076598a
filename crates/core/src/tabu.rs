//! Tabu search over item orderings.
//!
//! The tabu memory holds whole orderings rather than move attributes. A
//! neighbor is taken when it beats the current cost (aspiration) or when it
//! is not in the memory.

use crate::result::SearchOutcome;
use crate::search::{make_rng, swap_neighbor, BestKnown, OrderingProblem};
use rand::prelude::*;
use std::collections::VecDeque;
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for tabu search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TabuConfig {
    /// Number of recently visited orderings remembered.
    pub tenure: usize,
    /// Iteration budget.
    pub max_iterations: u64,
    /// Swaps per neighbor.
    pub neighbor_swaps: usize,
    /// RNG seed (None = entropy).
    pub seed: Option<u64>,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            tenure: 20,
            max_iterations: 100,
            neighbor_swaps: 20,
            seed: None,
        }
    }
}

impl TabuConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tabu tenure.
    pub fn with_tenure(mut self, tenure: usize) -> Self {
        self.tenure = tenure.max(1);
        self
    }

    /// Sets the maximum iterations.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the swaps per neighbor.
    pub fn with_neighbor_swaps(mut self, swaps: usize) -> Self {
        self.neighbor_swaps = swaps.max(1);
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Fixed-length FIFO of recently visited orderings.
#[derive(Debug, Clone)]
pub struct TabuList {
    entries: VecDeque<Vec<usize>>,
    tenure: usize,
}

impl TabuList {
    /// Creates an empty list holding at most `tenure` orderings.
    pub fn new(tenure: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(tenure + 1),
            tenure: tenure.max(1),
        }
    }

    /// Returns true if the ordering was visited recently.
    pub fn contains(&self, ordering: &[usize]) -> bool {
        self.entries.iter().any(|entry| entry.as_slice() == ordering)
    }

    /// Records a visit, evicting the oldest entry past the tenure.
    pub fn push(&mut self, ordering: Vec<usize>) {
        self.entries.push_back(ordering);
        while self.entries.len() > self.tenure {
            self.entries.pop_front();
        }
    }

    /// Number of remembered orderings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tabu search runner.
pub struct TabuRunner<P: OrderingProblem> {
    config: TabuConfig,
    problem: P,
}

impl<P: OrderingProblem> TabuRunner<P> {
    /// Creates a new tabu runner.
    pub fn new(config: TabuConfig, problem: P) -> Self {
        Self { config, problem }
    }

    /// Returns the wrapped problem.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Runs tabu search with an RNG built from the configured seed.
    pub fn run(&self) -> SearchOutcome {
        self.run_with_rng(&mut make_rng(self.config.seed))
    }

    /// Runs tabu search with a specific RNG.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> SearchOutcome {
        let start = Instant::now();

        let mut current = self.problem.initial_ordering();
        let mut current_cost = self.problem.evaluate(&current);
        let mut best = BestKnown::new(current.clone(), current_cost);
        let mut tabu = TabuList::new(self.config.tenure);
        let mut history = vec![current_cost];
        let mut evaluations = 1u64;
        let mut iteration = 0u64;

        while iteration < self.config.max_iterations {
            iteration += 1;

            let neighbor = swap_neighbor(&current, self.config.neighbor_swaps, rng);
            let neighbor_cost = self.problem.evaluate(&neighbor);
            evaluations += 1;

            if neighbor_cost < current_cost || !tabu.contains(&neighbor) {
                best.offer(&neighbor, neighbor_cost);
                tabu.push(neighbor.clone());
                current = neighbor;
                current_cost = neighbor_cost;
            }

            history.push(best.cost());
            log::debug!(
                "Tabu iteration {}: current={:.2}, best={:.2}, tabu_len={}",
                iteration,
                current_cost,
                best.cost(),
                tabu.len()
            );
            self.problem
                .on_iteration(iteration, current_cost, best.cost());
        }

        let (best_ordering, best_cost) = best.into_parts();
        SearchOutcome {
            best_ordering,
            best_cost,
            current_cost,
            iterations: iteration,
            evaluations,
            history,
            strategy: "TabuSearch".to_string(),
            stopped_early: false,
            elapsed: start.elapsed(),
        }
    }
}
