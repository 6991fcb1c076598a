//! Simulated Annealing over item orderings.

use crate::result::SearchOutcome;
use crate::search::{make_rng, swap_neighbor, BestKnown, OrderingProblem};
use rand::prelude::*;
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for Simulated Annealing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SaConfig {
    /// Initial temperature.
    pub initial_temp: f64,
    /// Geometric cooling rate, applied once per iteration.
    pub cooling_rate: f64,
    /// Iteration budget.
    pub max_iterations: u64,
    /// Swaps per neighbor.
    pub neighbor_swaps: usize,
    /// RNG seed (None = entropy).
    pub seed: Option<u64>,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temp: 10_000.0,
            cooling_rate: 0.995,
            max_iterations: 50,
            neighbor_swaps: 20,
            seed: None,
        }
    }
}

impl SaConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial temperature.
    pub fn with_initial_temp(mut self, temp: f64) -> Self {
        self.initial_temp = temp.max(0.001);
        self
    }

    /// Sets the cooling rate.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate.clamp(0.001, 1.0);
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

/// Metropolis acceptance rule for a minimization problem.
///
/// Improvements are always accepted; a worse neighbor is accepted with
/// probability `exp(-delta / temperature)`.
pub fn accept_move<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    if delta < 0.0 {
        return true;
    }
    if temperature <= 0.0 {
        return false;
    }
    let probability = (-delta / temperature).exp();
    rng.gen::<f64>() < probability
}

/// Simulated Annealing runner.
pub struct SaRunner<P: OrderingProblem> {
    config: SaConfig,
    problem: P,
}

impl<P: OrderingProblem> SaRunner<P> {
    /// Creates a new SA runner.
    pub fn new(config: SaConfig, problem: P) -> Self {
        Self { config, problem }
    }

    /// Returns the wrapped problem.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Runs the annealing loop with an RNG built from the configured seed.
    pub fn run(&self) -> SearchOutcome {
        self.run_with_rng(&mut make_rng(self.config.seed))
    }

    /// Runs the annealing loop with a specific RNG.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> SearchOutcome {
        let start = Instant::now();

        let mut current = self.problem.initial_ordering();
        let mut current_cost = self.problem.evaluate(&current);
        let mut best = BestKnown::new(current.clone(), current_cost);
        let mut history = vec![current_cost];
        let mut evaluations = 1u64;

        let mut temperature = self.config.initial_temp;
        let mut iteration = 0u64;

        while iteration < self.config.max_iterations {
            iteration += 1;

            let neighbor = swap_neighbor(&current, self.config.neighbor_swaps, rng);
            let neighbor_cost = self.problem.evaluate(&neighbor);
            evaluations += 1;

            if accept_move(neighbor_cost - current_cost, temperature, rng) {
                current = neighbor;
                current_cost = neighbor_cost;
                best.offer(&current, current_cost);
            }

            temperature *= self.config.cooling_rate;
            history.push(best.cost());

            log::debug!(
                "SA iteration {}: temp={:.4}, current={:.2}, best={:.2}",
                iteration,
                temperature,
                current_cost,
                best.cost()
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
            strategy: "SimulatedAnnealing".to_string(),
            stopped_early: false,
            elapsed: start.elapsed(),
        }
    }
}
