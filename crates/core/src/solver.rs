//! Solver traits and search configuration.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordering search strategy.
///
/// Every variant optimizes the same decision variable (the item ordering fed
/// to the packing engine) against the same fitness oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    /// Simulated annealing with geometric cooling applied every iteration.
    Annealing {
        /// Starting temperature.
        initial_temp: f64,
        /// Multiplier applied to the temperature after each iteration.
        cooling_rate: f64,
    },
    /// Tabu search over recently visited orderings.
    Tabu {
        /// Maximum number of orderings kept in the tabu list.
        tenure: usize,
    },
    /// Random-key genetic search with roulette selection.
    GeneticRandomKey {
        /// Number of individuals per generation.
        population_size: usize,
        /// Individuals copied unchanged into the next generation.
        elite_count: usize,
        /// Probability that an offspring is produced by crossover.
        crossover_rate: f64,
        /// Probability that an offspring receives a swap mutation.
        mutation_rate: f64,
        /// Generations without improvement before stopping early.
        stagnation_limit: u32,
        /// Early stopping is never allowed before this generation.
        min_generations: u32,
    },
}

impl Default for Strategy {
    fn default() -> Self {
        Self::annealing()
    }
}

impl Strategy {
    /// Simulated annealing with the default schedule (T0 = 10000, alpha = 0.995).
    pub fn annealing() -> Self {
        Self::Annealing {
            initial_temp: 10_000.0,
            cooling_rate: 0.995,
        }
    }

    /// Tabu search with a tenure of 20.
    pub fn tabu() -> Self {
        Self::Tabu { tenure: 20 }
    }

    /// Random-key genetic search with small-population defaults.
    pub fn genetic_random_key() -> Self {
        Self::GeneticRandomKey {
            population_size: 10,
            elite_count: 2,
            crossover_rate: 0.8,
            mutation_rate: 0.2,
            stagnation_limit: 5,
            min_generations: 5,
        }
    }

    /// Human readable strategy name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Annealing { .. } => "SimulatedAnnealing",
            Self::Tabu { .. } => "TabuSearch",
            Self::GeneticRandomKey { .. } => "GeneticRandomKey",
        }
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Annealing {
                initial_temp,
                cooling_rate,
            } => {
                if !(initial_temp.is_finite() && initial_temp > 0.0) {
                    return Err(Error::ConfigError(format!(
                        "initial temperature must be positive, got {initial_temp}"
                    )));
                }
                if !(cooling_rate > 0.0 && cooling_rate <= 1.0) {
                    return Err(Error::ConfigError(format!(
                        "cooling rate must lie in (0, 1], got {cooling_rate}"
                    )));
                }
            }
            Self::Tabu { tenure } => {
                if tenure == 0 {
                    return Err(Error::ConfigError("tabu tenure must be at least 1".into()));
                }
            }
            Self::GeneticRandomKey {
                population_size,
                elite_count,
                crossover_rate,
                mutation_rate,
                ..
            } => {
                if population_size < 2 {
                    return Err(Error::ConfigError(format!(
                        "population size must be at least 2, got {population_size}"
                    )));
                }
                if elite_count >= population_size {
                    return Err(Error::ConfigError(format!(
                        "elite count {elite_count} must be smaller than population size {population_size}"
                    )));
                }
                for (name, rate) in [("crossover", crossover_rate), ("mutation", mutation_rate)] {
                    if !(0.0..=1.0).contains(&rate) {
                        return Err(Error::ConfigError(format!(
                            "{name} rate must lie in [0, 1], got {rate}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Common configuration for the ordering search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchConfig {
    /// Strategy and its parameters.
    pub strategy: Strategy,

    /// Iteration budget (generations for the genetic strategy). Hard bound.
    pub iterations: u64,

    /// Random pairwise swaps applied to produce one neighbor.
    pub neighbor_swaps: usize,

    /// RNG seed (None = seeded from entropy).
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            iterations: 50,
            neighbor_swaps: 20,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the iteration budget.
    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the number of swaps per neighbor.
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

/// Trait for placement engines.
///
/// Implemented by the heuristic packer and by external exact solvers; both
/// consume the same item/container records and produce the same solution
/// schema. Items are processed in slice order.
pub trait Solver {
    /// The item type this solver handles.
    type Item;
    /// The container type this solver handles.
    type Container;
    /// The solution record produced.
    type Solution;

    /// Assigns items to containers.
    fn solve(&self, items: &[Self::Item], containers: &[Self::Container])
        -> Result<Self::Solution>;
}
