//! Strategy dispatch for the ordering search.

use crate::brkga::{BrkgaConfig, BrkgaRunner};
use crate::error::Result;
use crate::result::SearchOutcome;
use crate::sa::{SaConfig, SaRunner};
use crate::search::OrderingProblem;
use crate::solver::{SearchConfig, Strategy};
use crate::tabu::{TabuConfig, TabuRunner};

/// Runs the configured strategy against `problem`.
///
/// The iteration budget bounds SA and tabu iterations and GA generations.
pub fn run_search<P: OrderingProblem>(problem: P, config: &SearchConfig) -> Result<SearchOutcome> {
    config.strategy.validate()?;

    log::debug!(
        "Starting {} over {} items ({} iterations, {} swaps per neighbor)",
        config.strategy.name(),
        problem.num_items(),
        config.iterations,
        config.neighbor_swaps
    );

    let outcome = match config.strategy {
        Strategy::Annealing {
            initial_temp,
            cooling_rate,
        } => {
            let mut sa = SaConfig::new()
                .with_initial_temp(initial_temp)
                .with_cooling_rate(cooling_rate)
                .with_max_iterations(config.iterations)
                .with_neighbor_swaps(config.neighbor_swaps);
            sa.seed = config.seed;
            SaRunner::new(sa, problem).run()
        }
        Strategy::Tabu { tenure } => {
            let mut tabu = TabuConfig::new()
                .with_tenure(tenure)
                .with_max_iterations(config.iterations)
                .with_neighbor_swaps(config.neighbor_swaps);
            tabu.seed = config.seed;
            TabuRunner::new(tabu, problem).run()
        }
        Strategy::GeneticRandomKey {
            population_size,
            elite_count,
            crossover_rate,
            mutation_rate,
            stagnation_limit,
            min_generations,
        } => {
            let mut ga = BrkgaConfig::new()
                .with_population_size(population_size)
                .with_elite_count(elite_count)
                .with_crossover_rate(crossover_rate)
                .with_mutation_rate(mutation_rate)
                .with_stagnation_limit(stagnation_limit)
                .with_min_generations(min_generations)
                .with_max_generations(config.iterations);
            ga.seed = config.seed;
            BrkgaRunner::new(ga, problem).run()
        }
    };

    log::debug!(
        "{} finished: best={:.2}, evaluations={}, {}ms",
        outcome.strategy,
        outcome.best_cost,
        outcome.evaluations,
        outcome.elapsed_ms()
    );
    Ok(outcome)
}
