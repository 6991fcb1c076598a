//! Random-key genetic search over item orderings.
//!
//! Each individual carries `2n` keys in [0, 1). The argsort of the first `n`
//! keys is the item ordering handed to the fitness oracle; the second half is
//! carried through crossover untouched by decoding and is available to
//! decoders that want an auxiliary per-item decision.
//!
//! A generation keeps the elite individuals unchanged and fills the rest of
//! the population with offspring of roulette-selected parents (single-point
//! crossover, then an optional single swap mutation).

use crate::result::SearchOutcome;
use crate::search::{make_rng, BestKnown, OrderingProblem};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the random-key genetic search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BrkgaConfig {
    /// Population size.
    pub population_size: usize,
    /// Individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Probability that an offspring comes from crossover rather than a copy.
    pub crossover_rate: f64,
    /// Probability that an offspring receives a swap mutation.
    pub mutation_rate: f64,
    /// Maximum number of generations.
    pub max_generations: u64,
    /// Generations without improvement before early stop.
    pub stagnation_limit: u32,
    /// Early stop is not considered before this generation.
    pub min_generations: u32,
    /// RNG seed (None = entropy).
    pub seed: Option<u64>,
}

impl Default for BrkgaConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            elite_count: 2,
            crossover_rate: 0.8,
            mutation_rate: 0.2,
            max_generations: 50,
            stagnation_limit: 5,
            min_generations: 5,
            seed: None,
        }
    }
}

impl BrkgaConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self.elite_count = self.elite_count.min(self.population_size - 1);
        self
    }

    /// Sets the number of elite individuals.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count.min(self.population_size.saturating_sub(1));
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the maximum generations.
    pub fn with_max_generations(mut self, generations: u64) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, limit: u32) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the minimum number of generations before early stop.
    pub fn with_min_generations(mut self, generations: u32) -> Self {
        self.min_generations = generations;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Random-key chromosome.
#[derive(Debug, Clone)]
pub struct RandomKeyChromosome {
    /// Random keys in [0, 1). The first half encodes the ordering.
    pub keys: Vec<f64>,
    /// Cached cost (lower is better), None until evaluated.
    cost: Option<f64>,
}

impl RandomKeyChromosome {
    /// Creates a random chromosome with `2 * num_items` keys.
    pub fn random<R: Rng + ?Sized>(num_items: usize, rng: &mut R) -> Self {
        let keys: Vec<f64> = (0..2 * num_items).map(|_| rng.gen::<f64>()).collect();
        Self {
            keys,
            cost: None,
        }
    }

    /// Encodes an existing ordering so that `decode_as_permutation` returns it.
    ///
    /// Auxiliary keys are drawn at random.
    pub fn from_ordering<R: Rng + ?Sized>(ordering: &[usize], rng: &mut R) -> Self {
        let n = ordering.len();
        let mut keys = vec![0.0; 2 * n];
        for (position, &item) in ordering.iter().enumerate() {
            keys[item] = position as f64 / n as f64;
        }
        for key in keys.iter_mut().skip(n) {
            *key = rng.gen::<f64>();
        }
        Self {
            keys,
            cost: None,
        }
    }

    /// Number of items encoded.
    pub fn num_items(&self) -> usize {
        self.keys.len() / 2
    }

    /// Returns the cached cost, infinite when not yet evaluated.
    pub fn cost(&self) -> f64 {
        self.cost.unwrap_or(f64::INFINITY)
    }

    /// Returns true once a cost has been cached.
    pub fn is_evaluated(&self) -> bool {
        self.cost.is_some()
    }

    /// Sets the cached cost.
    pub fn set_cost(&mut self, cost: f64) {
        self.cost = Some(cost);
    }

    /// The pass-through half of the keys.
    pub fn auxiliary_keys(&self) -> &[f64] {
        &self.keys[self.num_items()..]
    }

    /// Argsort of the ordering half. Equal keys keep index order.
    pub fn decode_as_permutation(&self) -> Vec<usize> {
        let n = self.num_items();
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| {
            self.keys[a]
                .partial_cmp(&self.keys[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        indices
    }

    /// Single-point crossover: keys before `point` from `self`, the rest from `other`.
    pub fn crossover_at(&self, other: &Self, point: usize) -> Self {
        let point = point.min(self.keys.len());
        let mut keys = Vec::with_capacity(self.keys.len());
        keys.extend_from_slice(&self.keys[..point]);
        keys.extend_from_slice(&other.keys[point..]);
        Self {
            keys,
            cost: None,
        }
    }

    /// Swaps two distinct ordering keys.
    pub fn swap_mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let n = self.num_items();
        if n < 2 {
            return;
        }
        let i = rng.gen_range(0..n);
        let mut j = rng.gen_range(0..n - 1);
        if j >= i {
            j += 1;
        }
        self.keys.swap(i, j);
        self.cost = None;
    }
}

/// Fitness-proportionate selection over costs (weight `1 / (1 + cost)`).
///
/// Falls back to a uniform pick when the weights are degenerate.
pub fn roulette_select<'a, R: Rng + ?Sized>(
    population: &'a [RandomKeyChromosome],
    rng: &mut R,
) -> &'a RandomKeyChromosome {
    let weights: Vec<f64> = population
        .iter()
        .map(|c| {
            let cost = c.cost().max(0.0);
            if cost.is_finite() {
                1.0 / (1.0 + cost)
            } else {
                0.0
            }
        })
        .collect();

    match WeightedIndex::new(&weights) {
        Ok(dist) => &population[dist.sample(rng)],
        Err(_) => &population[rng.gen_range(0..population.len())],
    }
}

/// Random-key genetic search runner.
pub struct BrkgaRunner<P: OrderingProblem> {
    config: BrkgaConfig,
    problem: P,
}

impl<P: OrderingProblem> BrkgaRunner<P> {
    /// Creates a new runner.
    pub fn new(config: BrkgaConfig, problem: P) -> Self {
        Self { config, problem }
    }

    /// Returns the wrapped problem.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Runs the search with an RNG built from the configured seed.
    pub fn run(&self) -> SearchOutcome {
        self.run_with_rng(&mut make_rng(self.config.seed))
    }

    /// Runs the search with a specific RNG.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> SearchOutcome {
        let start = Instant::now();
        let n = self.problem.num_items();

        let initial = self.problem.initial_ordering();
        let initial_cost = self.problem.evaluate(&initial);
        let mut best = BestKnown::new(initial.clone(), initial_cost);
        let mut history = vec![initial_cost];
        let mut evaluations = 1u64;

        if self.config.max_generations == 0 {
            let mut outcome = SearchOutcome::unmoved(initial, initial_cost, "GeneticRandomKey");
            outcome.elapsed = start.elapsed();
            return outcome;
        }

        let population_size = self.config.population_size.max(2);
        let elite_count = self.config.elite_count.min(population_size - 1);

        // The unperturbed ordering seeds the population; its cost is known.
        let mut seed_individual = RandomKeyChromosome::from_ordering(&initial, rng);
        seed_individual.set_cost(initial_cost);
        let mut population = vec![seed_individual];
        population.extend((1..population_size).map(|_| RandomKeyChromosome::random(n, rng)));
        evaluations += self.evaluate_pending(&mut population);
        sort_by_cost(&mut population);
        best.offer(&population[0].decode_as_permutation(), population[0].cost());

        let mut stagnation = 0u32;
        let mut generation = 0u64;
        let mut stopped_early = false;

        while generation < self.config.max_generations {
            generation += 1;

            let mut next: Vec<RandomKeyChromosome> =
                population.iter().take(elite_count).cloned().collect();

            while next.len() < population_size {
                let parent_a = roulette_select(&population, rng);
                let mut child = if rng.gen::<f64>() < self.config.crossover_rate
                    && parent_a.keys.len() > 1
                {
                    let parent_b = roulette_select(&population, rng);
                    let point = rng.gen_range(1..parent_a.keys.len());
                    parent_a.crossover_at(parent_b, point)
                } else {
                    parent_a.clone()
                };
                if rng.gen::<f64>() < self.config.mutation_rate {
                    child.swap_mutate(rng);
                }
                next.push(child);
            }

            evaluations += self.evaluate_pending(&mut next);
            sort_by_cost(&mut next);
            population = next;

            let leader = &population[0];
            if best.offer(&leader.decode_as_permutation(), leader.cost()) {
                stagnation = 0;
            } else {
                stagnation += 1;
            }
            history.push(best.cost());

            log::debug!(
                "GA generation {}: generation_best={:.2}, best={:.2}, stagnation={}",
                generation,
                leader.cost(),
                best.cost(),
                stagnation
            );
            self.problem
                .on_iteration(generation, leader.cost(), best.cost());

            if stagnation >= self.config.stagnation_limit
                && generation >= u64::from(self.config.min_generations)
            {
                log::debug!("GA stopped on stagnation at generation {}", generation);
                stopped_early = true;
                break;
            }
        }

        let current_cost = population[0].cost();
        let (best_ordering, best_cost) = best.into_parts();
        SearchOutcome {
            best_ordering,
            best_cost,
            current_cost,
            iterations: generation,
            evaluations,
            history,
            strategy: "GeneticRandomKey".to_string(),
            stopped_early,
            elapsed: start.elapsed(),
        }
    }

    /// Evaluates every individual without a cached cost. Returns how many ran.
    fn evaluate_pending(&self, population: &mut [RandomKeyChromosome]) -> u64 {
        let pending: Vec<usize> = population
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_evaluated())
            .map(|(i, _)| i)
            .collect();
        let orderings: Vec<Vec<usize>> = pending
            .iter()
            .map(|&i| population[i].decode_as_permutation())
            .collect();
        let costs = self.problem.evaluate_parallel(&orderings);
        for (&i, cost) in pending.iter().zip(costs) {
            population[i].set_cost(cost);
        }
        pending.len() as u64
    }
}

fn sort_by_cost(population: &mut [RandomKeyChromosome]) {
    population.sort_by(|a, b| {
        a.cost()
            .partial_cmp(&b.cost())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DisplacementProblem {
        size: usize,
    }

    impl OrderingProblem for DisplacementProblem {
        fn num_items(&self) -> usize {
            self.size
        }

        fn evaluate(&self, ordering: &[usize]) -> f64 {
            ordering
                .iter()
                .enumerate()
                .map(|(pos, &item)| (pos as f64 - item as f64).abs())
                .sum()
        }

        fn initial_ordering(&self) -> Vec<usize> {
            (0..self.size).rev().collect()
        }
    }

    #[test]
    fn test_from_ordering_round_trip() {
        let mut rng = make_rng(Some(2));
        let ordering = vec![3, 0, 4, 1, 2];
        let chromosome = RandomKeyChromosome::from_ordering(&ordering, &mut rng);
        assert_eq!(chromosome.keys.len(), 10);
        assert_eq!(chromosome.decode_as_permutation(), ordering);
    }

    #[test]
    fn test_crossover_at() {
        let a = RandomKeyChromosome {
            keys: vec![0.1, 0.2, 0.3, 0.4],
            cost: Some(1.0),
        };
        let b = RandomKeyChromosome {
            keys: vec![0.9, 0.8, 0.7, 0.6],
            cost: Some(2.0),
        };
        let child = a.crossover_at(&b, 1);
        assert_eq!(child.keys, vec![0.1, 0.8, 0.7, 0.6]);
        assert!(!child.is_evaluated());
        assert!(child.cost().is_infinite());
    }

    #[test]
    fn test_swap_mutate_touches_ordering_half() {
        let mut rng = make_rng(Some(8));
        let mut c = RandomKeyChromosome::random(6, &mut rng);
        let before = c.keys.clone();
        c.swap_mutate(&mut rng);

        assert_eq!(&before[6..], &c.keys[6..]);
        let changed = before[..6]
            .iter()
            .zip(&c.keys[..6])
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 2);
    }

    #[test]
    fn test_roulette_prefers_cheap() {
        let mut rng = make_rng(Some(13));
        let mut cheap = RandomKeyChromosome::random(2, &mut rng);
        cheap.set_cost(0.0);
        let mut pricey = RandomKeyChromosome::random(2, &mut rng);
        pricey.set_cost(1e6);
        let population = vec![pricey, cheap];

        let picked_cheap = (0..200)
            .filter(|_| roulette_select(&population, &mut rng).cost() == 0.0)
            .count();
        assert!(picked_cheap > 190);
    }

    #[test]
    fn test_zero_generations_returns_initial() {
        let runner = BrkgaRunner::new(
            BrkgaConfig::default().with_max_generations(0).with_seed(1),
            DisplacementProblem { size: 5 },
        );
        let result = runner.run();
        assert_eq!(result.best_ordering, vec![4, 3, 2, 1, 0]);
        assert_eq!(result.best_cost, 12.0);
        assert_eq!(result.current_cost, 12.0);
        assert_eq!(result.evaluations, 1);
    }

    #[test]
    fn test_ga_improves_and_respects_budget() {
        let config = BrkgaConfig::default()
            .with_population_size(20)
            .with_max_generations(40)
            .with_stagnation_limit(40)
            .with_seed(21);
        let result = BrkgaRunner::new(config, DisplacementProblem { size: 8 }).run();

        assert!(result.best_cost < 32.0);
        assert!(result.iterations <= 40);
        assert!(result.history.windows(2).all(|w| w[1] <= w[0]));
    }

    struct Unbounded;

    impl OrderingProblem for Unbounded {
        fn num_items(&self) -> usize {
            3
        }

        fn evaluate(&self, _ordering: &[usize]) -> f64 {
            f64::INFINITY
        }
    }

    #[test]
    fn test_infinite_costs_stay_cached() {
        // Without crossover or mutation every child is a clone of a parent,
        // so only the initial population needs evaluating.
        let config = BrkgaConfig::default()
            .with_population_size(6)
            .with_crossover_rate(0.0)
            .with_mutation_rate(0.0)
            .with_max_generations(3)
            .with_stagnation_limit(100)
            .with_seed(9);
        let result = BrkgaRunner::new(config, Unbounded).run();

        assert_eq!(result.iterations, 3);
        assert_eq!(result.evaluations, 6);
        assert!(result.best_cost.is_infinite());
    }

    #[test]
    fn test_ga_stagnation_stop_respects_floor() {
        // One item: every individual decodes to the same ordering.
        let config = BrkgaConfig::default()
            .with_max_generations(100)
            .with_stagnation_limit(1)
            .with_min_generations(4)
            .with_seed(5);
        let result = BrkgaRunner::new(config, DisplacementProblem { size: 1 }).run();

        assert!(result.stopped_early);
        assert_eq!(result.iterations, 4);
    }
}
