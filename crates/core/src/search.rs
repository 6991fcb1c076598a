//! Shared ordering-search building blocks.
//!
//! All strategies treat the item ordering as the only decision variable and
//! call the packing engine as a black-box fitness oracle. This module holds
//! the pieces they share: the problem trait, the swap neighbor operator and
//! the best-known tracker.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

/// Problem definition seen by the search runners.
///
/// Costs are minimized. `evaluate` must be deterministic for a given
/// ordering; runners rely on that to treat one call as one fitness sample.
pub trait OrderingProblem: Send + Sync {
    /// Number of elements in an ordering.
    fn num_items(&self) -> usize;

    /// Runs the fitness oracle for one ordering and returns its cost.
    fn evaluate(&self, ordering: &[usize]) -> f64;

    /// Evaluates several orderings. Default implementation uses rayon.
    fn evaluate_parallel(&self, orderings: &[Vec<usize>]) -> Vec<f64> {
        orderings
            .par_iter()
            .map(|ordering| self.evaluate(ordering))
            .collect()
    }

    /// The unperturbed starting ordering.
    fn initial_ordering(&self) -> Vec<usize> {
        (0..self.num_items()).collect()
    }

    /// Called after each iteration or generation (for progress reporting).
    fn on_iteration(&self, _iteration: u64, _current_cost: f64, _best_cost: f64) {
        // Default: do nothing
    }
}

/// Creates the runner RNG, seeded when reproducibility is requested.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Produces a neighbor by applying `swaps` random pairwise swaps.
///
/// Each swap exchanges two distinct positions. Orderings shorter than two
/// elements are returned unchanged.
pub fn swap_neighbor<R: Rng + ?Sized>(ordering: &[usize], swaps: usize, rng: &mut R) -> Vec<usize> {
    let mut neighbor = ordering.to_vec();
    let n = neighbor.len();
    if n < 2 {
        return neighbor;
    }

    for _ in 0..swaps {
        let i = rng.gen_range(0..n);
        let mut j = rng.gen_range(0..n - 1);
        if j >= i {
            j += 1;
        }
        neighbor.swap(i, j);
    }
    neighbor
}

/// Running best-known `(ordering, cost)` pair.
#[derive(Debug, Clone)]
pub struct BestKnown {
    ordering: Vec<usize>,
    cost: f64,
}

impl BestKnown {
    /// Starts tracking from an evaluated ordering.
    pub fn new(ordering: Vec<usize>, cost: f64) -> Self {
        Self { ordering, cost }
    }

    /// Replaces the incumbent if `cost` is strictly lower. Returns whether it did.
    pub fn offer(&mut self, ordering: &[usize], cost: f64) -> bool {
        if cost < self.cost {
            self.ordering = ordering.to_vec();
            self.cost = cost;
            true
        } else {
            false
        }
    }

    /// Best ordering seen so far.
    pub fn ordering(&self) -> &[usize] {
        &self.ordering
    }

    /// Best cost seen so far.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Consumes the tracker.
    pub fn into_parts(self) -> (Vec<usize>, f64) {
        (self.ordering, self.cost)
    }
}
