//! Ordering search over the packer.
//!
//! The packer is deterministic, so an item ordering fully determines the
//! solution and its cost. [`PackingProblem`] exposes one packer run plus one
//! cost evaluation as the fitness oracle for the search runners.

use crate::boundary::Container;
use crate::geometry::Item;
use crate::packer::{validate_input, Packer, PackerConfig};
use crate::policy::{ordering_count, DensityScoring, ItemOrder, ItemScoring};
use crate::solution::Solution;
use rayon::prelude::*;
use uldpack_core::{
    run_search, Error, OrderingProblem, Proposal, Result, SearchConfig, SearchOutcome, SequenceProposer,
};

/// Fitness oracle: packs items in the given ordering and returns the cost.
pub struct PackingProblem<'a, S: ItemScoring = DensityScoring> {
    packer: &'a Packer<S>,
    items: &'a [Item],
    containers: &'a [Container],
}

impl<'a, S: ItemScoring> PackingProblem<'a, S> {
    /// Creates the problem after validating the input once.
    pub fn new(packer: &'a Packer<S>, items: &'a [Item], containers: &'a [Container]) -> Result<Self> {
        validate_input(items, containers)?;
        Ok(Self {
            packer,
            items,
            containers,
        })
    }

    /// Packs one ordering.
    pub fn decode(&self, ordering: &[usize]) -> Solution {
        self.packer.pack_unchecked(self.items, self.containers, ordering)
    }
}

impl<S: ItemScoring> OrderingProblem for PackingProblem<'_, S> {
    fn num_items(&self) -> usize {
        self.items.len()
    }

    fn evaluate(&self, ordering: &[usize]) -> f64 {
        self.decode(ordering).total_cost()
    }

    fn on_iteration(&self, iteration: u64, current_cost: f64, best_cost: f64) {
        log::trace!(
            "iteration {}: current={:.2}, best={:.2}",
            iteration,
            current_cost,
            best_cost
        );
    }
}

/// Result of [`optimize`].
#[derive(Debug, Clone)]
pub struct Optimized {
    /// Search statistics and the best ordering.
    pub outcome: SearchOutcome,
    /// Solution produced by the best ordering.
    pub solution: Solution,
}

impl Optimized {
    /// Best ordering found.
    pub fn best_ordering(&self) -> &[usize] {
        &self.outcome.best_ordering
    }

    /// Cost of the best ordering.
    pub fn best_cost(&self) -> f64 {
        self.outcome.best_cost
    }
}

/// Packer configuration used by [`optimize`]: default settings, with each
/// tier kept in the order under search.
pub fn search_packer_config() -> PackerConfig {
    PackerConfig::new().with_item_order(ItemOrder::AsGiven)
}

/// Searches for the item ordering with the lowest cost.
///
/// The caller's item order is the starting point.
pub fn optimize(items: &[Item], containers: &[Container], config: &SearchConfig) -> Result<Optimized> {
    let packer = Packer::new(search_packer_config());
    optimize_with(&packer, items, containers, config)
}

/// Like [`optimize`], with a caller-supplied packer.
pub fn optimize_with<S: ItemScoring>(
    packer: &Packer<S>,
    items: &[Item],
    containers: &[Container],
    config: &SearchConfig,
) -> Result<Optimized> {
    let problem = PackingProblem::new(packer, items, containers)?;
    let outcome = run_search(problem, config)?;
    let solution = packer.pack_unchecked(items, containers, &outcome.best_ordering);

    log::info!(
        "{}: best cost {:.2} after {} iterations, {} of {} items placed",
        outcome.strategy,
        outcome.best_cost,
        outcome.iterations,
        solution.placed_count(),
        items.len()
    );

    Ok(Optimized { outcome, solution })
}

/// Largest number of container orderings [`sweep_container_orderings`] will pack.
pub const MAX_SWEEP_ORDERINGS: usize = 40_320;

/// Packs the caller's item order under every container ordering selector
/// and returns the cheapest selector with its solution.
///
/// Selectors are evaluated in parallel. Ties go to the lowest selector.
/// Fails with [`Error::ConfigError`] when there are more than
/// [`MAX_SWEEP_ORDERINGS`] orderings.
pub fn sweep_container_orderings<S: ItemScoring>(
    packer: &Packer<S>,
    items: &[Item],
    containers: &[Container],
) -> Result<(usize, Solution)> {
    validate_input(items, containers)?;
    let count = ordering_count(containers.len(), packer.config().priority_bins);
    if count > MAX_SWEEP_ORDERINGS {
        return Err(Error::ConfigError(format!(
            "{} containers with {} lead bins give more than {} orderings to sweep",
            containers.len(),
            packer.config().priority_bins,
            MAX_SWEEP_ORDERINGS
        )));
    }

    let order: Vec<usize> = (0..items.len()).collect();
    let best = (0..count)
        .into_par_iter()
        .map(|selector| {
            (
                selector,
                packer.pack_with_selector(items, containers, &order, selector),
            )
        })
        .reduce_with(|a, b| {
            let a_cost = a.1.total_cost();
            let b_cost = b.1.total_cost();
            if b_cost < a_cost || (b_cost == a_cost && b.0 < a.0) {
                b
            } else {
                a
            }
        });
    log::debug!("Swept {} container orderings", count);

    // ordering_count is at least 1, so a solution always exists.
    best.ok_or_else(|| Error::Internal("no container ordering evaluated".into()))
}

/// Packs a proposal and returns the solution with its cost.
///
/// Items masked out are never offered to the packer and are charged their
/// unplaced cost.
pub fn score_proposal<S: ItemScoring>(
    packer: &Packer<S>,
    items: &[Item],
    containers: &[Container],
    proposal: &Proposal,
) -> Result<(Solution, f64)> {
    proposal.validate(items.len())?;
    let solution = packer.pack_ordered(items, containers, &proposal.selected())?;
    let cost = solution.total_cost();
    Ok((solution, cost))
}

/// Asks a proposer for an ordering and scores it.
pub fn propose_and_score<S, P>(
    packer: &Packer<S>,
    proposer: &mut P,
    items: &[Item],
    containers: &[Container],
) -> Result<(Proposal, Solution, f64)>
where
    S: ItemScoring,
    P: SequenceProposer<Item = Item>,
{
    let proposal = proposer.propose(items)?;
    let (solution, cost) = score_proposal(packer, items, containers, &proposal)?;
    Ok((proposal, solution, cost))
}
