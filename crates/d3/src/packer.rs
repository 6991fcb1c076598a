//! Four-phase corner-point container loader.
//!
//! 1. **Coarse assignment**: containers are visited in the selected order,
//!    each starting from an empty corner set, and offered every item not yet
//!    taken (priority tier first). Only the resulting assignment is kept.
//! 2. **Refit**: each container re-packs its assigned items sorted by the
//!    refit key. Corner sets from here on persist per container.
//! 3. **Defragmentation**: every item still unassigned may evict one placed
//!    item of lower cost whose slot it fits into, earliest container first.
//! 4. **Final refit**: all offered items are tried once more against the
//!    accumulated corner sets.
//!
//! An item is placed at the first corner (ascending distance from the
//! origin) and first orientation that passes bounds, overlap and weight
//! checks, plus the support check when enabled. The packer is deterministic.

use crate::boundary::Container;
use crate::cost::total_cost;
use crate::extreme_point::CornerSet;
use crate::geometry::{fits, rotate, Cuboid, Item, Orientation, EPSILON};
use crate::policy::{
    assignment_order, container_order, sort_for_refit, DensityScoring, ItemOrder, ItemScoring,
};
use crate::solution::{Placement, Solution};
use crate::stability::is_supported;
use nalgebra::Vector3;
use std::collections::HashSet;
use uldpack_core::{Error, Result, Solver};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default per-container penalty for containers holding priority items.
pub const DEFAULT_PRIORITY_PENALTY: f64 = 5000.0;

/// Configuration for the packer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackerConfig {
    /// Number of leading containers (largest by volume) visited first.
    pub priority_bins: usize,
    /// Container ordering selector, see [`container_order`].
    pub container_ordering: usize,
    /// Item order within each tier for the coarse assignment.
    pub item_order: ItemOrder,
    /// Cost charged per container holding a priority item.
    pub priority_penalty: f64,
    /// Minimum supported base fraction for items above the floor.
    pub min_support_ratio: Option<f64>,
    /// Whether the defragmentation phase runs.
    pub defragment: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            priority_bins: 3,
            container_ordering: 0,
            item_order: ItemOrder::Scored,
            priority_penalty: DEFAULT_PRIORITY_PENALTY,
            min_support_ratio: None,
            defragment: true,
        }
    }
}

impl PackerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of lead containers.
    pub fn with_priority_bins(mut self, bins: usize) -> Self {
        self.priority_bins = bins;
        self
    }

    /// Sets the container ordering selector.
    pub fn with_container_ordering(mut self, selector: usize) -> Self {
        self.container_ordering = selector;
        self
    }

    /// Sets the item order policy.
    pub fn with_item_order(mut self, order: ItemOrder) -> Self {
        self.item_order = order;
        self
    }

    /// Sets the priority container penalty.
    pub fn with_priority_penalty(mut self, penalty: f64) -> Self {
        self.priority_penalty = penalty.max(0.0);
        self
    }

    /// Enables the support check.
    pub fn with_min_support_ratio(mut self, ratio: f64) -> Self {
        self.min_support_ratio = Some(ratio.clamp(0.0, 1.0));
        self
    }

    /// Enables or disables defragmentation.
    pub fn with_defragment(mut self, enabled: bool) -> Self {
        self.defragment = enabled;
        self
    }
}

/// Corner-point container loader.
#[derive(Debug, Clone)]
pub struct Packer<S: ItemScoring = DensityScoring> {
    config: PackerConfig,
    scoring: S,
}

impl Packer<DensityScoring> {
    /// Creates a packer with the default scoring policy.
    pub fn new(config: PackerConfig) -> Self {
        Self {
            config,
            scoring: DensityScoring,
        }
    }

    /// Creates a packer with default configuration.
    pub fn default_config() -> Self {
        Self::new(PackerConfig::default())
    }
}

impl<S: ItemScoring> Packer<S> {
    /// Creates a packer with a custom scoring policy.
    pub fn with_scoring(config: PackerConfig, scoring: S) -> Self {
        Self { config, scoring }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PackerConfig {
        &self.config
    }

    /// Returns the scoring policy.
    pub fn scoring(&self) -> &S {
        &self.scoring
    }

    /// Packs items in the given sequence.
    pub fn pack(&self, items: &[Item], containers: &[Container]) -> Result<Solution> {
        let order: Vec<usize> = (0..items.len()).collect();
        self.pack_ordered(items, containers, &order)
    }

    /// Packs the items listed in `order`, in that sequence.
    ///
    /// Items missing from `order` are never offered and stay unassigned.
    pub fn pack_ordered(
        &self,
        items: &[Item],
        containers: &[Container],
        order: &[usize],
    ) -> Result<Solution> {
        validate_input(items, containers)?;

        let mut seen = vec![false; items.len()];
        for &i in order {
            if i >= items.len() || seen[i] {
                return Err(Error::ConfigError(format!(
                    "item order must list distinct indices below {}, got {}",
                    items.len(),
                    i
                )));
            }
            seen[i] = true;
        }

        Ok(self.pack_unchecked(items, containers, order))
    }

    /// Runs the four phases on input that was already validated.
    pub(crate) fn pack_unchecked(
        &self,
        items: &[Item],
        containers: &[Container],
        order: &[usize],
    ) -> Solution {
        self.pack_with_selector(items, containers, order, self.config.container_ordering)
    }

    /// Same as [`Packer::pack_unchecked`] with an explicit container ordering selector.
    pub(crate) fn pack_with_selector(
        &self,
        items: &[Item],
        containers: &[Container],
        order: &[usize],
        selector: usize,
    ) -> Solution {
        let visit = container_order(containers, self.config.priority_bins, selector);

        let mut state = PackState {
            items,
            containers,
            min_support: self.config.min_support_ratio,
            solution: Solution::new(items.len(), containers.len()),
            corners: vec![CornerSet::new(); containers.len()],
        };

        // Phase A: coarse assignment.
        let offered = assignment_order(items, order, self.config.item_order, &self.scoring);
        for &c in &visit {
            state.fit_items(&offered, c);
        }
        let assignment: Vec<Vec<usize>> = (0..containers.len())
            .map(|c| state.solution.clear_container(c))
            .collect();
        log::debug!(
            "Phase A: {} of {} items assigned",
            assignment.iter().map(Vec::len).sum::<usize>(),
            order.len()
        );

        // Phase B: refit each container with its own items.
        for &c in &visit {
            let mut assigned = assignment[c].clone();
            sort_for_refit(items, &mut assigned, &self.scoring);
            state.corners[c] = CornerSet::new();
            state.fit_items(&assigned, c);
        }
        log::debug!("Phase B: {} items placed", state.solution.placed_count());

        // Phase C: defragmentation.
        if self.config.defragment {
            let mut pending: Vec<usize> = order
                .iter()
                .copied()
                .filter(|&i| !state.solution.is_placed(i))
                .collect();
            sort_for_refit(items, &mut pending, &self.scoring);

            let mut swaps = 0usize;
            for item in pending {
                if visit.iter().any(|&c| state.try_replace(item, c)) {
                    swaps += 1;
                }
            }
            log::debug!("Phase C: {} swaps", swaps);
        }

        // Phase D: final refit over every offered item.
        let mut remaining: Vec<usize> = order.to_vec();
        sort_for_refit(items, &mut remaining, &self.scoring);
        for &c in &visit {
            state.fit_items(&remaining, c);
        }
        log::debug!(
            "Phase D: {} of {} items placed",
            state.solution.placed_count(),
            order.len()
        );

        let mut solution = state.solution;
        solution.set_container_order(visit);
        let cost = total_cost(&solution, items, self.config.priority_penalty);
        solution.set_total_cost(cost);
        solution
    }
}

impl<S: ItemScoring> Solver for Packer<S> {
    type Item = Item;
    type Container = Container;
    type Solution = Solution;

    fn solve(&self, items: &[Item], containers: &[Container]) -> Result<Solution> {
        self.pack(items, containers)
    }
}

/// Validates every item and container and rejects duplicate ids.
pub fn validate_input(items: &[Item], containers: &[Container]) -> Result<()> {
    let mut item_ids = HashSet::new();
    for item in items {
        item.validate()?;
        if !item_ids.insert(item.id()) {
            return Err(Error::InvalidItem(format!(
                "Duplicate item id '{}'",
                item.id()
            )));
        }
    }

    let mut container_ids = HashSet::new();
    for container in containers {
        container.validate()?;
        if !container_ids.insert(container.id()) {
            return Err(Error::InvalidContainer(format!(
                "Duplicate container id '{}'",
                container.id()
            )));
        }
    }

    Ok(())
}

/// Distinct orientations of `dims`, in [`Orientation::ALL`] order.
fn distinct_orientations(dims: &Vector3<f64>) -> Vec<(Orientation, Vector3<f64>)> {
    let mut result: Vec<(Orientation, Vector3<f64>)> = Vec::with_capacity(6);
    for orientation in Orientation::ALL {
        let rotated = rotate(dims, orientation);
        if !result.iter().any(|(_, r)| (r - rotated).amax() < EPSILON) {
            result.push((orientation, rotated));
        }
    }
    result
}

/// Mutable state of one packing run.
struct PackState<'a> {
    items: &'a [Item],
    containers: &'a [Container],
    min_support: Option<f64>,
    solution: Solution,
    corners: Vec<CornerSet>,
}

impl PackState<'_> {
    /// Checks a candidate box against the other boxes of a container.
    fn admissible(&self, candidate: &Cuboid, container: usize, others: &[Cuboid]) -> bool {
        let bounds = self.containers[container].dimensions();
        if !fits(bounds, &candidate.position, &candidate.dimensions) {
            return false;
        }
        if others.iter().any(|b| b.overlaps(candidate)) {
            return false;
        }
        match self.min_support {
            Some(ratio) => is_supported(candidate, others, ratio),
            None => true,
        }
    }

    /// Tries each corner and orientation in turn. Returns true on success.
    fn try_fit(&mut self, item: usize, container: usize) -> bool {
        let target = &self.containers[container];
        let weight = self.items[item].weight();
        if !target.accepts_weight(self.solution.load_weight(container) + weight) {
            return false;
        }

        let mut boxes = self.solution.boxes_in(container);
        let orientations = distinct_orientations(self.items[item].dimensions());

        let mut chosen = None;
        'corners: for (index, corner) in self.corners[container].iter().enumerate() {
            for &(orientation, dims) in &orientations {
                let candidate = Cuboid::new(*corner, dims);
                if self.admissible(&candidate, container, &boxes) {
                    chosen = Some((index, orientation, candidate));
                    break 'corners;
                }
            }
        }

        let Some((index, orientation, candidate)) = chosen else {
            return false;
        };

        self.solution.place(
            item,
            Placement {
                container,
                position: candidate.position,
                orientation,
                dimensions: candidate.dimensions,
            },
            weight,
        );
        boxes.push(candidate);
        self.corners[container].record_placement(
            index,
            &candidate,
            self.containers[container].dimensions(),
            &boxes,
        );
        true
    }

    /// Offers every still unplaced item of `order` to a container.
    fn fit_items(&mut self, order: &[usize], container: usize) -> usize {
        let mut taken = 0;
        for &item in order {
            if !self.solution.is_placed(item) && self.try_fit(item, container) {
                taken += 1;
            }
        }
        taken
    }

    /// Evicts one cheaper item of `container` whose slot `item` fits into.
    ///
    /// The item takes the evicted item's position. On success the container's
    /// corner set is rebuilt and the evicted item becomes unassigned.
    fn try_replace(&mut self, item: usize, container: usize) -> bool {
        let incoming = &self.items[item];
        let resident: Vec<usize> = self.solution.items_in(container).to_vec();
        let orientations = distinct_orientations(incoming.dimensions());

        for &victim in &resident {
            let outgoing = &self.items[victim];
            if incoming.cost() <= outgoing.cost() {
                continue;
            }
            let load = self.solution.load_weight(container) - outgoing.weight() + incoming.weight();
            if !self.containers[container].accepts_weight(load) {
                continue;
            }
            let Some(slot) = self.solution.placement(victim).copied() else {
                continue;
            };

            let others: Vec<Cuboid> = resident
                .iter()
                .filter(|&&i| i != victim)
                .filter_map(|&i| self.solution.placement(i).map(Placement::cuboid))
                .collect();

            let fitting = orientations.iter().find(|(_, dims)| {
                let candidate = Cuboid::new(slot.position, *dims);
                self.admissible(&candidate, container, &others)
                    && self.keeps_support(&candidate, &others)
            });

            if let Some(&(orientation, dims)) = fitting {
                self.solution.remove(victim, outgoing.weight());
                self.solution.place(
                    item,
                    Placement {
                        container,
                        position: slot.position,
                        orientation,
                        dimensions: dims,
                    },
                    incoming.weight(),
                );
                let boxes = self.solution.boxes_in(container);
                self.corners[container] =
                    CornerSet::rebuild(self.containers[container].dimensions(), &boxes);
                log::debug!(
                    "Replaced '{}' with '{}' in container '{}'",
                    outgoing.id(),
                    incoming.id(),
                    self.containers[container].id()
                );
                return true;
            }
        }
        false
    }

    /// With the support check on, every other box must stay supported once
    /// `candidate` replaces the evicted box.
    fn keeps_support(&self, candidate: &Cuboid, others: &[Cuboid]) -> bool {
        let Some(ratio) = self.min_support else {
            return true;
        };
        let mut boxes = others.to_vec();
        boxes.push(*candidate);
        others.iter().all(|b| is_supported(b, &boxes, ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uld() -> Container {
        Container::new("U1", 244.0, 318.0, 285.0).with_weight_limit(3500.0)
    }

    fn cube(id: &str, side: f64) -> Item {
        Item::new(id, side, side, side)
            .with_weight(100.0)
            .with_cost(50.0)
    }

    #[test]
    fn test_single_item_at_origin() {
        let solution = Packer::default_config()
            .pack(&[cube("P1", 200.0)], &[uld()])
            .unwrap();

        let placement = solution.placement(0).unwrap();
        assert_eq!(placement.position, Vector3::zeros());
        assert_relative_eq!(solution.total_cost(), 0.0);
    }

    #[test]
    fn test_two_large_cubes_only_one_fits() {
        let items = [cube("P1", 200.0), cube("P2", 200.0)];
        let solution = Packer::default_config().pack(&items, &[uld()]).unwrap();

        assert_eq!(solution.placed_count(), 1);
        assert_relative_eq!(solution.total_cost(), 50.0);
    }

    #[test]
    fn test_items_fill_along_corners() {
        let items: Vec<Item> = (0..8).map(|i| cube(&format!("P{i}"), 100.0)).collect();
        let container = Container::new("U1", 200.0, 200.0, 200.0);
        let solution = Packer::default_config().pack(&items, &[container.clone()]).unwrap();

        assert_eq!(solution.placed_count(), 8);
        assert!(solution.audit(&items, &[container]).is_ok());
    }

    #[test]
    fn test_weight_limit_respected() {
        let items: Vec<Item> = (0..4)
            .map(|i| Item::new(format!("P{i}"), 10.0, 10.0, 10.0).with_weight(40.0).with_cost(1.0))
            .collect();
        let container = Container::new("U1", 100.0, 100.0, 100.0).with_weight_limit(100.0);
        let solution = Packer::default_config().pack(&items, &[container]).unwrap();

        assert_eq!(solution.placed_count(), 2);
        assert!(solution.load_weight(0) <= 100.0);
    }

    #[test]
    fn test_rotation_needed() {
        let items = [Item::new("long", 10.0, 10.0, 90.0).with_cost(1.0)];
        let container = Container::new("U1", 100.0, 20.0, 20.0);
        let solution = Packer::default_config().pack(&items, &[container]).unwrap();

        let placement = solution.placement(0).unwrap();
        assert_relative_eq!(placement.dimensions.x, 90.0);
    }

    #[test]
    fn test_defragmentation_swaps_in_expensive_item() {
        // Caller order loads the cheap item first.
        let items = [
            Item::new("cheap", 10.0, 10.0, 10.0).with_cost(1.0),
            Item::new("dear", 10.0, 10.0, 10.0).with_cost(500.0),
        ];
        let container = Container::new("U1", 10.0, 10.0, 10.0);
        let config = PackerConfig::new().with_item_order(ItemOrder::AsGiven);
        let solution = Packer::new(config).pack(&items, &[container]).unwrap();

        assert!(solution.is_placed(1));
        assert!(!solution.is_placed(0));
        assert_relative_eq!(solution.total_cost(), 1.0);
    }

    #[test]
    fn test_evicted_item_refits_elsewhere() {
        // "dear" evicts "cheap" from U1; the final refit moves "cheap" into U2.
        let items = [
            Item::new("cheap", 10.0, 10.0, 5.0).with_cost(1.0),
            Item::new("dear", 10.0, 10.0, 10.0).with_cost(500.0),
        ];
        let containers = [
            Container::new("U1", 10.0, 10.0, 10.0),
            Container::new("U2", 10.0, 10.0, 6.0),
        ];
        let config = PackerConfig::new().with_item_order(ItemOrder::AsGiven);
        let solution = Packer::new(config).pack(&items, &containers).unwrap();

        assert_eq!(solution.placement(1).map(|p| p.container), Some(0));
        assert_eq!(solution.placement(0).map(|p| p.container), Some(1));
        assert_relative_eq!(solution.total_cost(), 0.0);
        assert!(solution.audit(&items, &containers).is_ok());
    }

    #[test]
    fn test_no_defragmentation_keeps_first_item() {
        let items = [
            Item::new("cheap", 10.0, 10.0, 10.0).with_cost(1.0),
            Item::new("dear", 10.0, 10.0, 10.0).with_cost(500.0),
        ];
        let container = Container::new("U1", 10.0, 10.0, 10.0);
        let config = PackerConfig::new()
            .with_item_order(ItemOrder::AsGiven)
            .with_defragment(false);
        let solution = Packer::new(config).pack(&items, &[container]).unwrap();

        assert!(solution.is_placed(0));
        assert_relative_eq!(solution.total_cost(), 500.0);
    }

    #[test]
    fn test_support_check_blocks_overhang() {
        // The slab only fits lying flat on top of the small cube.
        let items = [
            Item::new("cube", 10.0, 10.0, 10.0).with_cost(10.0),
            Item::new("slab", 30.0, 30.0, 2.0).with_cost(1.0),
        ];
        let container = Container::new("U1", 30.0, 30.0, 12.0);

        let loose = Packer::new(PackerConfig::new().with_item_order(ItemOrder::AsGiven))
            .pack(&items, &[container.clone()])
            .unwrap();
        let strict = Packer::new(
            PackerConfig::new()
                .with_item_order(ItemOrder::AsGiven)
                .with_min_support_ratio(1.0),
        )
        .pack(&items, &[container])
        .unwrap();

        assert_eq!(loose.placed_count(), 2);
        assert_eq!(loose.placement(1).unwrap().position.z, 10.0);
        assert_eq!(strict.placed_count(), 1);
        assert!(strict.is_placed(0));
    }

    #[test]
    fn test_invalid_input_rejected() {
        let packer = Packer::default_config();
        assert!(matches!(
            packer.pack(&[Item::new("bad", 0.0, 1.0, 1.0)], &[uld()]),
            Err(Error::InvalidItem(_))
        ));
        assert!(packer
            .pack(&[cube("A", 1.0), cube("A", 1.0)], &[uld()])
            .is_err());
        assert!(matches!(
            packer.pack(&[cube("A", 1.0)], &[Container::new("U", 1.0, -1.0, 1.0)]),
            Err(Error::InvalidContainer(_))
        ));
        assert!(packer
            .pack_ordered(&[cube("A", 1.0)], &[uld()], &[0, 0])
            .is_err());
    }

    #[test]
    fn test_no_containers_leaves_everything_unassigned() {
        let items = [cube("P1", 10.0)];
        let solution = Packer::default_config().pack(&items, &[]).unwrap();
        assert_eq!(solution.unassigned(), vec![0]);
        assert_relative_eq!(solution.total_cost(), 50.0);
    }

    #[test]
    fn test_masked_items_never_offered() {
        let items = [cube("P1", 10.0), cube("P2", 10.0)];
        let solution = Packer::default_config()
            .pack_ordered(&items, &[uld()], &[1])
            .unwrap();
        assert!(!solution.is_placed(0));
        assert!(solution.is_placed(1));
    }
}
