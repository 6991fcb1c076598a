//! Packing solution state and output records.

use crate::boundary::Container;
use crate::geometry::{fits, Cuboid, Item, Orientation, EPSILON};
use nalgebra::Vector3;
use uldpack_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Container id written for items that were not placed.
pub const UNASSIGNED: &str = "NONE";

/// Where and how one item sits.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// Index of the container in the caller's container list.
    pub container: usize,
    /// Min corner of the item inside the container.
    pub position: Vector3<f64>,
    /// Orientation applied to the item.
    pub orientation: Orientation,
    /// Extents along x, y, z after orientation.
    pub dimensions: Vector3<f64>,
}

impl Placement {
    /// Bounding box of the placed item.
    pub fn cuboid(&self) -> Cuboid {
        Cuboid::new(self.position, self.dimensions)
    }
}

/// Items held by one container, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerLoad {
    /// Item indices in insertion order.
    pub items: Vec<usize>,
    /// Sum of the items' weights.
    pub weight: f64,
}

/// Result of one packing run.
///
/// Item and container indices refer to the slices passed to the packer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    placements: Vec<Option<Placement>>,
    loads: Vec<ContainerLoad>,
    container_order: Vec<usize>,
    total_cost: f64,
}

impl Solution {
    /// An empty solution: nothing placed, every container empty.
    pub fn new(num_items: usize, num_containers: usize) -> Self {
        Self {
            placements: vec![None; num_items],
            loads: vec![ContainerLoad::default(); num_containers],
            container_order: (0..num_containers).collect(),
            total_cost: 0.0,
        }
    }

    /// Builds a solution from externally computed placements, indexed by item.
    ///
    /// Used by solvers other than the packer. The result is audited and its
    /// cost computed with `priority_penalty`.
    pub fn from_placements(
        placements: Vec<Option<Placement>>,
        items: &[Item],
        containers: &[Container],
        priority_penalty: f64,
    ) -> Result<Self> {
        if placements.len() != items.len() {
            return Err(Error::Collaborator(format!(
                "got {} placements for {} items",
                placements.len(),
                items.len()
            )));
        }

        let mut solution = Self::new(items.len(), containers.len());
        for (item, placement) in placements.into_iter().enumerate() {
            if let Some(p) = placement {
                if p.container >= containers.len() {
                    return Err(Error::Collaborator(format!(
                        "item '{}' assigned to unknown container {}",
                        items[item].id(),
                        p.container
                    )));
                }
                solution.place(item, p, items[item].weight());
            }
        }
        solution.audit(items, containers)?;

        let cost = crate::cost::total_cost(&solution, items, priority_penalty);
        solution.set_total_cost(cost);
        Ok(solution)
    }

    /// Number of items covered by the solution.
    pub fn num_items(&self) -> usize {
        self.placements.len()
    }

    /// Number of containers covered by the solution.
    pub fn num_containers(&self) -> usize {
        self.loads.len()
    }

    /// Placement of an item, if placed.
    pub fn placement(&self, item: usize) -> Option<&Placement> {
        self.placements.get(item).and_then(|p| p.as_ref())
    }

    /// Placements indexed by item.
    pub fn placements(&self) -> &[Option<Placement>] {
        &self.placements
    }

    /// Returns true if the item is placed.
    pub fn is_placed(&self, item: usize) -> bool {
        self.placement(item).is_some()
    }

    /// Number of placed items.
    pub fn placed_count(&self) -> usize {
        self.placements.iter().filter(|p| p.is_some()).count()
    }

    /// Indices of items left unassigned, ascending.
    pub fn unassigned(&self) -> Vec<usize> {
        self.placements
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Items in a container, in insertion order.
    pub fn items_in(&self, container: usize) -> &[usize] {
        self.loads
            .get(container)
            .map(|load| load.items.as_slice())
            .unwrap_or(&[])
    }

    /// Total weight loaded into a container.
    pub fn load_weight(&self, container: usize) -> f64 {
        self.loads.get(container).map(|l| l.weight).unwrap_or(0.0)
    }

    /// Per-container loads.
    pub fn loads(&self) -> &[ContainerLoad] {
        &self.loads
    }

    /// Bounding boxes of the items in a container, in insertion order.
    pub fn boxes_in(&self, container: usize) -> Vec<Cuboid> {
        self.items_in(container)
            .iter()
            .filter_map(|&i| self.placement(i).map(Placement::cuboid))
            .collect()
    }

    /// Container visiting order used by the packer.
    pub fn container_order(&self) -> &[usize] {
        &self.container_order
    }

    /// Cost computed when the solution was produced.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Returns true if at least one priority item sits in the container.
    pub fn is_priority(&self, container: usize, items: &[Item]) -> bool {
        self.items_in(container)
            .iter()
            .any(|&i| items.get(i).is_some_and(Item::is_priority))
    }

    /// Number of containers holding priority items.
    pub fn priority_container_count(&self, items: &[Item]) -> usize {
        (0..self.loads.len())
            .filter(|&c| self.is_priority(c, items))
            .count()
    }

    pub(crate) fn set_total_cost(&mut self, cost: f64) {
        self.total_cost = cost;
    }

    pub(crate) fn set_container_order(&mut self, order: Vec<usize>) {
        self.container_order = order;
    }

    pub(crate) fn place(&mut self, item: usize, placement: Placement, weight: f64) {
        let container = placement.container;
        self.placements[item] = Some(placement);
        let load = &mut self.loads[container];
        load.items.push(item);
        load.weight += weight;
    }

    pub(crate) fn remove(&mut self, item: usize, weight: f64) -> Option<Placement> {
        let placement = self.placements.get_mut(item)?.take()?;
        let load = &mut self.loads[placement.container];
        load.items.retain(|&i| i != item);
        load.weight -= weight;
        if load.items.is_empty() {
            load.weight = 0.0;
        }
        Some(placement)
    }

    /// Removes every placement from a container, returning the item indices
    /// in insertion order.
    pub(crate) fn clear_container(&mut self, container: usize) -> Vec<usize> {
        let load = std::mem::take(&mut self.loads[container]);
        for &item in &load.items {
            self.placements[item] = None;
        }
        load.items
    }

    /// One output row per item, in input order.
    pub fn rows(&self, items: &[Item], containers: &[Container]) -> Vec<PlacementRow> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match self.placement(i) {
                Some(p) => PlacementRow {
                    item_id: item.id().to_string(),
                    container_id: containers
                        .get(p.container)
                        .map(|c| c.id().to_string())
                        .unwrap_or_else(|| UNASSIGNED.to_string()),
                    position: Some(p.position),
                    dimensions: p.dimensions,
                    orientation: Some(p.orientation),
                    weight: item.weight(),
                },
                None => PlacementRow {
                    item_id: item.id().to_string(),
                    container_id: UNASSIGNED.to_string(),
                    position: None,
                    dimensions: *item.dimensions(),
                    orientation: None,
                    weight: item.weight(),
                },
            })
            .collect()
    }

    /// Checks containment, overlap, capacity and map consistency.
    ///
    /// A failure means the solution was built outside the packer's admission
    /// checks and must not be used.
    pub fn audit(&self, items: &[Item], containers: &[Container]) -> Result<()> {
        if self.placements.len() != items.len() || self.loads.len() != containers.len() {
            return Err(Error::InvariantViolation(format!(
                "solution covers {} items and {} containers, input has {} and {}",
                self.placements.len(),
                self.loads.len(),
                items.len(),
                containers.len()
            )));
        }

        for (i, placement) in self.placements.iter().enumerate() {
            if let Some(p) = placement {
                let listed = self
                    .loads
                    .get(p.container)
                    .map(|load| load.items.iter().filter(|&&x| x == i).count())
                    .unwrap_or(0);
                if listed != 1 {
                    return Err(Error::InvariantViolation(format!(
                        "item '{}' is listed {} times in its container",
                        items[i].id(),
                        listed
                    )));
                }
            }
        }

        for (c, (load, container)) in self.loads.iter().zip(containers).enumerate() {
            let mut weight = 0.0;
            for &i in &load.items {
                let placement = match self.placement(i) {
                    Some(p) if p.container == c => p,
                    _ => {
                        return Err(Error::InvariantViolation(format!(
                            "container '{}' lists item {} that is not placed in it",
                            container.id(),
                            i
                        )))
                    }
                };
                let expected = items[i].rotated(placement.orientation);
                if (expected - placement.dimensions).amax() > EPSILON {
                    return Err(Error::InvariantViolation(format!(
                        "item '{}' has dimensions inconsistent with its orientation",
                        items[i].id()
                    )));
                }
                if !fits(container.dimensions(), &placement.position, &placement.dimensions) {
                    return Err(Error::InvariantViolation(format!(
                        "item '{}' exceeds the bounds of container '{}'",
                        items[i].id(),
                        container.id()
                    )));
                }
                weight += items[i].weight();
            }

            if !container.accepts_weight(weight) {
                return Err(Error::InvariantViolation(format!(
                    "container '{}' carries {} over its weight limit",
                    container.id(),
                    weight
                )));
            }

            let boxes = self.boxes_in(c);
            for a in 0..boxes.len() {
                for b in (a + 1)..boxes.len() {
                    if boxes[a].overlaps(&boxes[b]) {
                        return Err(Error::InvariantViolation(format!(
                            "items '{}' and '{}' overlap in container '{}'",
                            items[load.items[a]].id(),
                            items[load.items[b]].id(),
                            container.id()
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Output record for one item.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementRow {
    /// Item identifier.
    pub item_id: String,
    /// Container identifier, or [`UNASSIGNED`].
    pub container_id: String,
    /// Min corner, absent for unplaced items.
    pub position: Option<Vector3<f64>>,
    /// Realized extents (input dimensions for unplaced items).
    pub dimensions: Vector3<f64>,
    /// Orientation, absent for unplaced items.
    pub orientation: Option<Orientation>,
    /// Item weight.
    pub weight: f64,
}

impl PlacementRow {
    /// Returns true if the row describes a placed item.
    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }
}
