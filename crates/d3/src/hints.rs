//! Warm-start hints for exact solvers.
//!
//! An exact model decides, for each pair of items in the same container,
//! which axis separates them. A heuristic solution fixes all of those
//! decisions and can seed the model.

use crate::boundary::Container;
use crate::geometry::{Item, Orientation, EPSILON};
use crate::solution::Solution;
use nalgebra::Vector3;
use uldpack_core::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Assignment and position of one item.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemHint {
    /// Container index, None when unplaced.
    pub container: Option<usize>,
    /// Min corner (origin when unplaced).
    pub position: Vector3<f64>,
    /// Orientation, None when unplaced.
    pub orientation: Option<Orientation>,
}

/// Separations between two items in the same container.
///
/// Each flag is true when the named relation holds for `first` relative to
/// `second`. Pairs in different containers are not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairHint {
    /// Lower item index.
    pub first: usize,
    /// Higher item index.
    pub second: usize,
    /// `first` ends before `second` starts along x.
    pub left_of: bool,
    /// `first` starts after `second` ends along x.
    pub right_of: bool,
    /// `first` ends before `second` starts along y.
    pub behind: bool,
    /// `first` starts after `second` ends along y.
    pub in_front_of: bool,
    /// `first` ends before `second` starts along z.
    pub below: bool,
    /// `first` starts after `second` ends along z.
    pub above: bool,
}

impl PairHint {
    /// Returns true if at least one axis separates the pair.
    pub fn is_separated(&self) -> bool {
        self.left_of || self.right_of || self.behind || self.in_front_of || self.below || self.above
    }
}

/// Hints derived from one solution.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WarmStart {
    /// Per-item hints, indexed by item.
    pub items: Vec<ItemHint>,
    /// Pairwise hints for items sharing a container.
    pub pairs: Vec<PairHint>,
}

/// Extracts relative-position hints from a solution.
pub fn relative_position_hints(solution: &Solution) -> WarmStart {
    let items = solution
        .placements()
        .iter()
        .map(|placement| match placement {
            Some(p) => ItemHint {
                container: Some(p.container),
                position: p.position,
                orientation: Some(p.orientation),
            },
            None => ItemHint {
                container: None,
                position: Vector3::zeros(),
                orientation: None,
            },
        })
        .collect();

    let mut pairs = Vec::new();
    for c in 0..solution.num_containers() {
        let mut members = solution.items_in(c).to_vec();
        members.sort_unstable();
        for (k, &i) in members.iter().enumerate() {
            for &j in &members[k + 1..] {
                let (Some(a), Some(b)) = (solution.placement(i), solution.placement(j)) else {
                    continue;
                };
                let a_max = a.position + a.dimensions;
                let b_max = b.position + b.dimensions;
                let before = |axis: usize| a_max[axis] <= b.position[axis] + EPSILON;
                let after = |axis: usize| a.position[axis] >= b_max[axis] - EPSILON;
                pairs.push(PairHint {
                    first: i,
                    second: j,
                    left_of: before(0),
                    right_of: after(0),
                    behind: before(1),
                    in_front_of: after(1),
                    below: before(2),
                    above: after(2),
                });
            }
        }
    }

    WarmStart { items, pairs }
}

/// A solver that proves optimality, typically through an external MIP engine.
///
/// Consumes the same records as the packer and returns the same solution
/// type, so it can replace the packer on small instances.
pub trait ExactSolver {
    /// Solves the instance, optionally warm-started.
    fn solve_exact(
        &self,
        items: &[Item],
        containers: &[Container],
        hints: Option<&WarmStart>,
    ) -> Result<Solution>;
}
