//! Candidate corner set for the corner-point heuristic.
//!
//! Corners are positions where a new box may be anchored by its min corner.
//! The set starts at the origin; every placed box contributes the three far
//! extreme points on its outward faces:
//!
//! ```text
//! (x + dx, y, z)   (x, y + dy, z)   (x, y, z + dz)
//! ```
//!
//! The set is kept sorted by Euclidean distance from the origin, ties broken
//! by z, then y, then x, so iteration order is deterministic. Corners that
//! leave no room inside the container, that fall inside a placed box or that
//! duplicate an existing corner are never stored.

use crate::geometry::{Cuboid, EPSILON};
use nalgebra::Vector3;
use std::cmp::Ordering;

/// Ordering used for corner iteration.
fn corner_order(a: &Vector3<f64>, b: &Vector3<f64>) -> Ordering {
    a.norm_squared()
        .total_cmp(&b.norm_squared())
        .then_with(|| a.z.total_cmp(&b.z))
        .then_with(|| a.y.total_cmp(&b.y))
        .then_with(|| a.x.total_cmp(&b.x))
}

fn same_point(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    (a - b).amax() < EPSILON
}

/// The three far extreme points of a placed box.
pub fn extreme_points(placed: &Cuboid) -> [Vector3<f64>; 3] {
    let p = placed.position;
    let d = placed.dimensions;
    [
        Vector3::new(p.x + d.x, p.y, p.z),
        Vector3::new(p.x, p.y + d.y, p.z),
        Vector3::new(p.x, p.y, p.z + d.z),
    ]
}

/// Sorted set of candidate insertion corners for one container.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerSet {
    corners: Vec<Vector3<f64>>,
}

impl Default for CornerSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CornerSet {
    /// A set holding only the origin.
    pub fn new() -> Self {
        Self {
            corners: vec![Vector3::zeros()],
        }
    }

    /// Recomputes the corner set of a container from scratch.
    pub fn rebuild(bounds: &Vector3<f64>, boxes: &[Cuboid]) -> Self {
        let mut set = Self {
            corners: Vec::new(),
        };
        set.offer(Vector3::zeros(), bounds, boxes);
        for placed in boxes {
            for point in extreme_points(placed) {
                set.offer(point, bounds, boxes);
            }
        }
        set
    }

    /// Number of corners.
    pub fn len(&self) -> usize {
        self.corners.len()
    }

    /// Returns true if no corner is left.
    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    /// Corners in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &Vector3<f64>> {
        self.corners.iter()
    }

    /// Corner at `index` in iteration order.
    pub fn get(&self, index: usize) -> Option<&Vector3<f64>> {
        self.corners.get(index)
    }

    /// Removes and returns the corner at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Vector3<f64>> {
        if index < self.corners.len() {
            Some(self.corners.remove(index))
        } else {
            None
        }
    }

    /// Inserts `point` at its sorted position unless it is already present.
    pub fn insert(&mut self, point: Vector3<f64>) -> bool {
        if self.corners.iter().any(|c| same_point(c, &point)) {
            return false;
        }
        let index = self
            .corners
            .partition_point(|c| corner_order(c, &point) == Ordering::Less);
        self.corners.insert(index, point);
        true
    }

    /// Inserts `point` if it leaves room inside `bounds` and is not inside
    /// any of `boxes`.
    fn offer(&mut self, point: Vector3<f64>, bounds: &Vector3<f64>, boxes: &[Cuboid]) -> bool {
        if (0..3).any(|axis| point[axis] >= bounds[axis] - EPSILON) {
            return false;
        }
        if boxes.iter().any(|b| b.contains_point(&point)) {
            return false;
        }
        self.insert(point)
    }

    /// Updates the set after `placed` was anchored at the corner `used`.
    ///
    /// `boxes` must already include `placed`.
    pub fn record_placement(
        &mut self,
        used: usize,
        placed: &Cuboid,
        bounds: &Vector3<f64>,
        boxes: &[Cuboid],
    ) {
        self.remove(used);
        self.corners.retain(|c| !placed.contains_point(c));
        for point in extreme_points(placed) {
            self.offer(point, bounds, boxes);
        }
    }
}
