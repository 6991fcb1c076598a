//! 3D geometry types: items, orientations and axis-aligned cuboids.

use nalgebra::Vector3;
use uldpack_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used by every geometric comparison.
pub const EPSILON: f64 = 1e-9;

/// Unplaced-cost sentinel for priority items.
pub const PRIORITY_COST: f64 = 1e10;

/// One of the six axis permutations mapping (length, width, height) onto
/// the container's (x, y, z) axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// (l, w, h) -> (x, y, z)
    #[default]
    Lwh,
    /// (l, h, w) -> (x, y, z)
    Lhw,
    /// (w, l, h) -> (x, y, z)
    Wlh,
    /// (w, h, l) -> (x, y, z)
    Whl,
    /// (h, l, w) -> (x, y, z)
    Hlw,
    /// (h, w, l) -> (x, y, z)
    Hwl,
}

impl Orientation {
    /// All orientations in the order the packer tries them.
    pub const ALL: [Orientation; 6] = [
        Orientation::Lwh,
        Orientation::Lhw,
        Orientation::Wlh,
        Orientation::Whl,
        Orientation::Hlw,
        Orientation::Hwl,
    ];

    /// Source axis index (0 = length, 1 = width, 2 = height) for x, y and z.
    pub fn axes(self) -> [usize; 3] {
        match self {
            Orientation::Lwh => [0, 1, 2],
            Orientation::Lhw => [0, 2, 1],
            Orientation::Wlh => [1, 0, 2],
            Orientation::Whl => [1, 2, 0],
            Orientation::Hlw => [2, 0, 1],
            Orientation::Hwl => [2, 1, 0],
        }
    }

    /// Position of this orientation in [`Orientation::ALL`].
    pub fn index(self) -> usize {
        match self {
            Orientation::Lwh => 0,
            Orientation::Lhw => 1,
            Orientation::Wlh => 2,
            Orientation::Whl => 3,
            Orientation::Hlw => 4,
            Orientation::Hwl => 5,
        }
    }
}

/// Applies an axis permutation to `(length, width, height)`.
pub fn rotate(dims: &Vector3<f64>, orientation: Orientation) -> Vector3<f64> {
    let [x, y, z] = orientation.axes();
    Vector3::new(dims[x], dims[y], dims[z])
}

/// Returns true if a box at `position` with `rotated` extents lies inside
/// `[0, bounds]` on every axis.
pub fn fits(bounds: &Vector3<f64>, position: &Vector3<f64>, rotated: &Vector3<f64>) -> bool {
    (0..3).all(|axis| {
        position[axis] >= -EPSILON && position[axis] + rotated[axis] <= bounds[axis] + EPSILON
    })
}

/// An axis-aligned box at a position.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cuboid {
    /// Min corner.
    pub position: Vector3<f64>,
    /// Extents along x, y, z.
    pub dimensions: Vector3<f64>,
}

impl Cuboid {
    /// Creates a box from its min corner and extents.
    pub fn new(position: Vector3<f64>, dimensions: Vector3<f64>) -> Self {
        Self {
            position,
            dimensions,
        }
    }

    /// Returns the max corner of the box.
    pub fn max_corner(&self) -> Vector3<f64> {
        self.position + self.dimensions
    }

    /// Volume of the box.
    pub fn volume(&self) -> f64 {
        self.dimensions.x * self.dimensions.y * self.dimensions.z
    }

    /// Checks if this box overlaps another with positive volume.
    ///
    /// Touching faces or edges do not count.
    pub fn overlaps(&self, other: &Cuboid) -> bool {
        let self_max = self.max_corner();
        let other_max = other.max_corner();

        (0..3).all(|axis| {
            self.position[axis] < other_max[axis] - EPSILON
                && other.position[axis] < self_max[axis] - EPSILON
        })
    }

    /// Returns true if `point` lies in the half-open box `[min, max)`.
    pub fn contains_point(&self, point: &Vector3<f64>) -> bool {
        let max = self.max_corner();
        (0..3).all(|axis| {
            point[axis] >= self.position[axis] - EPSILON && point[axis] < max[axis] - EPSILON
        })
    }

    /// Center of the box.
    pub fn center(&self) -> Vector3<f64> {
        self.position + self.dimensions * 0.5
    }
}

/// Returns true if two boxes overlap with positive volume.
pub fn overlaps(a: &Cuboid, b: &Cuboid) -> bool {
    a.overlaps(b)
}

/// Service class of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PriorityClass {
    /// Premium items; their containers are charged a penalty.
    Priority,
    /// Regular items, charged their own cost when left behind.
    #[default]
    Economy,
}

/// A cuboid item ("package") to be loaded.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    /// Unique identifier.
    id: String,

    /// Dimensions (length, width, height).
    dimensions: Vector3<f64>,

    /// Weight of the item.
    weight: f64,

    /// Service class.
    priority_class: PriorityClass,

    /// Penalty incurred if the item is left unplaced.
    cost: f64,
}

impl Item {
    /// Creates an economy item with zero weight and zero cost.
    pub fn new(id: impl Into<String>, length: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            dimensions: Vector3::new(length, width, height),
            weight: 0.0,
            priority_class: PriorityClass::Economy,
            cost: 0.0,
        }
    }

    /// Creates a priority item carrying the [`PRIORITY_COST`] sentinel.
    pub fn priority(id: impl Into<String>, length: f64, width: f64, height: f64) -> Self {
        Self::new(id, length, width, height)
            .with_priority_class(PriorityClass::Priority)
            .with_cost(PRIORITY_COST)
    }

    /// Sets the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the unplaced cost.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the service class.
    pub fn with_priority_class(mut self, class: PriorityClass) -> Self {
        self.priority_class = class;
        self
    }

    /// Returns the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the dimensions (length, width, height).
    pub fn dimensions(&self) -> &Vector3<f64> {
        &self.dimensions
    }

    /// Returns the length.
    pub fn length(&self) -> f64 {
        self.dimensions.x
    }

    /// Returns the width.
    pub fn width(&self) -> f64 {
        self.dimensions.y
    }

    /// Returns the height.
    pub fn height(&self) -> f64 {
        self.dimensions.z
    }

    /// Returns the weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns the unplaced cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Returns the service class.
    pub fn priority_class(&self) -> PriorityClass {
        self.priority_class
    }

    /// Returns true for priority items.
    pub fn is_priority(&self) -> bool {
        self.priority_class == PriorityClass::Priority
    }

    /// Volume of the item.
    pub fn volume(&self) -> f64 {
        self.dimensions.x * self.dimensions.y * self.dimensions.z
    }

    /// Dimensions under the given orientation.
    pub fn rotated(&self, orientation: Orientation) -> Vector3<f64> {
        rotate(&self.dimensions, orientation)
    }

    /// Validates dimensions, weight and cost.
    pub fn validate(&self) -> Result<()> {
        if !self.dimensions.iter().all(|d| d.is_finite() && *d > 0.0) {
            return Err(Error::InvalidItem(format!(
                "All dimensions for '{}' must be positive",
                self.id
            )));
        }

        if !(self.weight.is_finite() && self.weight >= 0.0) {
            return Err(Error::InvalidItem(format!(
                "Weight for '{}' cannot be negative",
                self.id
            )));
        }

        if self.cost.is_nan() || self.cost < 0.0 {
            return Err(Error::InvalidItem(format!(
                "Cost for '{}' cannot be negative",
                self.id
            )));
        }

        Ok(())
    }
}
