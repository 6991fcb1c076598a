//! Container ("ULD") type.

use nalgebra::Vector3;
use uldpack_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cuboid load unit with a volume and an optional weight limit.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Container {
    /// Unique identifier.
    id: String,

    /// Dimensions (length, width, height) along x, y, z.
    dimensions: Vector3<f64>,

    /// Maximum total weight allowed (None = unlimited).
    weight_limit: Option<f64>,
}

impl Container {
    /// Creates a new container with the given dimensions.
    pub fn new(id: impl Into<String>, length: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            dimensions: Vector3::new(length, width, height),
            weight_limit: None,
        }
    }

    /// Sets the weight limit.
    pub fn with_weight_limit(mut self, limit: f64) -> Self {
        self.weight_limit = Some(limit);
        self
    }

    /// Returns the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the dimensions.
    pub fn dimensions(&self) -> &Vector3<f64> {
        &self.dimensions
    }

    /// Returns the length (x extent).
    pub fn length(&self) -> f64 {
        self.dimensions.x
    }

    /// Returns the width (y extent).
    pub fn width(&self) -> f64 {
        self.dimensions.y
    }

    /// Returns the height (z extent).
    pub fn height(&self) -> f64 {
        self.dimensions.z
    }

    /// Returns the weight limit.
    pub fn weight_limit(&self) -> Option<f64> {
        self.weight_limit
    }

    /// Inner volume.
    pub fn volume(&self) -> f64 {
        self.dimensions.x * self.dimensions.y * self.dimensions.z
    }

    /// Returns true if `load` stays within the weight limit.
    pub fn accepts_weight(&self, load: f64) -> bool {
        match self.weight_limit {
            Some(limit) => load <= limit + 1e-9,
            None => true,
        }
    }

    /// Validates dimensions and the weight limit.
    pub fn validate(&self) -> Result<()> {
        if !self.dimensions.iter().all(|d| d.is_finite() && *d > 0.0) {
            return Err(Error::InvalidContainer(format!(
                "All dimensions for '{}' must be positive",
                self.id
            )));
        }

        if let Some(limit) = self.weight_limit {
            if limit.is_nan() || limit < 0.0 {
                return Err(Error::InvalidContainer(format!(
                    "Weight limit for '{}' cannot be negative",
                    self.id
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_container_volume() {
        let container = Container::new("U1", 244.0, 318.0, 285.0);
        assert_relative_eq!(container.volume(), 22_113_720.0, epsilon = 0.001);
    }

    #[test]
    fn test_weight_limit() {
        let limited = Container::new("U1", 10.0, 10.0, 10.0).with_weight_limit(100.0);
        assert!(limited.accepts_weight(100.0));
        assert!(!limited.accepts_weight(100.5));

        let unlimited = Container::new("U2", 10.0, 10.0, 10.0);
        assert!(unlimited.accepts_weight(1e12));
    }

    #[test]
    fn test_validation() {
        assert!(Container::new("U1", 100.0, 80.0, 50.0).validate().is_ok());
        assert!(Container::new("U2", -100.0, 80.0, 50.0).validate().is_err());
        assert!(Container::new("U3", 100.0, 80.0, 50.0)
            .with_weight_limit(-1.0)
            .validate()
            .is_err());
    }
}
