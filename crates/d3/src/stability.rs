//! Support (contact) check for placed boxes.
//!
//! A box is supported by the container floor or by the top faces of boxes
//! whose top lies exactly at its base. Support is the supported fraction of
//! the base area.

use crate::geometry::{Cuboid, EPSILON};

/// Overlap length of two intervals.
fn overlap_1d(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> f64 {
    (a_max.min(b_max) - a_min.max(b_min)).max(0.0)
}

/// Fraction of `target`'s base area resting on the floor or on `others`.
///
/// Boxes in `others` equal to `target` are ignored.
pub fn support_ratio(target: &Cuboid, others: &[Cuboid]) -> f64 {
    let base_z = target.position.z;
    if base_z <= EPSILON {
        return 1.0;
    }

    let base_area = target.dimensions.x * target.dimensions.y;
    if base_area <= 0.0 {
        return 0.0;
    }

    let target_max = target.max_corner();
    let supported: f64 = others
        .iter()
        .filter(|other| *other != target)
        .filter(|other| (other.max_corner().z - base_z).abs() <= EPSILON)
        .map(|other| {
            let other_max = other.max_corner();
            overlap_1d(
                target.position.x,
                target_max.x,
                other.position.x,
                other_max.x,
            ) * overlap_1d(
                target.position.y,
                target_max.y,
                other.position.y,
                other_max.y,
            )
        })
        .sum();

    // Boxes below never overlap each other, so the sum cannot double count.
    (supported / base_area).min(1.0)
}

/// Returns true if `target` meets `min_ratio`.
pub fn is_supported(target: &Cuboid, others: &[Cuboid], min_ratio: f64) -> bool {
    support_ratio(target, others) + EPSILON >= min_ratio
}

/// Number of boxes in `boxes` whose support falls below `min_ratio`.
pub fn count_unsupported(boxes: &[Cuboid], min_ratio: f64) -> usize {
    boxes
        .iter()
        .filter(|b| !is_supported(b, boxes, min_ratio))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn cuboid(p: [f64; 3], d: [f64; 3]) -> Cuboid {
        Cuboid::new(Vector3::new(p[0], p[1], p[2]), Vector3::new(d[0], d[1], d[2]))
    }

    #[test]
    fn test_floor_is_full_support() {
        let b = cuboid([5.0, 5.0, 0.0], [10.0, 10.0, 10.0]);
        assert_relative_eq!(support_ratio(&b, &[]), 1.0);
    }

    #[test]
    fn test_floating_box_unsupported() {
        let b = cuboid([0.0, 0.0, 10.0], [10.0, 10.0, 10.0]);
        assert_relative_eq!(support_ratio(&b, &[]), 0.0);
    }

    #[test]
    fn test_partial_support() {
        let below = cuboid([0.0, 0.0, 0.0], [5.0, 10.0, 10.0]);
        let above = cuboid([0.0, 0.0, 10.0], [10.0, 10.0, 5.0]);
        assert_relative_eq!(support_ratio(&above, &[below]), 0.5);
        assert!(is_supported(&above, &[below], 0.5));
        assert!(!is_supported(&above, &[below], 0.75));
    }

    #[test]
    fn test_count_unsupported() {
        let boxes = [
            cuboid([0.0, 0.0, 0.0], [10.0, 10.0, 10.0]),
            cuboid([0.0, 0.0, 10.0], [10.0, 10.0, 10.0]),
            cuboid([20.0, 0.0, 10.0], [10.0, 10.0, 10.0]),
        ];
        assert_eq!(count_unsupported(&boxes, 0.8), 1);
    }
}
