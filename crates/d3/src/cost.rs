//! Objective function and utilization metrics.

use crate::boundary::Container;
use crate::geometry::Item;
use crate::solution::Solution;
use crate::stability::count_unsupported;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Objective value of a solution.
///
/// `Σ cost of unplaced items + penalty × containers holding priority items`.
pub fn total_cost(solution: &Solution, items: &[Item], priority_penalty: f64) -> f64 {
    CostBreakdown::compute(solution, items, priority_penalty).total
}

/// The two terms of the objective.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostBreakdown {
    /// Sum of the costs of unplaced items.
    pub unplaced_cost: f64,
    /// Containers holding at least one priority item.
    pub priority_containers: usize,
    /// Penalty charged per priority container.
    pub priority_penalty: f64,
    /// Objective value.
    pub total: f64,
}

impl CostBreakdown {
    /// Computes both terms.
    pub fn compute(solution: &Solution, items: &[Item], priority_penalty: f64) -> Self {
        let unplaced_cost: f64 = solution
            .unassigned()
            .into_iter()
            .filter_map(|i| items.get(i))
            .map(Item::cost)
            .sum();
        let priority_containers = solution.priority_container_count(items);
        Self {
            unplaced_cost,
            priority_containers,
            priority_penalty,
            total: unplaced_cost + priority_penalty * priority_containers as f64,
        }
    }
}

/// Read-only metrics of one container.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerReport {
    /// Container identifier.
    pub container_id: String,
    /// Number of items loaded.
    pub item_count: usize,
    /// Volume taken by loaded items.
    pub used_volume: f64,
    /// Free volume as a percentage of the container volume.
    pub free_volume_pct: f64,
    /// Weight loaded.
    pub used_weight: f64,
    /// Free weight as a percentage of the limit (None when unlimited).
    pub free_weight_pct: Option<f64>,
    /// Whether a priority item is loaded.
    pub is_priority: bool,
    /// Weight-weighted center of the loaded items (None when weightless).
    pub center_of_mass: Option<Vector3<f64>>,
    /// Items whose base support falls below the reporting threshold.
    pub unsupported_items: usize,
}

/// Read-only metrics of a whole solution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UtilizationReport {
    /// Per-container metrics, in input order.
    pub containers: Vec<ContainerReport>,
    /// Free volume over all containers, in percent.
    pub free_volume_pct: f64,
    /// Free weight over containers with a limit, in percent.
    pub free_weight_pct: Option<f64>,
    /// Number of items.
    pub total_items: usize,
    /// Number of placed items.
    pub placed_items: usize,
    /// Number of priority items.
    pub priority_total: usize,
    /// Number of placed priority items.
    pub priority_taken: usize,
    /// Number of economy items.
    pub economy_total: usize,
    /// Number of placed economy items.
    pub economy_taken: usize,
    /// Objective terms.
    pub cost: CostBreakdown,
}

/// Support fraction used when counting unsupported items in reports.
pub const REPORT_SUPPORT_RATIO: f64 = 1.0;

/// Builds the utilization report. Has no effect on the solution.
pub fn utilization(
    solution: &Solution,
    items: &[Item],
    containers: &[Container],
    priority_penalty: f64,
) -> UtilizationReport {
    let mut reports = Vec::with_capacity(containers.len());
    let mut total_volume = 0.0;
    let mut used_volume_all = 0.0;
    let mut limit_all = 0.0;
    let mut limited_weight = 0.0;
    let mut any_limit = false;

    for (c, container) in containers.iter().enumerate() {
        let loaded = solution.items_in(c);
        let used_volume: f64 = loaded.iter().map(|&i| items[i].volume()).sum();
        let used_weight: f64 = loaded.iter().map(|&i| items[i].weight()).sum();

        let mut moment = Vector3::zeros();
        for &i in loaded {
            if let Some(p) = solution.placement(i) {
                moment += p.cuboid().center() * items[i].weight();
            }
        }
        let center_of_mass = (used_weight > 0.0).then(|| moment / used_weight);

        let free_weight_pct = container.weight_limit().map(|limit| {
            any_limit = true;
            limit_all += limit;
            limited_weight += used_weight;
            percent_free(limit, used_weight)
        });

        total_volume += container.volume();
        used_volume_all += used_volume;

        reports.push(ContainerReport {
            container_id: container.id().to_string(),
            item_count: loaded.len(),
            used_volume,
            free_volume_pct: percent_free(container.volume(), used_volume),
            used_weight,
            free_weight_pct,
            is_priority: solution.is_priority(c, items),
            center_of_mass,
            unsupported_items: count_unsupported(&solution.boxes_in(c), REPORT_SUPPORT_RATIO),
        });
    }

    let count = |priority: bool| {
        let total = items.iter().filter(|it| it.is_priority() == priority).count();
        let taken = items
            .iter()
            .enumerate()
            .filter(|(i, it)| it.is_priority() == priority && solution.is_placed(*i))
            .count();
        (total, taken)
    };
    let (priority_total, priority_taken) = count(true);
    let (economy_total, economy_taken) = count(false);

    UtilizationReport {
        containers: reports,
        free_volume_pct: percent_free(total_volume, used_volume_all),
        free_weight_pct: any_limit.then(|| percent_free(limit_all, limited_weight)),
        total_items: items.len(),
        placed_items: solution.placed_count(),
        priority_total,
        priority_taken,
        economy_total,
        economy_taken,
        cost: CostBreakdown::compute(solution, items, priority_penalty),
    }
}

fn percent_free(capacity: f64, used: f64) -> f64 {
    if capacity > 0.0 {
        (capacity - used) / capacity * 100.0
    } else {
        0.0
    }
}
