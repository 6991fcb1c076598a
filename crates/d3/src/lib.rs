//! # uldpack 3D
//!
//! Corner-point container loading for uldpack.
//!
//! Items are axis-aligned boxes with six possible orientations, a weight, a
//! cost and a priority class. The [`Packer`] assigns them to containers in
//! four deterministic phases, and [`optimize`] searches for the item ordering
//! that minimizes `Σ unplaced cost + penalty × priority containers`.

pub mod boundary;
pub mod cost;
pub mod extreme_point;
pub mod geometry;
pub mod hints;
pub mod optimizer;
pub mod packer;
pub mod policy;
pub mod solution;
pub mod stability;

// Re-exports
pub use boundary::Container;
pub use cost::{total_cost, utilization, ContainerReport, CostBreakdown, UtilizationReport};
pub use extreme_point::CornerSet;
pub use geometry::{Cuboid, Item, Orientation, PriorityClass, EPSILON, PRIORITY_COST};
pub use hints::{relative_position_hints, ExactSolver, ItemHint, PairHint, WarmStart};
pub use optimizer::{
    optimize, optimize_with, propose_and_score, score_proposal, search_packer_config,
    sweep_container_orderings, Optimized, PackingProblem, MAX_SWEEP_ORDERINGS,
};
pub use packer::{Packer, PackerConfig, DEFAULT_PRIORITY_PENALTY};
pub use policy::{container_order, ordering_count, DensityScoring, ItemOrder, ItemScoring};
pub use solution::{Placement, PlacementRow, Solution, UNASSIGNED};
pub use uldpack_core::{Error, Result, SearchConfig, Solver, Strategy};
