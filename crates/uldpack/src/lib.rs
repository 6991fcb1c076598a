//! # uldpack
//!
//! Container loading optimization for unit load devices.
//!
//! This crate provides:
//! - **Packing**: a deterministic four-phase corner-point loader
//! - **Ordering search**: simulated annealing, tabu search and a random-key
//!   genetic algorithm driving the loader as a fitness oracle
//!
//! ## Quick Start
//!
//! ```rust
//! use uldpack::d3::{Container, Item, Packer};
//! use uldpack::{optimize, SearchConfig, Strategy};
//!
//! let items = vec![
//!     Item::new("A", 60.0, 40.0, 40.0).with_weight(12.0).with_cost(30.0),
//!     Item::priority("B", 50.0, 50.0, 50.0).with_weight(20.0),
//! ];
//! let containers = vec![Container::new("AKE1", 150.0, 150.0, 160.0).with_weight_limit(1500.0)];
//!
//! let solution = Packer::default_config().pack(&items, &containers)?;
//! assert_eq!(solution.placed_count(), 2);
//!
//! let config = SearchConfig::new()
//!     .with_strategy(Strategy::tabu())
//!     .with_iterations(5)
//!     .with_seed(1);
//! let result = optimize(&items, &containers, &config)?;
//! assert!(result.best_cost() <= solution.total_cost());
//! # Ok::<(), uldpack::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support

/// Error type, search configuration and the generic search runners.
pub use uldpack_core as core;

/// Geometry, packer, cost and the packing search entry points.
pub use uldpack_d3 as d3;

// Re-export commonly used types at root level
pub use uldpack_core::{Error, Result, SearchConfig, SearchOutcome, Solver, Strategy};
pub use uldpack_d3::{optimize, Container, Item, Optimized, Packer, PackerConfig, Solution};
