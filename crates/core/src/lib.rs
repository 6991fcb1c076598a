//! # uldpack core
//!
//! Search framework shared by the container loading engine.
//!
//! The item ordering fed to a deterministic packing engine is the only
//! decision variable; this crate knows nothing about geometry and treats the
//! engine as a fitness oracle behind [`OrderingProblem`].
//!
//! ## Core Components
//!
//! - **Search configuration**: [`SearchConfig`] with a tagged [`Strategy`]
//! - **Runners**: simulated annealing, tabu search, random-key genetic search
//! - **Shared pieces**: swap neighbor operator, best-known tracker
//! - **Collaborator traits**: [`Solver`] for placement engines,
//!   [`SequenceProposer`] for external ordering sources
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod brkga;
pub mod driver;
pub mod error;
pub mod proposer;
pub mod result;
pub mod sa;
pub mod search;
pub mod solver;
pub mod tabu;

// Re-exports
pub use brkga::{BrkgaConfig, BrkgaRunner, RandomKeyChromosome};
pub use driver::run_search;
pub use error::{Error, Result};
pub use proposer::{Proposal, SequenceProposer};
pub use result::SearchOutcome;
pub use sa::{SaConfig, SaRunner};
pub use search::{make_rng, swap_neighbor, BestKnown, OrderingProblem};
pub use solver::{SearchConfig, Solver, Strategy};
pub use tabu::{TabuConfig, TabuList, TabuRunner};
