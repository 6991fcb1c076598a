//! Error types for uldpack.

use thiserror::Error;

/// Result type alias for uldpack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading containers or searching orderings.
///
/// An item that simply does not fit anywhere is *not* an error: it stays
/// unassigned and is charged through the cost function.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid item provided (non-positive dimension, negative weight, ...).
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Invalid container provided.
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A finished solution breaks a geometric or capacity invariant.
    ///
    /// Only produced by the post-hoc audit. The solution must not be used.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// An external collaborator (exact solver, sequence proposer) failed.
    #[error("Collaborator failed: {0}")]
    Collaborator(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
