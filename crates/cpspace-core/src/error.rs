//! Error types for cpspace

use thiserror::Error;

/// Result-coded failures reported by bulk operations on a parameter space.
///
/// Every operation returning this error leaves the space untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpsError {
    /// Caller supplied an invalid argument (bad layer, empty batch, unknown id).
    #[error("Bad argument: {0}")]
    BadArg(String),

    /// Strict creation found an entity that already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A lookup did not find what it was asked for.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation is not valid for the current state.
    #[error("Invalid operation: {0}")]
    Invalid(String),

    /// An allocation could not be satisfied.
    #[error("Out of memory")]
    OutOfMemory,
}

/// Result type alias for cpspace operations
pub type Result<T> = std::result::Result<T, CpsError>;
