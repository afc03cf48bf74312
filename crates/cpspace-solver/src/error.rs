//! Error types for the exploration adapter

use cpspace_config::ConfigError;
use cpspace_core::{CpsError, PointId};
use thiserror::Error;

/// Caller mistakes the adapter detects cheaply.
///
/// Internal invariant violations (residual size mismatch, evaluating before
/// `setup()`) are not represented here; they panic.
#[derive(Debug, Error)]
pub enum ExplorationError {
    /// A point id that the bound space does not contain.
    #[error("Unknown parametric point: {0}")]
    UnknownPoint(PointId),

    /// The optimized layer does not exist in the bound space.
    #[error("Layer {layer} does not exist ({count} layers)")]
    MissingLayer { layer: usize, count: usize },

    /// A variable slice whose length differs from the variable count.
    #[error("Expected {expected} variables, found {found}")]
    VariablesLength { expected: usize, found: usize },

    /// A subspace mask whose length differs from the point dimension.
    #[error("Subspace mask has {found} entries for points of dimension {expected}")]
    SubspaceLength { expected: usize, found: usize },

    /// A locking index past the end of the movable layer.
    #[error("Locking index {index} out of range for a layer of {count} points")]
    LockIndex { index: usize, count: usize },

    /// An argument outside its valid range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cps(#[from] CpsError),
}

/// Result type alias for exploration operations
pub type Result<T> = std::result::Result<T, ExplorationError>;
