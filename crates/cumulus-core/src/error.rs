//! Error types for cumulus.

use thiserror::Error;

use crate::lifecycle::Stage;

/// The main error type for cumulus operations.
#[derive(Error, Debug)]
pub enum CumulusError {
    /// Grid resolution must be at least one voxel per axis.
    #[error("invalid grid resolution {0} - must be at least 1")]
    InvalidResolution(u32),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A permutation table was not a permutation of 0..=255.
    #[error("invalid permutation table: {0}")]
    InvalidPermutation(String),

    /// The renderer lifecycle was asked to move somewhere it cannot go.
    #[error("invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidTransition { from: Stage, to: Stage },

    /// Rendering error.
    #[error("render error: {0}")]
    RenderError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for cumulus operations.
pub type Result<T> = std::result::Result<T, CumulusError>;
