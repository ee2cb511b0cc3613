//! Error taxonomy for the service core.
//!
//! Every fallible core operation returns one of these kinds so callers can
//! distinguish what went wrong; the HTTP layer maps each kind to a transport
//! status exactly once, at the edge.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceError {
    /// The external embedding component failed or returned an unrecognized
    /// shape. Never retried automatically.
    #[error("feature extraction failed: {0}")]
    Extraction(String),

    /// A vector's length disagrees with the store's established dimension,
    /// on registration or on query.
    #[error("dimension mismatch: store holds {expected}-dimensional embeddings, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The durable snapshot write failed. The in-memory store keeps its
    /// pre-call state.
    #[error("failed to persist snapshot '{path}': {reason}")]
    Persistence { path: String, reason: String },

    /// The durable snapshot exists but could not be reconstructed. Fatal at
    /// startup; data is never silently discarded.
    #[error("corrupt snapshot '{path}': {reason}")]
    CorruptSnapshot { path: String, reason: String },
}

impl FaceError {
    /// Stable machine-readable kind, used in error response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            FaceError::Extraction(_) => "extraction_failure",
            FaceError::DimensionMismatch { .. } => "dimension_mismatch",
            FaceError::Persistence { .. } => "persistence_failure",
            FaceError::CorruptSnapshot { .. } => "corrupt_snapshot",
        }
    }
}
