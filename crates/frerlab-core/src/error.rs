//! Error types for trace reading and metric computation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the trace and metrics layer.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("vector {name:?} not found in {}", .path.display())]
    VectorNotFound { name: String, path: PathBuf },

    #[error("malformed vector {name:?} in {}: {reason}", .path.display())]
    MalformedVector {
        name: String,
        path: PathBuf,
        reason: String,
    },

    #[error("sequence has {len} sample(s); integrity metrics need at least 2")]
    InsufficientData { len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("trace file error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for trace and metrics operations.
pub type Result<T> = std::result::Result<T, TraceError>;
