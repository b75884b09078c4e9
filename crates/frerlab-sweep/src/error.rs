//! Error types for the sweep pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the sweep layer.
///
/// All of these are fatal to the current sweep point and are never retried;
/// the sweep restores the configuration document before propagating them.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("simulator exited with code {exit_code}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    SimulationFailed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("vector export exited with code {exit_code}: {stderr}")]
    ExtractionFailed { exit_code: i32, stderr: String },

    #[error("no result artifact in {}", .dir.display())]
    NoResultArtifact { dir: PathBuf },

    #[error("result artifact not found: {name}")]
    ResultNotFound { name: String },

    #[error("config key {key:?} not found in {}", .path.display())]
    ConfigKeyNotFound { key: String, path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sweep operations.
pub type Result<T> = std::result::Result<T, SweepError>;
