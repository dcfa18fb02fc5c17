//! Error types for the probe module.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a file could not be probed.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Input file does not exist.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// FFprobe binary could not be invoked.
    #[error("FFprobe not found at path: {path}")]
    EngineNotFound { path: PathBuf },

    /// FFprobe ran but reported a failure.
    #[error("FFprobe failed: {reason}")]
    ExecutionFailed { reason: String },

    /// FFprobe output was not a usable media description.
    #[error("Failed to parse ffprobe output: {reason}")]
    ParseFailed { reason: String },
}

impl ProbeError {
    /// Creates a new execution failed error.
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new parse failed error.
    pub fn parse_failed(reason: impl Into<String>) -> Self {
        Self::ParseFailed {
            reason: reason.into(),
        }
    }

    /// Whether the failure is due to the environment rather than the file.
    pub fn is_engine_missing(&self) -> bool {
        matches!(self, Self::EngineNotFound { .. })
    }
}
