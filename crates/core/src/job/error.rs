//! Error types for the job module.

use std::path::PathBuf;
use thiserror::Error;

use crate::command::BuildError;
use crate::probe::ProbeError;

/// Reasons a job could not be started.
///
/// Failures after the engine has been launched are not errors: they arrive
/// as the job's terminal event.
#[derive(Debug, Error)]
pub enum JobError {
    /// Another conversion is in flight.
    #[error("A conversion is already running")]
    AlreadyRunning,

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Build(#[from] BuildError),

    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed { path: PathBuf },
}
