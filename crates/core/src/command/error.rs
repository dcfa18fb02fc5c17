//! Error types for the command module.

use std::path::PathBuf;
use thiserror::Error;

/// A request that cannot be turned into an engine invocation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The preset identifier is not in the catalog.
    #[error("Preset not found: {preset_id}")]
    UnknownPreset { preset_id: String },

    /// Advanced mode without any format, codec or extra argument.
    #[error("Nothing to do: advanced mode needs a format, a codec or extra arguments")]
    NothingToDo,

    /// Output would overwrite the input while it is being read.
    #[error("Output path must differ from input path: {path}")]
    SameInputOutput { path: PathBuf },
}
