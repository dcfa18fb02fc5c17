//! Engine availability check.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::EngineConfig;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The binary could not be run, or did not answer `-version`.
    #[error("Engine not available at {path}: {detail}")]
    NotFound { path: PathBuf, detail: String },
}

/// First line of each engine's `-version` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineVersions {
    pub ffmpeg: String,
    pub ffprobe: String,
}

/// Verifies that both ffmpeg and ffprobe can be invoked.
pub async fn check_engine(config: &EngineConfig) -> Result<EngineVersions, EngineError> {
    let ffmpeg = version_line(&config.ffmpeg_path).await?;
    let ffprobe = version_line(&config.ffprobe_path).await?;

    debug!(%ffmpeg, %ffprobe, "Engine check passed");
    Ok(EngineVersions { ffmpeg, ffprobe })
}

async fn version_line(path: &Path) -> Result<String, EngineError> {
    let not_found = |detail: String| EngineError::NotFound {
        path: path.to_path_buf(),
        detail,
    };

    let output = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            warn!(path = %path.display(), "Failed to run engine: {}", e);
            not_found(e.to_string())
        })?;

    if !output.status.success() {
        return Err(not_found(format!("-version exited with {}", output.status)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
        .ok_or_else(|| not_found("empty -version output".to_string()))
}
