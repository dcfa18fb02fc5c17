//! Mock prober for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::probe::{MediaDescription, ProbeError, Prober};

/// Mock implementation of the Prober trait.
///
/// - Returns pre-configured descriptions by path
/// - Falls back to a default description, or `InputNotFound`
/// - Can fail the next call with a given error
/// - Records every probed path
#[derive(Debug, Default)]
pub struct MockProber {
    results: Arc<RwLock<HashMap<PathBuf, MediaDescription>>>,
    default_result: Arc<RwLock<Option<MediaDescription>>>,
    next_error: Arc<RwLock<Option<ProbeError>>>,
    calls: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prober answering every path with `media`.
    pub fn with_default(media: MediaDescription) -> Self {
        Self {
            default_result: Arc::new(RwLock::new(Some(media))),
            ..Self::default()
        }
    }

    pub async fn set_result(&self, path: impl AsRef<Path>, media: MediaDescription) {
        self.results
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), media);
    }

    pub async fn set_default(&self, media: MediaDescription) {
        *self.default_result.write().await = Some(media);
    }

    /// Makes the next probe fail with `error`.
    pub async fn fail_next(&self, error: ProbeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Paths probed so far, in call order.
    pub async fn calls(&self) -> Vec<PathBuf> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl Prober for MockProber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaDescription, ProbeError> {
        self.calls.write().await.push(path.to_path_buf());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if let Some(media) = self.results.read().await.get(path) {
            return Ok(media.clone());
        }

        self.default_result
            .read()
            .await
            .clone()
            .ok_or_else(|| ProbeError::InputNotFound {
                path: path.to_path_buf(),
            })
    }
}
