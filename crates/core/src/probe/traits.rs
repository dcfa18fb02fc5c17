//! Trait definitions for the probe module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ProbeError;
use super::types::MediaDescription;

/// Something that can describe a media file's structure.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns the name of this prober implementation.
    fn name(&self) -> &str;

    /// Probes a media file.
    async fn probe(&self, path: &Path) -> Result<MediaDescription, ProbeError>;
}
