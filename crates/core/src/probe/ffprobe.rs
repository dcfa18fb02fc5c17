//! FFprobe-based prober implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use super::error::ProbeError;
use super::traits::Prober;
use super::types::{ContainerInfo, MediaDescription, MediaStream, StreamKind};
use crate::command::absolute;
use crate::config::EngineConfig;
use crate::metrics::PROBES_TOTAL;

/// Runs `ffprobe` and turns its JSON report into a [`MediaDescription`].
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            ffprobe_path: config.ffprobe_path.clone(),
        }
    }

    /// Creates a prober with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(&EngineConfig::default())
    }

    /// Parses ffprobe JSON output into a MediaDescription.
    ///
    /// The description always carries the absolute form of `path`.
    pub(crate) fn parse_probe_output(
        path: &Path,
        output: &str,
    ) -> Result<MediaDescription, ProbeError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: Option<ProbeFormat>,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: Option<String>,
            format_long_name: Option<String>,
            duration: Option<String>,
            size: Option<String>,
            bit_rate: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            index: Option<u32>,
            codec_type: Option<String>,
            codec_name: Option<String>,
            codec_long_name: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
            r_frame_rate: Option<String>,
            pix_fmt: Option<String>,
            sample_rate: Option<String>,
            channels: Option<u32>,
            channel_layout: Option<String>,
            #[serde(default)]
            tags: HashMap<String, String>,
        }

        fn tag(tags: &HashMap<String, String>, key: &str) -> Option<String> {
            tags.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.clone())
        }

        let probe: ProbeOutput = serde_json::from_str(output)
            .map_err(|e| ProbeError::parse_failed(e.to_string()))?;

        let format = probe
            .format
            .ok_or_else(|| ProbeError::parse_failed("missing format section"))?;

        let container = ContainerInfo {
            format_name: format.format_name.unwrap_or_default(),
            format_long_name: format.format_long_name.unwrap_or_default(),
            duration_secs: format
                .duration
                .and_then(|d| d.parse::<f64>().ok())
                .filter(|d| d.is_finite() && *d >= 0.0),
            size_bytes: format.size.and_then(|s| s.parse().ok()),
            bit_rate: format.bit_rate.and_then(|b| b.parse().ok()),
        };

        let streams = probe
            .streams
            .into_iter()
            .enumerate()
            .map(|(position, s)| MediaStream {
                index: s.index.unwrap_or(position as u32),
                kind: StreamKind::from_codec_type(s.codec_type.as_deref().unwrap_or_default()),
                codec_name: s.codec_name,
                codec_long_name: s.codec_long_name,
                width: s.width,
                height: s.height,
                frame_rate: s.r_frame_rate,
                pix_fmt: s.pix_fmt,
                sample_rate: s.sample_rate.and_then(|r| r.parse().ok()),
                channels: s.channels,
                channel_layout: s.channel_layout,
                language: tag(&s.tags, "language"),
                title: tag(&s.tags, "title"),
            })
            .collect();

        Ok(MediaDescription::new(absolute(path), container, streams))
    }

    async fn run_probe(&self, path: &Path) -> Result<MediaDescription, ProbeError> {
        if !path.exists() {
            return Err(ProbeError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::EngineNotFound {
                        path: self.ffprobe_path.clone(),
                    }
                } else {
                    ProbeError::execution_failed(e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = if stderr.trim().is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr.trim().to_string()
            };
            return Err(ProbeError::execution_failed(reason));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, &stdout)
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> Result<MediaDescription, ProbeError> {
        let result = self.run_probe(path).await;

        let label = match &result {
            Ok(media) => {
                debug!(
                    path = %path.display(),
                    streams = media.streams().len(),
                    duration = ?media.duration_secs(),
                    "Probed media file"
                );
                "ok"
            }
            Err(ProbeError::InputNotFound { .. }) => "not_found",
            Err(ProbeError::EngineNotFound { .. }) => "engine_missing",
            Err(e) => {
                warn!(path = %path.display(), "Probe failed: {}", e);
                "failed"
            }
        };
        PROBES_TOTAL.with_label_values(&[label]).inc();

        result
    }
}
