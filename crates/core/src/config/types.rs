use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    7878
}

/// Transcoding/probing engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to the ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Grace period between the quit request and a forced kill on cancel.
    #[serde(default = "default_cancel_grace_ms")]
    pub cancel_grace_ms: u64,

    /// Minimum interval between two progress events of the same job.
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Upper bound for a single conversion, unbounded when unset.
    #[serde(default)]
    pub job_timeout_secs: Option<u64>,

    /// Number of trailing diagnostic lines kept for failure messages.
    #[serde(default = "default_diagnostic_lines")]
    pub diagnostic_lines: usize,

    /// Capacity of the per-job event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_cancel_grace_ms() -> u64 {
    3000
}

fn default_progress_interval_ms() -> u64 {
    250
}

fn default_diagnostic_lines() -> usize {
    8
}

fn default_event_buffer() -> usize {
    64
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            cancel_grace_ms: default_cancel_grace_ms(),
            progress_interval_ms: default_progress_interval_ms(),
            job_timeout_secs: None,
            diagnostic_lines: default_diagnostic_lines(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl EngineConfig {
    /// Creates a config pointing at custom ffmpeg/ffprobe binaries.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    /// Sets the cancel grace period in milliseconds.
    pub fn with_cancel_grace_ms(mut self, grace_ms: u64) -> Self {
        self.cancel_grace_ms = grace_ms;
        self
    }

    /// Sets the progress throttle interval in milliseconds.
    pub fn with_progress_interval_ms(mut self, interval_ms: u64) -> Self {
        self.progress_interval_ms = interval_ms;
        self
    }

    /// Sets the per-job timeout in seconds.
    pub fn with_job_timeout(mut self, timeout_secs: u64) -> Self {
        self.job_timeout_secs = Some(timeout_secs);
        self
    }

    pub fn cancel_grace(&self) -> Duration {
        Duration::from_millis(self.cancel_grace_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_secs.map(Duration::from_secs)
    }
}

/// Conversion log retention.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogsConfig {
    /// Number of conversion logs kept in memory.
    #[serde(default = "default_max_logs")]
    pub max_logs: usize,
    /// Directory of the append-only conversion log file, disabled when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_max_logs() -> usize {
    50
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            max_logs: default_max_logs(),
            log_dir: None,
        }
    }
}

/// Process-level logging output.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
}
