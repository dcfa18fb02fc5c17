//! Types for the progress module.

use serde::{Deserialize, Serialize};

/// Progress of a running conversion, derived from one engine status line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Completion in percent (0.0 - 100.0). Stays at 0 when the input
    /// duration is unknown.
    pub percent: f64,
    /// Whether `percent` is backed by a known input duration.
    pub percent_known: bool,
    /// Media time processed so far, in seconds.
    pub elapsed_secs: f64,
    /// Processing speed relative to real time (e.g. "2.3x").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    /// Current output bitrate (e.g. "1200.0kbits/s").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    /// Output size written so far, in KB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_kb: Option<u64>,
}

/// One line of engine diagnostic output, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// A status line carrying a `time=` field.
    Status(ProgressSnapshot),
    /// Anything else: banners, warnings, errors.
    Diagnostic(String),
}
