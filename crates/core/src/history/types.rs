use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// A timestamped line of a conversion log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Everything recorded about one conversion job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionLog {
    /// Job identifier.
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub input_path: String,
    pub output_path: String,
    pub preset_id: Option<String>,
    /// Summary of the advanced options, when not using a preset.
    pub advanced_options: Option<String>,
    /// Full engine command line.
    pub command: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub entries: Vec<LogEntry>,
}

impl ConversionLog {
    pub fn new(
        id: impl Into<String>,
        input_path: &Path,
        output_path: &Path,
        command: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            started_at: Utc::now(),
            ended_at: None,
            input_path: input_path.display().to_string(),
            output_path: output_path.display().to_string(),
            preset_id: None,
            advanced_options: None,
            command: command.into(),
            success: false,
            error_message: None,
            entries: Vec::new(),
        }
    }

    pub fn with_preset(mut self, preset_id: Option<&str>) -> Self {
        self.preset_id = preset_id.map(str::to_string);
        self
    }

    pub fn with_advanced(mut self, summary: Option<String>) -> Self {
        self.advanced_options = summary;
        self
    }

    pub fn add_entry(&mut self, level: LogLevel, message: impl Into<String>, context: Option<&str>) {
        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            context: context.map(str::to_string),
        });
    }

    /// Marks the log as finished. Only the first call has an effect.
    pub fn finish(&mut self, success: bool, error_message: Option<String>) {
        if self.ended_at.is_some() {
            return;
        }
        self.ended_at = Some(Utc::now());
        self.success = success;
        self.error_message = error_message;
    }

    /// Plain text rendering used for export and the log file.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Conversion {} ===", self.id);
        let _ = writeln!(out, "Started: {}", self.started_at.format("%Y-%m-%d %H:%M:%S"));
        if let Some(ended) = self.ended_at {
            let _ = writeln!(out, "Ended: {}", ended.format("%Y-%m-%d %H:%M:%S"));
        }
        let _ = writeln!(out, "Input: {}", self.input_path);
        let _ = writeln!(out, "Output: {}", self.output_path);
        if let Some(preset) = &self.preset_id {
            let _ = writeln!(out, "Preset: {}", preset);
        }
        if let Some(advanced) = &self.advanced_options {
            let _ = writeln!(out, "Advanced: {}", advanced);
        }
        let _ = writeln!(out, "Command: {}", self.command);
        let _ = writeln!(out, "Success: {}", self.success);
        if let Some(error) = &self.error_message {
            let _ = writeln!(out, "Error: {}", error);
        }

        out.push_str("\n--- Log Entries ---\n");
        for entry in &self.entries {
            let _ = write!(
                out,
                "[{}] [{}] {}",
                entry.timestamp.format("%H:%M:%S%.3f"),
                entry.level.as_str(),
                entry.message
            );
            if let Some(ctx) = &entry.context {
                let _ = write!(out, " ({})", ctx);
            }
            out.push('\n');
        }
        out.push_str("\n\n");
        out
    }
}
