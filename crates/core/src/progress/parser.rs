//! Incremental parser for the engine's status output.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::collections::{HashMap, VecDeque};

use super::types::{ParsedLine, ProgressSnapshot};

/// Default number of diagnostic lines kept for failure messages.
pub const DEFAULT_DIAGNOSTIC_LINES: usize = 8;

/// Longest unterminated line kept in memory; longer runs are flushed as is.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

// `key=value` pairs; ffmpeg pads some values ("size=     512kB").
static STATUS_FIELD: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\w+)=\s*(\S+)").ok());

const NOT_AVAILABLE: &str = "N/A";

/// Parses `HH:MM:SS.ms` (or plain seconds) into seconds.
///
/// Returns `None` for `N/A` and anything unparseable.
pub fn parse_timestamp(value: &str) -> Option<f64> {
    let value = value.trim();
    let (negative, value) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let parts: Vec<&str> = value.split(':').collect();
    let secs = match parts.as_slice() {
        [h, m, s] => {
            h.parse::<f64>().ok()? * 3600.0 + m.parse::<f64>().ok()? * 60.0 + s.parse::<f64>().ok()?
        }
        [m, s] => m.parse::<f64>().ok()? * 60.0 + s.parse::<f64>().ok()?,
        [s] => s.parse::<f64>().ok()?,
        _ => return None,
    };

    if !secs.is_finite() {
        return None;
    }
    Some(if negative { -secs } else { secs })
}

/// Turns raw engine output into classified lines.
///
/// Bytes may arrive in arbitrary chunks; a line is complete once a `\n` or
/// `\r` is seen (the engine rewrites its status line in place with carriage
/// returns). Within one parser, `percent` and `elapsed_secs` never decrease
/// and `percent` never exceeds 100.
#[derive(Debug, Clone)]
pub struct ProgressParser {
    duration_secs: Option<f64>,
    buffer: Vec<u8>,
    last_elapsed: f64,
    last_percent: f64,
}

impl ProgressParser {
    /// `duration_secs` is the input duration; `None` or a non-positive value
    /// leaves the percentage unknown.
    pub fn new(duration_secs: Option<f64>) -> Self {
        Self {
            duration_secs: duration_secs.filter(|d| d.is_finite() && *d > 0.0),
            buffer: Vec::new(),
            last_elapsed: 0.0,
            last_percent: 0.0,
        }
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    /// Feeds a chunk of output and returns every line it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<ParsedLine> {
        let mut lines = Vec::new();
        for &byte in bytes {
            if byte == b'\n' || byte == b'\r' {
                let raw = std::mem::take(&mut self.buffer);
                if let Some(line) = self.classify(&raw) {
                    lines.push(line);
                }
            } else {
                self.buffer.push(byte);
                if self.buffer.len() >= MAX_LINE_BYTES {
                    let raw = std::mem::take(&mut self.buffer);
                    if let Some(line) = self.classify(&raw) {
                        lines.push(line);
                    }
                }
            }
        }
        lines
    }

    /// Flushes a trailing line without terminator.
    pub fn finish(&mut self) -> Vec<ParsedLine> {
        let raw = std::mem::take(&mut self.buffer);
        self.classify(&raw).into_iter().collect()
    }

    fn classify(&mut self, raw: &[u8]) -> Option<ParsedLine> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match self.parse_status(line) {
            Some(snapshot) => Some(ParsedLine::Status(snapshot)),
            None => Some(ParsedLine::Diagnostic(line.to_string())),
        }
    }

    /// Parses a single status line, `None` when the line has no `time=`.
    pub fn parse_status(&mut self, line: &str) -> Option<ProgressSnapshot> {
        let re = STATUS_FIELD.as_ref()?;

        let fields: HashMap<&str, &str> = re
            .captures_iter(line)
            .filter_map(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
            .collect();

        let time = fields.get("time")?;
        let elapsed = parse_timestamp(time)
            .unwrap_or(self.last_elapsed)
            .max(self.last_elapsed)
            .max(0.0);
        self.last_elapsed = elapsed;

        let percent = match self.duration_secs {
            Some(duration) => {
                let percent = (elapsed / duration * 100.0).min(100.0).max(self.last_percent);
                self.last_percent = percent;
                percent
            }
            None => 0.0,
        };

        let available = |key: &str| {
            fields
                .get(key)
                .filter(|v| **v != NOT_AVAILABLE)
                .map(|v| v.to_string())
        };

        let size_kb = available("size")
            .or_else(|| available("Lsize"))
            .and_then(|size| leading_number(&size));

        Some(ProgressSnapshot {
            percent,
            percent_known: self.duration_secs.is_some(),
            elapsed_secs: elapsed,
            speed: available("speed"),
            bitrate: available("bitrate"),
            size_kb,
        })
    }
}

fn leading_number(value: &str) -> Option<u64> {
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Bounded tail of the most recent diagnostic lines.
#[derive(Debug, Clone)]
pub struct DiagnosticTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for DiagnosticTail {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGNOSTIC_LINES)
    }
}

impl DiagnosticTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Human readable failure reason.
    ///
    /// Lines that look like errors win; otherwise the whole tail is used.
    pub fn failure_message(&self) -> Option<String> {
        let errors: Vec<&str> = self.lines().filter(|l| looks_like_error(l)).collect();
        let chosen: Vec<&str> = if errors.is_empty() {
            self.lines().collect()
        } else {
            errors
        };

        if chosen.is_empty() {
            None
        } else {
            Some(chosen.join("\n"))
        }
    }
}

fn looks_like_error(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    ["error", "invalid", "no such file", "not found", "unknown encoder", "failed"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str =
        "frame=  120 fps= 30 q=28.0 size=     512kB time=00:00:04.00 bitrate=1048.6kbits/s speed=2.01x";

    fn statuses(lines: Vec<ParsedLine>) -> Vec<ProgressSnapshot> {
        lines
            .into_iter()
            .filter_map(|l| match l {
                ParsedLine::Status(s) => Some(s),
                ParsedLine::Diagnostic(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:00:04.00"), Some(4.0));
        assert_eq!(parse_timestamp("01:02:03.50"), Some(3723.5));
        assert_eq!(parse_timestamp("02:30"), Some(150.0));
        assert_eq!(parse_timestamp("12.5"), Some(12.5));
        assert_eq!(parse_timestamp("-00:00:00.02"), Some(-0.02));
        assert_eq!(parse_timestamp("N/A"), None);
        assert_eq!(parse_timestamp("aa:bb:cc"), None);
        assert_eq!(parse_timestamp("1:2:3:4"), None);
    }

    #[test]
    fn test_full_status_line() {
        let mut parser = ProgressParser::new(Some(10.0));
        let snapshot = parser.parse_status(STATUS).unwrap();

        assert_eq!(snapshot.elapsed_secs, 4.0);
        assert!((snapshot.percent - 40.0).abs() < 1e-9);
        assert!(snapshot.percent_known);
        assert_eq!(snapshot.speed.as_deref(), Some("2.01x"));
        assert_eq!(snapshot.bitrate.as_deref(), Some("1048.6kbits/s"));
        assert_eq!(snapshot.size_kb, Some(512));
    }

    #[test]
    fn test_status_with_missing_and_na_fields() {
        let mut parser = ProgressParser::new(Some(10.0));
        let snapshot = parser
            .parse_status("size=N/A time=00:00:01.00 bitrate=N/A")
            .unwrap();
        assert_eq!(snapshot.elapsed_secs, 1.0);
        assert!(snapshot.speed.is_none());
        assert!(snapshot.bitrate.is_none());
        assert!(snapshot.size_kb.is_none());

        let snapshot = parser.parse_status("Lsize=    2048KiB time=00:00:02.00").unwrap();
        assert_eq!(snapshot.size_kb, Some(2048));
    }

    #[test]
    fn test_line_without_time_is_diagnostic() {
        let mut parser = ProgressParser::new(Some(10.0));
        let lines = parser.push(b"Input #0, mov,mp4,m4a, from 'clip.mp4':\n");
        assert_eq!(
            lines,
            vec![ParsedLine::Diagnostic(
                "Input #0, mov,mp4,m4a, from 'clip.mp4':".to_string()
            )]
        );
        assert!(parser.parse_status("frame=1 fps=0.0").is_none());
    }

    #[test]
    fn test_carriage_return_status_split_across_reads() {
        let mut parser = ProgressParser::new(Some(8.0));

        assert!(parser.push(b"frame=1 time=00:00:0").is_empty());
        let first = statuses(parser.push(b"2.00 speed=1x\rframe=2 ti"));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].elapsed_secs, 2.0);

        let second = statuses(parser.push(b"me=00:00:04.00 speed=1x\r"));
        assert_eq!(second.len(), 1);
        assert!((second[0].percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_finish_flushes_trailing_line() {
        let mut parser = ProgressParser::new(None);
        assert!(parser.push(b"time=00:00:03.00").is_empty());
        let rest = statuses(parser.finish());
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].elapsed_secs, 3.0);
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn test_unknown_duration_keeps_percent_zero() {
        let mut parser = ProgressParser::new(None);
        let snapshot = parser.parse_status("time=00:01:00.00").unwrap();
        assert_eq!(snapshot.percent, 0.0);
        assert!(!snapshot.percent_known);
        assert_eq!(snapshot.elapsed_secs, 60.0);

        let parser = ProgressParser::new(Some(0.0));
        assert!(parser.duration_secs().is_none());
    }

    #[test]
    fn test_percent_monotonic_and_capped() {
        let mut parser = ProgressParser::new(Some(10.0));
        let times = ["00:00:02.00", "00:00:05.00", "00:00:03.00", "N/A", "00:00:12.00", "00:00:09.00"];

        let mut previous = 0.0;
        for time in times {
            let snapshot = parser.parse_status(&format!("time={time}")).unwrap();
            assert!(snapshot.percent >= previous);
            assert!(snapshot.percent <= 100.0);
            previous = snapshot.percent;
        }
        assert_eq!(previous, 100.0);
    }

    #[test]
    fn test_negative_time_clamped() {
        let mut parser = ProgressParser::new(Some(10.0));
        let snapshot = parser.parse_status("time=-00:00:00.05").unwrap();
        assert_eq!(snapshot.elapsed_secs, 0.0);
        assert_eq!(snapshot.percent, 0.0);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut parser = ProgressParser::new(None);
        assert!(parser.push(b"\r\n\n  \r").is_empty());
    }

    #[test]
    fn test_unterminated_output_is_flushed_at_cap() {
        let mut parser = ProgressParser::new(None);
        let junk = vec![b'x'; MAX_LINE_BYTES * 2 + 10];

        let lines = parser.push(&junk);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            match line {
                ParsedLine::Diagnostic(text) => assert_eq!(text.len(), MAX_LINE_BYTES),
                other => panic!("expected a diagnostic, got {other:?}"),
            }
        }
        assert!(parser.buffer.len() < MAX_LINE_BYTES);

        // the remainder is still a normal trailing line
        match parser.finish().as_slice() {
            [ParsedLine::Diagnostic(text)] => assert_eq!(text.len(), 10),
            other => panic!("expected the remainder, got {other:?}"),
        }
    }

    #[test]
    fn test_diagnostic_tail_is_bounded() {
        let mut tail = DiagnosticTail::new(3);
        for i in 0..5 {
            tail.push(format!("line {i}"));
        }
        let lines: Vec<_> = tail.lines().collect();
        assert_eq!(lines, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_failure_message_prefers_errors() {
        let mut tail = DiagnosticTail::new(8);
        tail.push("Stream mapping:");
        tail.push("Unknown encoder 'libfoo'");
        tail.push("Conversion failed!");
        assert_eq!(
            tail.failure_message().as_deref(),
            Some("Unknown encoder 'libfoo'\nConversion failed!")
        );

        let mut tail = DiagnosticTail::new(8);
        tail.push("something odd");
        assert_eq!(tail.failure_message().as_deref(), Some("something odd"));

        assert!(DiagnosticTail::default().failure_message().is_none());
    }
}
