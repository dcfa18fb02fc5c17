//! Engine progress parsing.
//!
//! The engine reports progress on stderr as a status line that it keeps
//! rewriting with carriage returns:
//!
//! ```text
//! frame=  120 fps= 30 q=28.0 size=     512kB time=00:00:04.00 bitrate=1048.6kbits/s speed=2.01x
//! ```
//!
//! [`ProgressParser`] turns that byte stream into [`ProgressSnapshot`]s and
//! diagnostic lines; [`DiagnosticTail`] keeps the last few diagnostics for
//! failure messages.

mod parser;
mod stream;
mod types;

pub use parser::{parse_timestamp, DiagnosticTail, ProgressParser, DEFAULT_DIAGNOSTIC_LINES};
pub use stream::{parsed_lines, snapshot_stream};
pub use types::{ParsedLine, ProgressSnapshot};
