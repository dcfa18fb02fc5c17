//! Conversion history.
//!
//! Every job leaves one [`ConversionLog`] behind: the command that was run,
//! the outcome and a few timestamped entries. [`LogStore`] keeps the most
//! recent ones in memory and can mirror them to a text file.

mod store;
mod types;

pub use store::{LogStore, LOG_FILE_NAME};
pub use types::{ConversionLog, LogEntry, LogLevel};
