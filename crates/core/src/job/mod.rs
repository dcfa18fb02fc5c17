//! Conversion job control.
//!
//! [`JobController`] runs at most one conversion at a time:
//!
//! ```text
//! Idle --start--> Running --exit 0--------> Completed
//!                    |    --exit != 0-----> Failed
//!                    |    --timeout-------> Failed
//!                    +----cancel----------> Cancelled
//! ```
//!
//! Starting again from a terminal state is allowed. Every job yields zero or
//! more progress events followed by exactly one terminal event on its
//! [`JobHandle`]; the same events are broadcast as [`JobNotification`]s.

mod controller;
mod error;
mod supervisor;
mod types;

pub use controller::JobController;
pub use error::JobError;
pub use types::{JobEvent, JobHandle, JobNotification, JobResult, JobState, JobStatus};
