//! Types for the job module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::progress::ProgressSnapshot;

/// Lifecycle state of the conversion slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Terminal outcome of a job, produced exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: String,
    pub success: bool,
    pub output_path: PathBuf,
    /// Wall-clock duration of the run, in seconds.
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Something that happened to a job.
///
/// Zero or more `Progress` events are followed by exactly one terminal
/// event, after which the channel closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum JobEvent {
    Progress(ProgressSnapshot),
    Completed(JobResult),
    Failed(JobResult),
    Cancelled(JobResult),
}

impl JobEvent {
    pub(crate) fn terminal(state: JobState, result: JobResult) -> Self {
        match state {
            JobState::Completed => Self::Completed(result),
            JobState::Cancelled => Self::Cancelled(result),
            _ => Self::Failed(result),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }

    /// The terminal result, `None` for progress.
    pub fn result(&self) -> Option<&JobResult> {
        match self {
            Self::Progress(_) => None,
            Self::Completed(r) | Self::Failed(r) | Self::Cancelled(r) => Some(r),
        }
    }
}

/// A job event tagged with its job, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobNotification {
    pub job_id: String,
    #[serde(flatten)]
    pub event: JobEvent,
}

/// Snapshot of the controller for status queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStatus {
    pub state: JobState,
    /// Current job when running, otherwise the last finished one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

/// Receiving end of one job's events.
#[derive(Debug)]
pub struct JobHandle {
    id: String,
    output_path: PathBuf,
    events: mpsc::Receiver<JobEvent>,
}

impl JobHandle {
    pub(crate) fn new(id: String, output_path: PathBuf, events: mpsc::Receiver<JobEvent>) -> Self {
        Self {
            id,
            output_path,
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Next event, `None` once the terminal event has been consumed.
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        self.events.recv().await
    }

    /// Skips progress and returns the terminal event.
    pub async fn wait(mut self) -> Option<JobEvent> {
        while let Some(event) = self.events.recv().await {
            if event.is_terminal() {
                return Some(event);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> JobResult {
        JobResult {
            job_id: "j1".to_string(),
            success: true,
            output_path: PathBuf::from("/out.mkv"),
            duration_secs: 1.5,
            message: None,
        }
    }

    #[test]
    fn test_terminal_mapping() {
        assert!(matches!(
            JobEvent::terminal(JobState::Completed, result()),
            JobEvent::Completed(_)
        ));
        assert!(matches!(
            JobEvent::terminal(JobState::Cancelled, result()),
            JobEvent::Cancelled(_)
        ));
        assert!(matches!(
            JobEvent::terminal(JobState::Failed, result()),
            JobEvent::Failed(_)
        ));
    }

    #[test]
    fn test_notification_serialization() {
        let notification = JobNotification {
            job_id: "j1".to_string(),
            event: JobEvent::Completed(result()),
        };
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["job_id"], "j1");
        assert_eq!(json["type"], "completed");
        assert_eq!(json["data"]["output_path"], "/out.mkv");
        assert!(json["data"].get("message").is_none());
    }

    #[test]
    fn test_state_terminal() {
        assert!(!JobState::Idle.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
        assert_eq!(JobState::default(), JobState::Idle);
    }

    #[tokio::test]
    async fn test_handle_wait_skips_progress() {
        let (tx, rx) = mpsc::channel(4);
        let handle = JobHandle::new("j1".to_string(), PathBuf::from("/out.mkv"), rx);

        tx.send(JobEvent::Progress(ProgressSnapshot {
            percent: 10.0,
            percent_known: true,
            elapsed_secs: 1.0,
            speed: None,
            bitrate: None,
            size_kb: None,
        }))
        .await
        .unwrap();
        tx.send(JobEvent::Completed(result())).await.unwrap();
        drop(tx);

        assert_eq!(handle.wait().await, Some(JobEvent::Completed(result())));
    }
}
