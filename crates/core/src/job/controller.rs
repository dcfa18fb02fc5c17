//! The single-slot conversion controller.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::time::{timeout, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use super::error::JobError;
use super::supervisor::Supervisor;
use super::types::{JobHandle, JobNotification, JobState, JobStatus};
use crate::command::{absolute, build_args, command_line, ConversionRequest};
use crate::config::EngineConfig;
use crate::history::{ConversionLog, LogStore};
use crate::probe::{MediaDescription, Prober};
use crate::progress::ProgressParser;

/// The controller's view of the current (or last) job.
#[derive(Debug, Default)]
pub(crate) struct JobSlot {
    state: JobState,
    job_id: Option<String>,
    cancel: Option<oneshot::Sender<()>>,
}

impl JobSlot {
    fn begin(&mut self, job_id: String, cancel: oneshot::Sender<()>) {
        self.state = JobState::Running;
        self.job_id = Some(job_id);
        self.cancel = Some(cancel);
    }

    /// Leaves `Running`. Ignored unless `job_id` is the running job.
    pub(crate) fn finish(&mut self, job_id: &str, state: JobState) {
        if self.state == JobState::Running && self.job_id.as_deref() == Some(job_id) {
            self.state = state;
            self.cancel = None;
        }
    }
}

/// Owns the one in-flight conversion.
///
/// Each job runs under its own supervisor task, which is the only place that
/// moves the slot out of `Running`. Callers only ever see events.
pub struct JobController {
    config: EngineConfig,
    prober: Arc<dyn Prober>,
    logs: Arc<LogStore>,
    slot: Arc<Mutex<JobSlot>>,
    notifications: broadcast::Sender<JobNotification>,
}

impl JobController {
    pub fn new(config: EngineConfig, prober: Arc<dyn Prober>, logs: Arc<LogStore>) -> Self {
        let (notifications, _) = broadcast::channel(config.event_buffer.max(1));
        Self {
            config,
            prober,
            logs,
            slot: Arc::new(Mutex::new(JobSlot::default())),
            notifications,
        }
    }

    pub fn logs(&self) -> &Arc<LogStore> {
        &self.logs
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Events of every job, tagged with the job id.
    pub fn subscribe(&self) -> broadcast::Receiver<JobNotification> {
        self.notifications.subscribe()
    }

    pub async fn state(&self) -> JobState {
        self.slot.lock().await.state
    }

    pub async fn is_running(&self) -> bool {
        self.state().await == JobState::Running
    }

    pub async fn status(&self) -> JobStatus {
        let slot = self.slot.lock().await;
        JobStatus {
            state: slot.state,
            job_id: slot.job_id.clone(),
        }
    }

    /// Probes the input, then starts the conversion.
    pub async fn start(&self, request: ConversionRequest) -> Result<JobHandle, JobError> {
        // fail fast without paying for a probe
        if self.is_running().await {
            return Err(JobError::AlreadyRunning);
        }

        let media = self.prober.probe(&request.input_path).await?;
        self.start_with_media(request, &media).await
    }

    /// Starts the conversion against an already probed input.
    ///
    /// Returns as soon as the engine has been launched. Launch failures are
    /// reported as the job's `Failed` event.
    pub async fn start_with_media(
        &self,
        request: ConversionRequest,
        media: &MediaDescription,
    ) -> Result<JobHandle, JobError> {
        let mut slot = self.slot.lock().await;
        if slot.state == JobState::Running {
            return Err(JobError::AlreadyRunning);
        }

        let args = build_args(&request, media)?;
        let output_path = absolute(&request.output_path);

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|_| {
                JobError::OutputDirectoryFailed {
                    path: parent.to_path_buf(),
                }
            })?;
        }

        let job_id = Uuid::new_v4().to_string();
        let command = command_line(&self.config.ffmpeg_path.to_string_lossy(), &args);
        debug!(job_id = %job_id, %command, "Launching engine");

        let log = ConversionLog::new(&job_id, &request.input_path, &output_path, command)
            .with_preset(request.mode.preset_id())
            .with_advanced(request.mode.advanced().map(|o| o.summary()));

        let spawned = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let (event_tx, event_rx) = mpsc::channel(self.config.event_buffer.max(1));
        let (cancel_tx, cancel_rx) = oneshot::channel();
        slot.begin(job_id.clone(), cancel_tx);
        drop(slot);

        let supervisor = Supervisor {
            job_id: job_id.clone(),
            output_path: output_path.clone(),
            config: self.config.clone(),
            slot: Arc::clone(&self.slot),
            events: event_tx,
            notifications: self.notifications.clone(),
            logs: Arc::clone(&self.logs),
            log,
            started: Instant::now(),
        };
        let parser = ProgressParser::new(media.duration_secs());
        tokio::spawn(supervisor.run(spawned, parser, cancel_rx));

        info!(job_id = %job_id, input = %request.input_path.display(), "Conversion accepted");
        Ok(JobHandle::new(job_id, output_path, event_rx))
    }

    /// Requests cancellation of the running job.
    ///
    /// Always succeeds; returns whether a running job was signalled. Calling
    /// it again, or with nothing running, has no effect.
    pub async fn cancel(&self) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.state != JobState::Running {
            return false;
        }

        match slot.cancel.take() {
            Some(cancel) => {
                info!(job_id = ?slot.job_id, "Cancelling conversion");
                cancel.send(()).is_ok()
            }
            None => false,
        }
    }

    /// Cancels the running job and waits, up to `limit`, for it to record
    /// its outcome.
    ///
    /// Returns false when the job was still running at the deadline.
    pub async fn cancel_and_wait(&self, limit: Duration) -> bool {
        let mut notifications = self.subscribe();
        self.cancel().await;

        let settled = async {
            while self.is_running().await {
                match notifications.recv().await {
                    Ok(notification) if notification.event.is_terminal() => break,
                    Err(broadcast::error::RecvError::Closed) => break,
                    _ => {}
                }
            }
        };
        timeout(limit, settled).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{AdvancedOptions, ConversionMode};
    use crate::job::JobEvent;
    use crate::probe::ProbeError;
    use crate::testing::{fixtures, MockProber};
    use std::path::{Path, PathBuf};

    fn controller(prober: Arc<MockProber>) -> JobController {
        JobController::new(
            EngineConfig::with_paths(
                PathBuf::from("/nonexistent/ffmpeg"),
                PathBuf::from("/nonexistent/ffprobe"),
            ),
            prober,
            Arc::new(LogStore::default()),
        )
    }

    #[tokio::test]
    async fn test_cancel_when_idle_is_noop() {
        let controller = controller(Arc::new(MockProber::new()));
        assert!(!controller.cancel().await);
        assert!(!controller.cancel().await);
        assert_eq!(controller.state().await, JobState::Idle);
    }

    #[tokio::test]
    async fn test_probe_failure_is_returned() {
        let prober = Arc::new(MockProber::new());
        prober
            .fail_next(ProbeError::InputNotFound {
                path: PathBuf::from("/missing.mp4"),
            })
            .await;
        let controller = controller(prober);

        let request =
            ConversionRequest::new("/missing.mp4", "/tmp/out.mkv", ConversionMode::preset("mkv"));
        let err = controller.start(request).await.unwrap_err();
        assert!(matches!(err, JobError::Probe(ProbeError::InputNotFound { .. })));
        assert_eq!(controller.state().await, JobState::Idle);
    }

    #[tokio::test]
    async fn test_build_failure_leaves_slot_idle() {
        let controller = controller(Arc::new(MockProber::new()));
        let media = fixtures::two_stream_mp4("/media/clip.mp4");

        let request = ConversionRequest::new(
            "/media/clip.mp4",
            "/tmp/out.mkv",
            ConversionMode::Advanced(AdvancedOptions::default()),
        );
        let err = controller.start_with_media(request, &media).await.unwrap_err();
        assert!(matches!(err, JobError::Build(_)));
        assert_eq!(controller.status().await.job_id, None);
    }

    #[tokio::test]
    async fn test_output_directory_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let controller = controller(Arc::new(MockProber::new()));
        let media = fixtures::two_stream_mp4("/media/clip.mp4");
        let request = ConversionRequest::new(
            "/media/clip.mp4",
            blocker.join("sub").join("out.mp4"),
            ConversionMode::preset("mp4_h264"),
        );

        let err = controller.start_with_media(request, &media).await.unwrap_err();
        assert!(matches!(err, JobError::OutputDirectoryFailed { .. }));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_terminal_event() {
        let dir = tempfile::tempdir().unwrap();
        let controller = controller(Arc::new(MockProber::new()));
        let media = fixtures::two_stream_mp4("/media/clip.mp4");
        let request = ConversionRequest::new(
            "/media/clip.mp4",
            dir.path().join("out.mkv"),
            ConversionMode::preset("mkv"),
        );

        let handle = controller.start_with_media(request, &media).await.unwrap();
        let job_id = handle.id().to_string();
        match handle.wait().await {
            Some(JobEvent::Failed(result)) => {
                assert!(!result.success);
                assert_eq!(result.job_id, job_id);
                assert!(result.message.unwrap().contains("Failed to start"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }

        assert_eq!(controller.state().await, JobState::Failed);
        let log = controller.logs().last().await.unwrap();
        assert_eq!(log.id, job_id);
        assert!(!log.success);
        assert_eq!(log.preset_id.as_deref(), Some("mkv"));
        assert!(log.command.contains(&Path::new("/nonexistent/ffmpeg").display().to_string()));
    }
}
