//! Per-job task that owns the engine process.

use futures::stream::{BoxStream, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use super::controller::JobSlot;
use super::types::{JobEvent, JobNotification, JobResult, JobState};
use crate::config::EngineConfig;
use crate::history::{ConversionLog, LogLevel, LogStore};
use crate::metrics::{CONVERSIONS_TOTAL, CONVERSION_ACTIVE, CONVERSION_DURATION};
use crate::progress::{parsed_lines, DiagnosticTail, ParsedLine, ProgressParser};

/// Key the engine reads on stdin as a request to finish and quit.
const QUIT_KEY: &[u8] = b"q";

/// How long to keep reading diagnostics after the process has exited.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Stand-in deadline for disabled timers.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

pub(crate) struct Supervisor {
    pub job_id: String,
    pub output_path: PathBuf,
    pub config: EngineConfig,
    pub slot: Arc<Mutex<JobSlot>>,
    pub events: mpsc::Sender<JobEvent>,
    pub notifications: broadcast::Sender<JobNotification>,
    pub logs: Arc<LogStore>,
    pub log: ConversionLog,
    pub started: Instant,
}

/// How the run loop ended.
enum Exit {
    Status(std::io::Result<std::process::ExitStatus>),
    TimedOut,
}

impl Supervisor {
    pub async fn run(
        mut self,
        spawned: std::io::Result<Child>,
        parser: ProgressParser,
        mut cancel_rx: oneshot::Receiver<()>,
    ) {
        CONVERSION_ACTIVE.inc();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                let message = format!(
                    "Failed to start {}: {}",
                    self.config.ffmpeg_path.display(),
                    e
                );
                warn!(job_id = %self.job_id, "{}", message);
                drop(cancel_rx);
                return self.finish(JobState::Failed, Some(message)).await;
            }
        };

        let pid = child.id().map(|pid| format!("pid {pid}"));
        self.log
            .add_entry(LogLevel::Info, "Engine started", pid.as_deref());
        info!(job_id = %self.job_id, output = %self.output_path.display(), "Conversion started");

        let mut stdin = child.stdin.take();
        let mut lines: BoxStream<'static, ParsedLine> = match child.stderr.take() {
            Some(stderr) => parsed_lines(stderr, parser).boxed(),
            None => futures::stream::empty().boxed(),
        };

        let mut tail = DiagnosticTail::new(self.config.diagnostic_lines);
        let mut last_progress: Option<Instant> = None;
        let mut stderr_open = true;
        let mut cancel_pending = true;
        let mut cancelled = false;
        let mut kill_at: Option<Instant> = None;
        let timeout_at = self.config.job_timeout().map(|t| self.started + t);

        let exit = loop {
            tokio::select! {
                signal = &mut cancel_rx, if cancel_pending => {
                    cancel_pending = false;
                    // a dropped sender means the controller went away, not a cancel
                    if signal.is_ok() {
                        cancelled = true;
                        self.log.add_entry(LogLevel::Warning, "Cancel requested", None);
                        if request_quit(&mut stdin).await {
                            kill_at = Some(Instant::now() + self.config.cancel_grace());
                        } else {
                            let _ = child.start_kill();
                        }
                    }
                }
                _ = sleep_until(kill_at.unwrap_or_else(far_future)), if kill_at.is_some() => {
                    kill_at = None;
                    debug!(job_id = %self.job_id, "Grace period elapsed, killing engine");
                    let _ = child.start_kill();
                }
                _ = sleep_until(timeout_at.unwrap_or_else(far_future)), if timeout_at.is_some() => {
                    warn!(job_id = %self.job_id, "Conversion timed out, killing engine");
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    break Exit::TimedOut;
                }
                line = lines.next(), if stderr_open => match line {
                    Some(line) => self.handle_line(line, &mut tail, &mut last_progress),
                    None => stderr_open = false,
                },
                status = child.wait() => break Exit::Status(status),
            }
        };
        drop(stdin);

        // A cancel that arrives from here on is refused. One that was
        // accepted before the receiver closed still wins.
        if cancel_pending {
            cancel_rx.close();
            if cancel_rx.try_recv().is_ok() {
                cancelled = true;
                self.log.add_entry(LogLevel::Warning, "Cancel requested", None);
            }
        }

        // collect whatever the engine wrote right before exiting
        if stderr_open {
            let _ = tokio::time::timeout(DRAIN_TIMEOUT, async {
                while let Some(line) = lines.next().await {
                    self.handle_line(line, &mut tail, &mut last_progress);
                }
            })
            .await;
        }

        let (state, message) = if cancelled {
            (JobState::Cancelled, Some("Cancelled by user".to_string()))
        } else {
            match exit {
                Exit::TimedOut => (
                    JobState::Failed,
                    Some(format!(
                        "Conversion timed out after {} seconds",
                        self.config.job_timeout_secs.unwrap_or_default()
                    )),
                ),
                Exit::Status(Ok(status)) if status.success() => (JobState::Completed, None),
                Exit::Status(Ok(status)) => (
                    JobState::Failed,
                    Some(
                        tail.failure_message()
                            .unwrap_or_else(|| format!("Engine exited with {}", status)),
                    ),
                ),
                Exit::Status(Err(e)) => (
                    JobState::Failed,
                    Some(format!("Failed to wait for engine: {}", e)),
                ),
            }
        };

        self.finish(state, message).await;
    }

    fn handle_line(
        &self,
        line: ParsedLine,
        tail: &mut DiagnosticTail,
        last_progress: &mut Option<Instant>,
    ) {
        match line {
            ParsedLine::Status(snapshot) => {
                let due = last_progress
                    .map(|at| at.elapsed() >= self.config.progress_interval())
                    .unwrap_or(true);
                if !due {
                    return;
                }
                *last_progress = Some(Instant::now());

                let event = JobEvent::Progress(snapshot);
                let _ = self.notifications.send(JobNotification {
                    job_id: self.job_id.clone(),
                    event: event.clone(),
                });
                // a slow consumer loses progress, never the terminal event
                let _ = self.events.try_send(event);
            }
            ParsedLine::Diagnostic(text) => {
                debug!(job_id = %self.job_id, "engine: {}", text);
                tail.push(text);
            }
        }
    }

    async fn finish(self, state: JobState, message: Option<String>) {
        let Self {
            job_id,
            output_path,
            slot,
            events,
            notifications,
            logs,
            mut log,
            started,
            ..
        } = self;

        let duration = started.elapsed();
        let success = state == JobState::Completed;

        match state {
            JobState::Completed => log.add_entry(LogLevel::Info, "Conversion completed", None),
            JobState::Cancelled => log.add_entry(LogLevel::Warning, "Conversion cancelled", None),
            _ => log.add_entry(
                LogLevel::Error,
                "Conversion failed",
                message.as_deref(),
            ),
        }
        log.finish(success, if success { None } else { message.clone() });
        logs.add(log).await;

        slot.lock().await.finish(&job_id, state);

        CONVERSION_ACTIVE.dec();
        CONVERSIONS_TOTAL.with_label_values(&[state.as_str()]).inc();
        CONVERSION_DURATION
            .with_label_values(&[state.as_str()])
            .observe(duration.as_secs_f64());

        info!(
            job_id = %job_id,
            outcome = state.as_str(),
            duration_secs = duration.as_secs_f64(),
            "Conversion finished"
        );

        let result = JobResult {
            job_id: job_id.clone(),
            success,
            output_path,
            duration_secs: duration.as_secs_f64(),
            message,
        };
        let event = JobEvent::terminal(state, result);
        let _ = notifications.send(JobNotification {
            job_id,
            event: event.clone(),
        });
        let _ = events.send(event).await;
    }
}

/// Asks the engine to stop by sending the quit key and closing stdin.
///
/// Returns false when stdin is unavailable.
async fn request_quit(stdin: &mut Option<ChildStdin>) -> bool {
    let Some(mut pipe) = stdin.take() else {
        return false;
    };
    match pipe.write_all(QUIT_KEY).await {
        Ok(()) => {
            let _ = pipe.flush().await;
            true
        }
        Err(e) => {
            debug!("Failed to send quit key: {}", e);
            false
        }
    }
}

fn far_future() -> Instant {
    Instant::now() + FAR_FUTURE
}
