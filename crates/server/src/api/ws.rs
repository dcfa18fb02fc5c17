//! WebSocket feed of conversion events.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use convertify_core::{JobEvent, JobNotification, JobResult, ProgressSnapshot};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket message sent to clients for real-time updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Progress snapshot of the running job.
    Progress {
        job_id: String,
        progress: ProgressSnapshot,
    },
    Completed { job_id: String, result: JobResult },
    Failed { job_id: String, result: JobResult },
    Cancelled { job_id: String, result: JobResult },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    /// Label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "progress",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
            Self::Cancelled { .. } => "cancelled",
            Self::Heartbeat { .. } => "heartbeat",
        }
    }
}

impl From<JobNotification> for WsMessage {
    fn from(notification: JobNotification) -> Self {
        let job_id = notification.job_id;
        match notification.event {
            JobEvent::Progress(progress) => Self::Progress { job_id, progress },
            JobEvent::Completed(result) => Self::Completed { job_id, result },
            JobEvent::Failed(result) => Self::Failed { job_id, result },
            JobEvent::Cancelled(result) => Self::Cancelled { job_id, result },
        }
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: WsMessage) {
        // no receivers just means no client is connected
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    /// Relays job notifications until the controller goes away.
    pub fn forward_jobs(&self, mut jobs: broadcast::Receiver<JobNotification>) -> JoinHandle<()> {
        let broadcaster = self.clone();
        tokio::spawn(async move {
            loop {
                match jobs.recv().await {
                    Ok(notification) => broadcaster.broadcast(notification.into()),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Job event relay lagged, skipped {} events", n);
                        WS_LAG_EVENTS.inc();
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Job notification channel closed");
                        break;
                    }
                }
            }
        })
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.ws_broadcaster().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval_at(
            tokio::time::Instant::now() + HEARTBEAT_INTERVAL,
            HEARTBEAT_INTERVAL,
        );

        loop {
            let msg = tokio::select! {
                result = rx.recv() => match result {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("WebSocket client lagged, skipped {} messages", n);
                        WS_LAG_EVENTS.inc();
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                },
                _ = heartbeat.tick() => WsMessage::Heartbeat {
                    timestamp: Utc::now().timestamp(),
                },
            };

            WS_MESSAGES_SENT.with_label_values(&[msg.kind()]).inc();

            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize WsMessage: {}", e);
                }
            }
        }
    });

    // Incoming messages only matter for close detection
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Received text message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}
