//! Common test utilities for driving the API in-process.
//!
//! The fixture builds the real router around a [`MockProber`] and, when a
//! script is given, a fake ffmpeg written into a temp directory.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use convertify_core::{
    testing::{fixtures, MockProber},
    Config, EngineConfig, LogStore,
};
use convertify_server::state::AppState;

/// Re-exported so tests can add their own fake engines.
pub use convertify_core::testing::fake_engine;

/// Prints a few status lines, then succeeds.
pub const SUCCESS: &str = r#"
printf 'frame=1 time=00:00:02.00 bitrate=N/A speed=2x\r' >&2
printf 'frame=2 size=256kB time=00:00:05.00 bitrate=900.0kbits/s speed=2x\r' >&2
printf 'frame=3 Lsize=512kB time=00:00:10.00 bitrate=900.0kbits/s speed=2x\n' >&2
exit 0
"#;

/// Reports once, then blocks until the quit key arrives on stdin.
pub const WAITS_FOR_QUIT: &str = r#"
printf 'frame=1 time=00:00:01.00 speed=1x\r' >&2
IFS= read -r key
exit 255
"#;

const WAIT_TIMEOUT: Duration = Duration::from_secs(15);

/// In-process server with a mock prober.
pub struct TestFixture {
    pub router: Router,
    pub state: Arc<AppState>,
    pub prober: Arc<MockProber>,
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Fixture without a usable ffmpeg; conversions fail at launch.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Fixture whose ffmpeg is a shell script running `script`.
    pub fn with_engine(script: &str) -> Self {
        Self::build(Some(script))
    }

    fn build(script: Option<&str>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let ffmpeg = match script {
            Some(body) => {
                fake_engine(temp_dir.path(), "ffmpeg", body).expect("Failed to write ffmpeg")
            }
            None => temp_dir.path().join("missing-ffmpeg"),
        };

        let config = Config {
            engine: EngineConfig::with_paths(ffmpeg, temp_dir.path().join("ffprobe"))
                .with_progress_interval_ms(0)
                .with_cancel_grace_ms(2_000),
            ..Default::default()
        };

        let prober = Arc::new(MockProber::with_default(fixtures::two_stream_mp4(
            temp_dir.path().join("clip.mp4"),
        )));

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&prober) as Arc<dyn convertify_core::Prober>,
            Arc::new(LogStore::default()),
        ));
        let router = convertify_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            prober,
            temp_dir,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Body for starting a preset conversion of `clip.mp4`.
    pub fn convert_body(&self, preset_id: &str, output: &str) -> Value {
        serde_json::json!({
            "input_path": self.path("clip.mp4"),
            "output_path": self.path(output),
            "preset_id": preset_id,
        })
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Polls the status endpoint until the job slot is terminal.
    pub async fn wait_until_finished(&self) -> Value {
        tokio::time::timeout(WAIT_TIMEOUT, async {
            loop {
                let status = self.get("/api/v1/convert/status").await.body;
                let state = status["state"].as_str().unwrap_or_default().to_string();
                if matches!(state.as_str(), "completed" | "failed" | "cancelled") {
                    return status;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("Conversion did not finish in time")
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
