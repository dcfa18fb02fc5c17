use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use convertify_core::{check_engine, list_presets, EngineVersions, Preset};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

/// Error body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(
    status: StatusCode,
    error: impl ToString,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Reports the engine version lines, or 503 when an engine is unusable.
pub async fn engine_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EngineVersions>, impl IntoResponse> {
    check_engine(&state.config().engine).await.map(Json).map_err(|e| {
        warn!("Engine check failed: {}", e);
        error_response(StatusCode::SERVICE_UNAVAILABLE, e)
    })
}

#[derive(Serialize)]
pub struct PresetsResponse {
    pub presets: &'static [Preset],
}

pub async fn presets() -> Json<PresetsResponse> {
    Json(PresetsResponse {
        presets: list_presets(),
    })
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state).await;
    (
        [("content-type", "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
