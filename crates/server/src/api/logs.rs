//! Conversion log endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use convertify_core::ConversionLog;

use super::handlers::error_response;
use crate::state::AppState;

/// All retained logs, oldest first.
pub async fn list_logs(State(state): State<Arc<AppState>>) -> Json<Vec<ConversionLog>> {
    Json(state.logs().list().await)
}

pub async fn last_log(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConversionLog>, impl IntoResponse> {
    state
        .logs()
        .last()
        .await
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "No conversion logs"))
}

pub async fn get_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ConversionLog>, impl IntoResponse> {
    state
        .logs()
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("Log not found: {}", id)))
}

/// Plain text rendering of every retained log.
pub async fn export_logs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [("content-type", "text/plain; charset=utf-8")],
        state.logs().export().await,
    )
}

pub async fn clear_logs(State(state): State<Arc<AppState>>) -> StatusCode {
    state.logs().clear().await;
    StatusCode::NO_CONTENT
}
