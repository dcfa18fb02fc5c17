//! Probe and output path endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use convertify_core::{next_free_output_path, MediaDescription, OutputTarget, Prober};

use super::handlers::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProbeBody {
    pub path: PathBuf,
}

/// Probe a file. Engine problems are 503, anything about the file is 422.
pub async fn probe_file(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProbeBody>,
) -> Result<Json<MediaDescription>, impl IntoResponse> {
    state.prober().probe(&body.path).await.map(Json).map_err(|e| {
        let status = if e.is_engine_missing() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };
        error_response(status, e)
    })
}

#[derive(Debug, Deserialize)]
pub struct OutputPathBody {
    pub input_path: PathBuf,
    pub preset_id: Option<String>,
    pub format: Option<String>,
    /// Pick `<stem>_2.<ext>`, `<stem>_3.<ext>`, ... when the path is taken.
    #[serde(default)]
    pub avoid_existing: bool,
}

#[derive(Debug, Serialize)]
pub struct OutputPathResponse {
    pub output_path: PathBuf,
}

/// Suggest an output path. A preset takes priority over a bare format.
pub async fn output_path(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OutputPathBody>,
) -> Json<OutputPathResponse> {
    let target = body
        .preset_id
        .map(OutputTarget::Preset)
        .or(body.format.map(OutputTarget::Format));

    let mut output_path = state
        .output_paths()
        .lock()
        .await
        .resolve(&body.input_path, target.as_ref());

    if body.avoid_existing {
        output_path = next_free_output_path(&output_path);
    }

    Json(OutputPathResponse { output_path })
}
