//! Conversion control endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use convertify_core::{
    find_preset, AdvancedOptions, ConversionMode, ConversionRequest, JobError, JobStatus,
    StreamSelection,
};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

/// Request body for starting a conversion.
///
/// Exactly one of `preset_id` and `advanced` must be given.
#[derive(Debug, Deserialize)]
pub struct ConvertBody {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub preset_id: Option<String>,
    pub advanced: Option<AdvancedOptions>,
    pub stream_selection: Option<StreamSelection>,
}

impl ConvertBody {
    fn into_request(self) -> Result<ConversionRequest, String> {
        let mode = match (self.preset_id, self.advanced) {
            (Some(_), Some(_)) => {
                return Err("Specify either preset_id or advanced, not both".to_string())
            }
            (None, None) => return Err("Either preset_id or advanced is required".to_string()),
            (Some(preset_id), None) => {
                if find_preset(&preset_id).is_none() {
                    return Err(format!("Preset not found: {}", preset_id));
                }
                ConversionMode::preset(preset_id)
            }
            (None, Some(options)) => ConversionMode::Advanced(options),
        };

        Ok(
            ConversionRequest::new(self.input_path, self.output_path, mode)
                .with_streams(self.stream_selection.unwrap_or_default()),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub job_id: String,
    pub output_path: PathBuf,
}

/// Start a conversion. Returns 202 once the engine has been launched;
/// everything after that arrives on the event feed.
pub async fn start_conversion(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConvertBody>,
) -> Result<(StatusCode, Json<ConvertResponse>), (StatusCode, Json<ErrorResponse>)> {
    let request = body
        .into_request()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e))?;

    let handle = state.controller().start(request).await.map_err(|e| {
        let status = match &e {
            JobError::AlreadyRunning => StatusCode::CONFLICT,
            JobError::Build(_) => StatusCode::BAD_REQUEST,
            JobError::Probe(p) if p.is_engine_missing() => StatusCode::SERVICE_UNAVAILABLE,
            JobError::Probe(_) | JobError::OutputDirectoryFailed { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };
        error_response(status, e)
    })?;

    let response = ConvertResponse {
        job_id: handle.id().to_string(),
        output_path: handle.output_path().to_path_buf(),
    };

    // Keep the per-job channel moving; subscribers get the same events
    // through the notification feed.
    tokio::spawn(async move {
        let job_id = handle.id().to_string();
        let terminal = handle.wait().await;
        debug!(job_id = %job_id, ?terminal, "Job handle drained");
    });

    info!(job_id = %response.job_id, "Conversion started");
    Ok((StatusCode::ACCEPTED, Json(response)))
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    /// Whether a running job was signalled.
    pub cancelled: bool,
}

/// Cancel the running conversion. Always 202, even with nothing running.
pub async fn cancel_conversion(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cancelled = state.controller().cancel().await;
    (StatusCode::ACCEPTED, Json(CancelResponse { cancelled }))
}

pub async fn conversion_status(State(state): State<Arc<AppState>>) -> Json<JobStatus> {
    Json(state.controller().status().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(preset_id: Option<&str>, advanced: Option<AdvancedOptions>) -> ConvertBody {
        ConvertBody {
            input_path: PathBuf::from("/media/in.mov"),
            output_path: PathBuf::from("/media/out.mp4"),
            preset_id: preset_id.map(str::to_string),
            advanced,
            stream_selection: None,
        }
    }

    #[test]
    fn test_preset_and_advanced_are_exclusive() {
        let err = body(Some("mp4_h264"), Some(AdvancedOptions::default()))
            .into_request()
            .unwrap_err();
        assert!(err.contains("not both"));
        assert!(body(None, None).into_request().is_err());
    }

    #[test]
    fn test_unknown_preset_rejected_up_front() {
        let err = body(Some("betamax"), None).into_request().unwrap_err();
        assert_eq!(err, "Preset not found: betamax");
    }

    #[test]
    fn test_stream_selection_defaults_to_everything() {
        let request = body(Some("mp4_h264"), None).into_request().unwrap();
        assert_eq!(request.mode.preset_id(), Some("mp4_h264"));
        assert_eq!(request.streams, StreamSelection::default());
    }
}
