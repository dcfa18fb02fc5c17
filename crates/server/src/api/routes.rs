use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{convert, handlers, logs, middleware::metrics_middleware, probe, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and engine
        .route("/health", get(handlers::health))
        .route("/engine", get(handlers::engine_status))
        .route("/metrics", get(handlers::metrics))
        // Planning
        .route("/presets", get(handlers::presets))
        .route("/probe", post(probe::probe_file))
        .route("/output-path", post(probe::output_path))
        // Conversion
        .route("/convert", post(convert::start_conversion))
        .route("/convert/cancel", post(convert::cancel_conversion))
        .route("/convert/status", get(convert::conversion_status))
        .route("/ws", get(ws::ws_handler))
        // Conversion logs
        .route("/logs", get(logs::list_logs).delete(logs::clear_logs))
        .route("/logs/last", get(logs::last_log))
        .route("/logs/export", get(logs::export_logs))
        .route("/logs/{id}", get(logs::get_log))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
