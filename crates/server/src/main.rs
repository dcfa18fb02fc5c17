use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use convertify_core::{check_engine, load_config, validate_config, FfprobeProber, LogStore};
use convertify_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extra time, past the cancel grace period, for a job to record its outcome.
const SHUTDOWN_MARGIN: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config_path = std::env::var("CONVERTIFY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // The logging format comes from the config, so a broken config is
    // reported through the default format.
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            init_logging(false);
            return Err(e)
                .with_context(|| format!("Failed to load config from {:?}", config_path));
        }
    };

    init_logging(config.logging.json);
    info!("Convertify {} starting", VERSION);
    info!("Configuration loaded from {:?}", config_path);

    validate_config(&config).context("Configuration validation failed")?;

    // A missing engine is not fatal: the API reports it on /engine and
    // every conversion fails with a clear message.
    match check_engine(&config.engine).await {
        Ok(versions) => info!("Using {} / {}", versions.ffmpeg, versions.ffprobe),
        Err(e) => warn!("{}", e),
    }

    let logs = Arc::new(LogStore::new(&config.logs));
    if let Some(path) = logs.log_file_path() {
        info!("Appending conversion logs to {:?}", path);
    }

    let prober = Arc::new(FfprobeProber::new(&config.engine));
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, prober, logs));

    let app = create_router(Arc::clone(&state));

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    let controller = state.controller();
    if controller.is_running().await {
        let limit = controller.config().cancel_grace() + SHUTDOWN_MARGIN;
        if controller.cancel_and_wait(limit).await {
            info!("Cancelled the running conversion");
        } else {
            warn!("Conversion still running after {:?}, exiting anyway", limit);
        }
    }

    Ok(())
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
