use std::sync::Arc;
use tokio::sync::Mutex;

use convertify_core::{Config, JobController, LogStore, OutputPathResolver, Prober};

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    controller: Arc<JobController>,
    prober: Arc<dyn Prober>,
    output_paths: Mutex<OutputPathResolver>,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    /// Builds the job controller and starts relaying its events to the
    /// WebSocket feed. Must be called from within a tokio runtime.
    pub fn new(config: Config, prober: Arc<dyn Prober>, logs: Arc<LogStore>) -> Self {
        let controller = Arc::new(JobController::new(
            config.engine.clone(),
            Arc::clone(&prober),
            logs,
        ));

        let ws_broadcaster = WsBroadcaster::default();
        ws_broadcaster.forward_jobs(controller.subscribe());

        Self {
            config,
            controller,
            prober,
            output_paths: Mutex::new(OutputPathResolver::new()),
            ws_broadcaster,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn controller(&self) -> &Arc<JobController> {
        &self.controller
    }

    pub fn prober(&self) -> &dyn Prober {
        self.prober.as_ref()
    }

    pub fn logs(&self) -> &Arc<LogStore> {
        self.controller.logs()
    }

    /// Resolver shared across requests so the last chosen extension sticks.
    pub fn output_paths(&self) -> &Mutex<OutputPathResolver> {
        &self.output_paths
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
