//! Application wiring and lifecycle.
//!
//! Builds the shared state, hub and background tasks, then runs until
//! the server fails or a shutdown signal arrives.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use esprelay_gateway::{run_server, AppState};
use esprelay_hub::BroadcastHub;
use esprelay_sim::run_simulator;
use esprelay_state::{run_liveness_monitor, DeviceLink, StateStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The assembled relay process.
pub struct Application {
    config: AppConfig,
    store: Arc<StateStore>,
    link: Arc<DeviceLink>,
    hub: Arc<BroadcastHub>,
}

impl Application {
    /// Wire up the state store, device link and broadcast hub.
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(StateStore::new());
        let link = Arc::new(DeviceLink::new());
        let hub = Arc::new(BroadcastHub::new(
            store.clone(),
            link.clone(),
            Duration::from_millis(config.liveness.timeout_window_ms),
        ));

        Self {
            config,
            store,
            link,
            hub,
        }
    }

    /// Run the relay until shutdown.
    ///
    /// Spawns the liveness monitor, the simulator (when enabled) and
    /// the HTTP server, then waits for Ctrl-C or a server failure.
    /// Background tasks are aborted on the way out.
    pub async fn run(self) -> AppResult<()> {
        info!(
            port = self.config.server.port,
            max_connections = self.config.server.max_connections,
            simulator = self.config.simulator.enabled,
            "Starting application"
        );

        let liveness_handle = tokio::spawn(run_liveness_monitor(
            self.link.clone(),
            Duration::from_millis(self.config.liveness.check_interval_ms),
            Duration::from_millis(self.config.liveness.timeout_window_ms),
        ));

        let simulator_handle = self.config.simulator.enabled.then(|| {
            tokio::spawn(run_simulator(
                self.hub.clone(),
                Duration::from_millis(self.config.simulator.interval_ms),
            ))
        });

        let state = AppState::new(
            self.store.clone(),
            self.hub.clone(),
            self.config.server.max_connections,
        );
        let port = self.config.server.port;
        let mut server_handle = tokio::spawn(async move { run_server(state, port).await });

        let result = tokio::select! {
            joined = &mut server_handle => match joined {
                Ok(Ok(())) => Err(AppError::Server("server exited unexpectedly".to_string())),
                Ok(Err(e)) => Err(AppError::Server(e.to_string())),
                Err(e) => Err(AppError::Server(e.to_string())),
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                Ok(())
            }
        };

        server_handle.abort();
        liveness_handle.abort();
        if let Some(handle) = simulator_handle {
            handle.abort();
        }

        info!("Shutdown complete");
        result
    }
}
