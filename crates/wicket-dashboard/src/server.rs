//! Dashboard server implementation.

use crate::error::DashboardError;
use crate::routes;
use crate::state::AppState;
use tokio::net::TcpListener;
use wicket_core::DashboardConfig;

/// The dashboard server.
pub struct DashboardServer {
    config: DashboardConfig,
    state: AppState,
}

impl DashboardServer {
    pub fn new(config: DashboardConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Serve until Ctrl-C.
    pub async fn run(&self) -> Result<(), DashboardError> {
        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| DashboardError::StartupFailed(format!("{}: {}", addr, e)))?;
        tracing::info!(address = %addr, "Starting Wicket dashboard");

        let app = routes::create_router(self.state.clone());
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DashboardError::StartupFailed(e.to_string()))?;

        tracing::info!("Dashboard stopped");
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        self.config.bind_address()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MySqlConnector;
    use std::sync::Arc;
    use wicket_core::WicketConfig;

    #[test]
    fn test_server_creation() {
        let config = WicketConfig::default();
        let connector = Arc::new(MySqlConnector::new(config.upstream.clone()));
        let server = DashboardServer::new(
            config.dashboard.clone(),
            AppState::new(config.clone(), connector),
        );
        assert_eq!(server.bind_address(), config.dashboard.bind_address());
    }
}
