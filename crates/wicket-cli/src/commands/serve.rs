//! `wicket serve` - start the admin dashboard.

use anyhow::Result;
use std::sync::Arc;
use wicket_core::WicketConfig;
use wicket_dashboard::{AppState, DashboardServer, MySqlConnector};

pub async fn run(mut config: WicketConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.dashboard.host = host;
    }
    if let Some(port) = port {
        config.dashboard.port = port;
    }
    config.validate()?;

    tracing::info!(
        project = %config.project_name(),
        upstream = %format!("{}:{}/{}", config.upstream.host, config.upstream.port, config.upstream.database),
        "Starting Wicket"
    );

    let connector = Arc::new(MySqlConnector::new(config.upstream.clone()));
    let dashboard = config.dashboard.clone();
    let state = AppState::new(config, connector);

    DashboardServer::new(dashboard, state).run().await?;
    Ok(())
}
