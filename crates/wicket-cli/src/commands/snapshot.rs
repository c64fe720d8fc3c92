//! `wicket snapshot` - dump every table's columns as JSON.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use wicket_adapter_mysql::{MySqlDatabase, introspect};
use wicket_core::WicketConfig;

use crate::Credentials;

pub async fn run(config: &WicketConfig, credentials: &Credentials, output: Option<&Path>) -> Result<()> {
    let mut db = MySqlDatabase::connect(&config.upstream, &credentials.user, &credentials.password)
        .await
        .context("failed to connect to upstream database")?;
    let snapshot = introspect::introspect_schema_json(db.connection())
        .await
        .context("failed to introspect schema")?;
    db.close().await?;

    let text = serde_json::to_string_pretty(&snapshot)?;
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            let tables = snapshot["tables"].as_array().map_or(0, Vec::len);
            tracing::info!(path = %path.display(), tables, "Schema snapshot written");
        }
        None => println!("{text}"),
    }
    Ok(())
}
