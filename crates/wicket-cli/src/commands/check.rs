//! `wicket check` - validate the configuration.

use anyhow::Result;
use std::path::Path;
use wicket_core::WicketConfig;

pub fn run(config: &WicketConfig, path: &Path) -> Result<()> {
    config.validate()?;

    println!("Configuration OK ({})", path.display());
    println!();
    println!("  project:   {}", config.project_name());
    println!(
        "  upstream:  {}:{}/{}",
        config.upstream.host, config.upstream.port, config.upstream.database
    );
    println!("  dashboard: {}", config.dashboard.bind_address());
    println!();
    println!("{}", summarize_engine(config).join("\n"));
    Ok(())
}

fn summarize_engine(config: &WicketConfig) -> Vec<String> {
    let engine = &config.engine;
    let mut lines = Vec::new();
    lines.push(match &engine.auto_increment_exception {
        Some(e) => format!(
            "  auto-increment exception: {}.{} is supplied on insert",
            e.table, e.column
        ),
        None => "  auto-increment exception: none".to_string(),
    });
    lines.push(match &engine.aggregate_insert {
        Some(a) => format!("  aggregate insert: {} via CALL {}", a.table, a.procedure),
        None => "  aggregate insert: none".to_string(),
    });
    lines.push(format!(
        "  viewer prefix: accounts starting with '{}' are read-only",
        engine.viewer_prefix
    ));
    lines
}
