//! Configuration types for Wicket.
//!
//! Configuration is loaded from a single YAML file (`wicket.yaml`) into a
//! [`WicketConfig`]. Every section is optional and falls back to defaults, so
//! an empty file is a valid configuration.
//!
//! Database credentials are deliberately absent: each dashboard session
//! supplies its own username and password at login.

pub mod dashboard;
pub mod engine;
pub mod upstream;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use dashboard::DashboardConfig;
pub use engine::{AggregateInsertConfig, AutoIncrementException, EngineConfig};
pub use upstream::{PoolConfig, UpstreamConfig};

/// Complete Wicket configuration loaded from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WicketConfig {
    /// Project name, shown in the dashboard title.
    #[serde(default)]
    pub project: Option<String>,

    /// Upstream MySQL server.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Dashboard HTTP settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// CRUD engine special cases.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default `tracing` filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WicketConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(exception) = &self.engine.auto_increment_exception
            && (exception.table.is_empty() || exception.column.is_empty())
        {
            return Err(ConfigError::Config(
                "engine.auto_increment_exception needs both table and column".to_string(),
            ));
        }
        if let Some(aggregate) = &self.engine.aggregate_insert
            && (aggregate.table.is_empty() || aggregate.procedure.is_empty())
        {
            return Err(ConfigError::Config(
                "engine.aggregate_insert needs both table and procedure".to_string(),
            ));
        }
        if self.engine.viewer_prefix.is_empty() {
            return Err(ConfigError::Config(
                "engine.viewer_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Display name for the dashboard.
    pub fn project_name(&self) -> &str {
        self.project.as_deref().unwrap_or(&self.upstream.database)
    }
}
