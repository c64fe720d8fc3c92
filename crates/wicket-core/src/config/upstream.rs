//! Upstream database configuration types.
//!
//! Only the location of the MySQL server lives here. The username and
//! password are supplied per dashboard session at login time.

use serde::{Deserialize, Serialize};

/// Configuration for the upstream MySQL server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Hostname of the MySQL server.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the MySQL server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database (schema) to administer.
    #[serde(default = "default_database")]
    pub database: String,

    /// Per-session connection pool configuration.
    #[serde(default)]
    pub pool: PoolConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_database(),
            pool: PoolConfig::default(),
        }
    }
}

/// Connection settings applied when a request opens its connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Timeout in seconds when establishing a connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_seconds: default_acquire_timeout(),
        }
    }
}

impl UpstreamConfig {
    /// Build a MySQL connection URL for the given credentials.
    ///
    /// Credentials are percent-encoded so passwords containing `@` or `/`
    /// survive URL parsing.
    pub fn connection_url(&self, username: &str, password: &str) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            urlencoding::encode(username),
            urlencoding::encode(password),
            self.host,
            self.port,
            self.database
        )
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_database() -> String {
    "cricket_league".to_string()
}

fn default_acquire_timeout() -> u64 {
    10
}
