//! Opens the per-request database connection for a session.

use async_trait::async_trait;
use wicket_adapter_mysql::MySqlDatabase;
use wicket_core::UpstreamConfig;
use wicket_engine::{Database, DatabaseError};

/// Opens a connection with a session's credentials.
///
/// The returned connection is dropped when the handler returns.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn Database>, DatabaseError>;
}

/// Connects to the configured MySQL server.
pub struct MySqlConnector {
    upstream: UpstreamConfig,
}

impl MySqlConnector {
    pub fn new(upstream: UpstreamConfig) -> Self {
        Self { upstream }
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn Database>, DatabaseError> {
        let db = MySqlDatabase::connect(&self.upstream, username, password).await?;
        Ok(Box::new(db))
    }
}
