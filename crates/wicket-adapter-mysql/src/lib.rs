//! MySQL implementation of the Wicket [`Database`] collaborator.
//!
//! A [`MySqlDatabase`] owns one connection opened with a dashboard
//! session's credentials. Handlers open it at the start of a request and
//! drop it at the end; dropping closes the connection.
//!
//! Reads run one statement at a time inside a read-only transaction that is
//! rolled back. Writes run inside a transaction that is committed.

use async_trait::async_trait;
use bigdecimal::{BigDecimal, ToPrimitive};
use serde_json::{Value, json};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlDatabaseError, MySqlRow};
use sqlx::{Column, ConnectOptions, Connection, Executor, Row};
use std::str::FromStr;
use std::time::Duration;
use wicket_core::UpstreamConfig;
use wicket_engine::{
    Database, DatabaseError, ExecOutcome, RawColumn, ResultSet, Statement, StatementKind,
    is_single_statement, leading_keyword,
};

pub mod introspect;

/// One authenticated connection to the administered database.
pub struct MySqlDatabase {
    conn: MySqlConnection,
}

impl MySqlDatabase {
    /// Connect to the configured server as `username`.
    ///
    /// Fails with the server's error when the credentials are rejected or
    /// the database is not accessible to that account.
    pub async fn connect(
        upstream: &UpstreamConfig,
        username: &str,
        password: &str,
    ) -> Result<Self, DatabaseError> {
        let url = upstream.connection_url(username, password);
        let timeout = Duration::from_secs(upstream.pool.acquire_timeout_seconds);
        Self::connect_url(&url, timeout).await
    }

    /// Connect with a full `mysql://` URL.
    pub async fn connect_url(url: &str, timeout: Duration) -> Result<Self, DatabaseError> {
        let options = MySqlConnectOptions::from_str(url).map_err(map_sqlx_error)?;
        let conn = tokio::time::timeout(timeout, options.connect())
            .await
            .map_err(|_| {
                DatabaseError::new(
                    None,
                    format!("timed out after {}s connecting to MySQL", timeout.as_secs()),
                )
            })?
            .map_err(map_sqlx_error)?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: MySqlConnection) -> Self {
        Self { conn }
    }

    /// Close the connection gracefully.
    pub async fn close(self) -> Result<(), DatabaseError> {
        self.conn.close().await.map_err(map_sqlx_error)
    }

    pub fn connection(&mut self) -> &mut MySqlConnection {
        &mut self.conn
    }

    /// Run a read inside a read-only transaction that is always rolled back.
    async fn fetch_rows(&mut self, statement: &Statement) -> Result<ResultSet, sqlx::Error> {
        (&mut self.conn)
            .execute(sqlx::raw_sql("START TRANSACTION READ ONLY"))
            .await?;
        let rows = self.fetch_all(statement).await;
        let rollback = (&mut self.conn).execute(sqlx::raw_sql("ROLLBACK")).await;
        let rows = rows?;
        rollback?;
        Ok(result_set(&rows))
    }

    async fn fetch_all(&mut self, statement: &Statement) -> Result<Vec<MySqlRow>, sqlx::Error> {
        if statement.params.is_empty() && leading_keyword(&statement.text) != "select" {
            // text protocol: SHOW and DESCRIBE cannot be prepared
            return (&mut self.conn)
                .fetch_all(sqlx::raw_sql(&statement.text))
                .await;
        }
        let mut query = sqlx::query(&statement.text);
        for param in &statement.params {
            query = query.bind(param.clone());
        }
        query.fetch_all(&mut self.conn).await
    }

    async fn execute_in_transaction(&mut self, statement: &Statement) -> Result<u64, sqlx::Error> {
        let mut tx = self.conn.begin().await?;

        let result = if statement.params.is_empty() {
            (&mut *tx).execute(sqlx::raw_sql(&statement.text)).await?
        } else {
            let mut query = sqlx::query(&statement.text);
            for param in &statement.params {
                query = query.bind(param.clone());
            }
            query.execute(&mut *tx).await?
        };

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl Database for MySqlDatabase {
    async fn describe(&mut self, table: &str) -> Result<Vec<RawColumn>, DatabaseError> {
        introspect::describe_table(&mut self.conn, table)
            .await
            .map_err(map_sqlx_error)
    }

    async fn execute(&mut self, statement: &Statement) -> Result<ExecOutcome, DatabaseError> {
        tracing::debug!(
            kind = ?statement.kind,
            sql = %statement.text,
            params = statement.params.len(),
            "Executing statement"
        );

        match statement.kind {
            StatementKind::Select if !is_single_statement(&statement.text) => Err(
                DatabaseError::new(None, "a read must be a single statement"),
            ),
            StatementKind::Select => self
                .fetch_rows(statement)
                .await
                .map(ExecOutcome::Rows)
                .map_err(map_sqlx_error),
            StatementKind::Insert
            | StatementKind::Update
            | StatementKind::Delete
            | StatementKind::Call
            | StatementKind::Command => self
                .execute_in_transaction(statement)
                .await
                .map(ExecOutcome::Affected)
                .map_err(map_sqlx_error),
        }
    }

    async fn current_identity(&mut self) -> Result<String, DatabaseError> {
        let (identity,): (String,) = sqlx::query_as("select cast(user() as char)")
            .fetch_one(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;
        Ok(identity)
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, DatabaseError> {
        introspect::list_tables(&mut self.conn)
            .await
            .map_err(map_sqlx_error)
    }
}

/// Convert a driver error, keeping the MySQL error number when there is one.
pub fn map_sqlx_error(error: sqlx::Error) -> DatabaseError {
    match &error {
        sqlx::Error::Database(db_error) => {
            let code = db_error
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(|e| e.number().to_string())
                .or_else(|| db_error.code().map(|c| c.into_owned()));
            DatabaseError::new(code, db_error.message())
        }
        _ => DatabaseError::new(None, error.to_string()),
    }
}

fn result_set(rows: &[MySqlRow]) -> ResultSet {
    let columns = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let rows = rows
        .iter()
        .map(|row| (0..row.columns().len()).map(|i| decode_value(row, i)).collect())
        .collect();

    ResultSet::new(columns, rows)
}

/// Decode one cell into JSON, trying the types MySQL columns map to.
fn decode_value(row: &MySqlRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(Value::Null, |v| json!(v));
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(index) {
        return v.map_or(Value::Null, |v| json!(v));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map_or(Value::Null, |v| json!(v));
    }
    if let Ok(v) = row.try_get::<Option<BigDecimal>, _>(index) {
        return match v {
            Some(d) => d
                .to_f64()
                .map(|f| json!(f))
                .unwrap_or_else(|| json!(d.to_string())),
            None => Value::Null,
        };
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(index) {
        return v.map_or(Value::Null, |v| json!(v.format("%Y-%m-%d %H:%M:%S").to_string()));
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(index) {
        return v.map_or(Value::Null, |v| json!(v.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveTime>, _>(index) {
        return v.map_or(Value::Null, |v| json!(v.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(Value::Null, Value::String);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.map_or(Value::Null, |bytes| {
            json!(String::from_utf8_lossy(&bytes).into_owned())
        });
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_has_no_code() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert_eq!(err.code, None);
        assert!(err.message.contains("no rows"));
    }

    #[test]
    fn test_bad_url_is_reported() {
        let err = MySqlConnectOptions::from_str("not a url").map_err(map_sqlx_error);
        assert!(err.is_err());
    }
}
