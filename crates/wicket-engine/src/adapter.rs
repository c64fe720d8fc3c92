//! The database collaborator boundary.
//!
//! The engine never talks to a driver directly. Everything it needs from the
//! database goes through [`Database`]: a catalog description, statement
//! execution and the authenticated identity.
//!
//! An implementation wraps one connection opened with a session's
//! credentials. It is created at the start of a request and dropped at the
//! end of it, which releases the connection on every exit path.

use crate::statement::Statement;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One row of a catalog description, as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumn {
    /// Column name.
    pub name: String,
    /// Full declared type, e.g. `int`, `varchar(50)`, `enum('Bat','Bowl')`.
    pub column_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Key marker (`PRI`, `UNI`, `MUL` or empty).
    pub key: String,
    /// Default value expression, if any.
    pub default: Option<String>,
    /// Extra flags, e.g. `auto_increment`.
    pub extra: String,
}

/// Rows returned by a query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    /// Output column labels, in order.
    pub columns: Vec<String>,
    /// Row values, positionally aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Value of `column` in row `index`.
    pub fn value(&self, index: usize, column: &str) -> Option<&Value> {
        let position = self.columns.iter().position(|c| c == column)?;
        self.rows.get(index)?.get(position)
    }

    /// Row `index` as a JSON object keyed by column label.
    pub fn row_object(&self, index: usize) -> Option<serde_json::Map<String, Value>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }
}

/// Result of executing a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    /// The statement produced rows.
    Rows(ResultSet),
    /// The statement changed data; carries the affected row count.
    Affected(u64),
}

impl ExecOutcome {
    /// Rows, or an empty set for statements that returned none.
    pub fn into_rows(self) -> ResultSet {
        match self {
            ExecOutcome::Rows(rows) => rows,
            ExecOutcome::Affected(_) => ResultSet::default(),
        }
    }

    pub fn affected(&self) -> u64 {
        match self {
            ExecOutcome::Rows(rows) => rows.len() as u64,
            ExecOutcome::Affected(count) => *count,
        }
    }
}

/// A statement rejected by the database: constraint violation, type
/// mismatch, missing privilege, lost connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.display())]
pub struct DatabaseError {
    /// Driver or server error code, when one is available.
    pub code: Option<String>,
    /// Human-readable message from the database.
    pub message: String,
}

impl DatabaseError {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn display(&self) -> String {
        match &self.code {
            Some(code) => format!("database error {}: {}", code, self.message),
            None => format!("database error: {}", self.message),
        }
    }
}

/// A connection to the administered database, scoped to one request.
#[async_trait]
pub trait Database: Send {
    /// Describe a table's columns in ordinal order.
    ///
    /// Returns an empty list when the table does not exist.
    async fn describe(&mut self, table: &str) -> Result<Vec<RawColumn>, DatabaseError>;

    /// Execute a statement, binding its parameters positionally.
    ///
    /// Data-changing statements run in their own transaction which is only
    /// committed when the statement succeeds.
    /// Selects must be a single statement and must not change data.
    async fn execute(&mut self, statement: &Statement) -> Result<ExecOutcome, DatabaseError>;

    /// The identity the connection authenticated as.
    async fn current_identity(&mut self) -> Result<String, DatabaseError>;

    /// Names of the tables in the current database.
    async fn list_tables(&mut self) -> Result<Vec<String>, DatabaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_set_accessors() {
        let rows = ResultSet::new(
            vec!["team_id".to_string(), "team_name".to_string()],
            vec![vec![json!(1), json!("Lions")], vec![json!(2), json!("Tigers")]],
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.value(1, "team_name"), Some(&json!("Tigers")));
        assert_eq!(rows.value(0, "missing"), None);

        let row = rows.row_object(0).unwrap();
        assert_eq!(row["team_id"], json!(1));
        assert!(rows.row_object(5).is_none());
    }

    #[test]
    fn test_database_error_display() {
        let err = DatabaseError::new(Some("1062".to_string()), "Duplicate entry '7'");
        assert_eq!(err.to_string(), "database error 1062: Duplicate entry '7'");
        let err = DatabaseError::new(None, "connection reset");
        assert_eq!(err.to_string(), "database error: connection reset");
    }
}
