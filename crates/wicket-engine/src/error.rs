//! Error types for the CRUD engine.

use crate::adapter::DatabaseError;
use crate::identifier::IdentifierError;
use thiserror::Error;
use wicket_policy::{AccessDenied, Operation};

/// Errors that can occur while serving an engine request.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The table or one of its columns could not be resolved.
    #[error("schema error for table '{table}': {reason}")]
    Schema { table: String, reason: String },

    /// The session role may not perform the operation.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// Update or delete attempted on a table without a primary key.
    #[error("table '{table}' has no primary key; rows cannot be addressed")]
    NoPrimaryKey { table: String },

    /// An update would set no columns.
    #[error("no updatable fields were submitted for table '{table}'")]
    NoUpdatableFields { table: String },

    /// The database rejected a statement.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// A table or column name failed the safe-character check.
    #[error(transparent)]
    IdentifierSafety(#[from] IdentifierError),

    /// Update or delete requested without selecting a row.
    #[error("{operation} on table '{table}' requires a selected key")]
    MissingKey { table: String, operation: Operation },

    /// The selected key matched no row.
    #[error("no row in '{table}' where {column} = '{key}'")]
    RowNotFound {
        table: String,
        column: String,
        key: String,
    },
}

impl EngineError {
    pub fn schema(table: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::Schema {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised before anything was sent to the
    /// database for execution.
    pub fn is_precondition(&self) -> bool {
        !matches!(self, EngineError::Database(_))
    }
}
