//! CRUD engine configuration.
//!
//! The engine is generic over every table, with two named exceptions that
//! are configured here rather than compiled in.

use serde::{Deserialize, Serialize};

/// Special cases applied by the schema-driven CRUD engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The single auto-increment column whose value callers may supply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment_exception: Option<AutoIncrementException>,

    /// Table whose inserts are routed through a stored aggregation procedure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_insert: Option<AggregateInsertConfig>,

    /// Identity prefix that marks a read-only (viewer) database account.
    #[serde(default = "default_viewer_prefix")]
    pub viewer_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_increment_exception: None,
            aggregate_insert: None,
            viewer_prefix: default_viewer_prefix(),
        }
    }
}

/// A (table, column) pair allowed to carry an explicit auto-increment value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoIncrementException {
    pub table: String,
    pub column: String,
}

impl AutoIncrementException {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Names compare ASCII case-insensitively, like every other table
    /// lookup in the engine.
    pub fn matches(&self, table: &str, column: &str) -> bool {
        self.table.eq_ignore_ascii_case(table) && self.column.eq_ignore_ascii_case(column)
    }
}

/// Natural-key upsert: inserts into `table` call `procedure` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateInsertConfig {
    pub table: String,
    pub procedure: String,
}

impl AggregateInsertConfig {
    pub fn new(table: impl Into<String>, procedure: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            procedure: procedure.into(),
        }
    }

    pub fn applies_to(&self, table: &str) -> bool {
        self.table.eq_ignore_ascii_case(table)
    }
}

fn default_viewer_prefix() -> String {
    "viewer".to_string()
}
