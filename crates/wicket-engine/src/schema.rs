//! Table schema model and the schema introspector.
//!
//! A [`TableSchema`] is rebuilt from a live catalog query on every request.
//! There is no cache: the schema may change between requests and nothing
//! would tell a cache to drop its entry.

use crate::adapter::{Database, RawColumn};
use crate::constraints::parse_enum_domain;
use crate::error::EngineError;
use crate::identifier::validate_identifier;
use serde::{Deserialize, Serialize};

/// Key role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    None,
    Primary,
}

impl KeyRole {
    /// Map a catalog key marker (`PRI`, `UNI`, `MUL`, empty).
    pub fn from_marker(marker: &str) -> Self {
        if marker.trim().eq_ignore_ascii_case("PRI") {
            KeyRole::Primary
        } else {
            KeyRole::None
        }
    }
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Raw declared type, e.g. `enum('A','B')`.
    pub declared_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the column is (part of) the primary key.
    pub key_role: KeyRole,
    /// Default value expression.
    pub default_value: Option<String>,
    /// Whether the database assigns the value on insert.
    pub is_auto_increment: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            nullable: true,
            key_role: KeyRole::None,
            default_value: None,
            is_auto_increment: false,
        }
    }

    /// Mark the column as the primary key.
    pub fn primary(mut self) -> Self {
        self.key_role = KeyRole::Primary;
        self.nullable = false;
        self
    }

    /// Mark the column as auto-increment.
    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    pub fn is_primary(&self) -> bool {
        self.key_role == KeyRole::Primary
    }

    /// Allowed values when the declared type is an enumeration.
    pub fn enum_values(&self) -> Option<Vec<String>> {
        parse_enum_domain(&self.declared_type)
    }

    fn from_raw(raw: RawColumn) -> Self {
        let is_auto_increment = raw
            .extra
            .split_whitespace()
            .any(|flag| flag.eq_ignore_ascii_case("auto_increment"));
        Self {
            key_role: KeyRole::from_marker(&raw.key),
            name: raw.name,
            declared_type: raw.column_type,
            nullable: raw.nullable,
            default_value: raw.default,
            is_auto_increment,
        }
    }
}

/// Ordered columns of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name as requested.
    pub table: String,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    /// Build a schema from a catalog description.
    ///
    /// Every column name must pass the identifier check, since the
    /// synthesizer will splice them into statement text.
    pub fn from_raw(table: &str, raw: Vec<RawColumn>) -> Result<Self, EngineError> {
        if raw.is_empty() {
            return Err(EngineError::schema(table, "table does not exist"));
        }
        let columns = raw
            .into_iter()
            .map(|column| {
                validate_identifier(&column.name)?;
                Ok(ColumnDescriptor::from_raw(column))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        Ok(Self::new(table, columns))
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns marked as primary key, in ordinal order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_primary())
    }

    pub fn has_composite_key(&self) -> bool {
        self.primary_key_columns().count() > 1
    }
}

/// Introspect `table` through the database collaborator.
///
/// Fails with [`EngineError::Schema`] when the table does not exist or the
/// catalog cannot be read, and with [`EngineError::IdentifierSafety`] when
/// the table name or a column name is unsafe to interpolate.
pub async fn describe(db: &mut dyn Database, table: &str) -> Result<TableSchema, EngineError> {
    validate_identifier(table)?;

    let raw = db
        .describe(table)
        .await
        .map_err(|e| EngineError::schema(table, e.to_string()))?;

    let schema = TableSchema::from_raw(table, raw)?;
    tracing::debug!(
        table = %table,
        columns = schema.columns.len(),
        "Introspected table schema"
    );
    Ok(schema)
}
