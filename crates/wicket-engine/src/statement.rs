//! Statement synthesizer.
//!
//! Builds parameterized statements from a table schema and the values a
//! caller submitted. Values are always bound as positional `?` parameters.
//! Table and column names are interpolated, so each one is validated with
//! [`validate_identifier`] first.
//!
//! Blank submissions are bound as NULL. The dashboard never distinguishes a
//! field left blank from a field explicitly cleared, so neither does the
//! synthesizer.

use crate::constraints::{InsertableFieldSet, is_whitelisted};
use crate::error::EngineError;
use crate::identifier::{validate_all, validate_identifier};
use crate::schema::{ColumnDescriptor, TableSchema};
use serde::Serialize;
use std::collections::BTreeMap;
use wicket_core::AutoIncrementException;

/// Field name to submitted value, as received from a form.
pub type SubmittedFields = BTreeMap<String, String>;

/// What a statement does, so the adapter knows whether to fetch rows and
/// whether to wrap it in a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    /// Stored procedure call.
    Call,
    /// Free-form console statement that does not return rows.
    Command,
}

impl StatementKind {
    pub fn returns_rows(&self) -> bool {
        matches!(self, StatementKind::Select)
    }
}

/// A statement ready for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub text: String,
    /// Positional parameters; `None` binds NULL.
    pub params: Vec<Option<String>>,
}

impl Statement {
    pub fn new(kind: StatementKind, text: impl Into<String>, params: Vec<Option<String>>) -> Self {
        Self {
            kind,
            text: text.into(),
            params,
        }
    }

    /// A parameterless SELECT.
    pub fn select(text: impl Into<String>) -> Self {
        Self::new(StatementKind::Select, text, Vec::new())
    }

    /// A console statement, classified by its leading keyword.
    pub fn raw(text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = if is_read_statement(&text) {
            StatementKind::Select
        } else {
            StatementKind::Command
        };
        Self::new(kind, text, Vec::new())
    }
}

/// Lowercased first keyword of `text`.
pub fn leading_keyword(text: &str) -> String {
    text.trim_start()
        .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Whether `text` holds at most one statement.
///
/// Trailing semicolons are allowed. Any other `;` counts as a separator,
/// including one inside a string literal or a comment.
pub fn is_single_statement(text: &str) -> bool {
    let body = text.trim_end_matches(|c: char| c.is_whitespace() || c == ';');
    !body.contains(';')
}

/// Whether console text is a single read: `select`, `show`, `desc` or
/// `describe`.
pub fn is_read_statement(text: &str) -> bool {
    is_single_statement(text)
        && matches!(
            leading_keyword(text).as_str(),
            "select" | "show" | "desc" | "describe"
        )
}

/// Blank strings become NULL; absent fields are NULL too.
fn normalize(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// `INSERT INTO table (f1, f2, ...) VALUES (?, ?, ...)`.
///
/// One placeholder per field, in field-set order.
pub fn build_insert(
    table: &str,
    fields: &InsertableFieldSet,
    submitted: &SubmittedFields,
) -> Result<Statement, EngineError> {
    validate_identifier(table)?;
    let names = fields.names();
    validate_all(names.iter().copied())?;

    let params = fields
        .fields()
        .iter()
        .map(|f| normalize(submitted.get(&f.name)))
        .collect::<Vec<_>>();

    let text = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        names.join(", "),
        placeholders(names.len())
    );
    Ok(Statement::new(StatementKind::Insert, text, params))
}

/// `CALL procedure(?, ?, ...)` over the insertable fields.
///
/// Used for the aggregation table, whose inserts merge into an existing row
/// sharing the natural key instead of failing on the duplicate.
pub fn build_aggregate_insert(
    procedure: &str,
    fields: &InsertableFieldSet,
    submitted: &SubmittedFields,
) -> Result<Statement, EngineError> {
    validate_identifier(procedure)?;

    let params = fields
        .fields()
        .iter()
        .map(|f| normalize(submitted.get(&f.name)))
        .collect::<Vec<_>>();

    let text = format!("CALL {}({})", procedure, placeholders(params.len()));
    Ok(Statement::new(StatementKind::Call, text, params))
}

/// `UPDATE table SET c1 = ?, ... WHERE pk = ?`.
///
/// Only columns present in `submitted` are set, so omitted fields keep
/// their values. The primary key and auto-increment columns are skipped
/// unless they are the configured exception. The key value is bound last.
pub fn build_update(
    schema: &TableSchema,
    primary_key: &ColumnDescriptor,
    submitted: &SubmittedFields,
    key: &str,
    exception: Option<&AutoIncrementException>,
) -> Result<Statement, EngineError> {
    let table = schema.table.as_str();
    validate_identifier(table)?;
    validate_identifier(&primary_key.name)?;

    let mut assignments = Vec::new();
    let mut params = Vec::new();

    for column in &schema.columns {
        let whitelisted = is_whitelisted(exception, table, &column.name);
        if column.name == primary_key.name && !whitelisted {
            continue;
        }
        if column.is_auto_increment && !whitelisted {
            continue;
        }
        let Some(value) = submitted.get(&column.name) else {
            continue;
        };
        validate_identifier(&column.name)?;
        assignments.push(format!("{} = ?", column.name));
        params.push(normalize(Some(value)));
    }

    if assignments.is_empty() {
        return Err(EngineError::NoUpdatableFields {
            table: table.to_string(),
        });
    }

    params.push(Some(key.to_string()));
    let text = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table,
        assignments.join(", "),
        primary_key.name
    );
    Ok(Statement::new(StatementKind::Update, text, params))
}

/// `DELETE FROM table WHERE pk = ?`.
pub fn build_delete(
    table: &str,
    primary_key: &ColumnDescriptor,
    key: &str,
) -> Result<Statement, EngineError> {
    validate_identifier(table)?;
    validate_identifier(&primary_key.name)?;
    let text = format!("DELETE FROM {} WHERE {} = ?", table, primary_key.name);
    Ok(Statement::new(
        StatementKind::Delete,
        text,
        vec![Some(key.to_string())],
    ))
}

/// `SELECT * FROM table WHERE pk = ?`, used for delete previews and update
/// forms.
pub fn build_select_by_key(
    table: &str,
    primary_key: &ColumnDescriptor,
    key: &str,
) -> Result<Statement, EngineError> {
    validate_identifier(table)?;
    validate_identifier(&primary_key.name)?;
    let text = format!("SELECT * FROM {} WHERE {} = ?", table, primary_key.name);
    Ok(Statement::new(
        StatementKind::Select,
        text,
        vec![Some(key.to_string())],
    ))
}

/// `SELECT * FROM table`.
pub fn build_select_all(table: &str) -> Result<Statement, EngineError> {
    validate_identifier(table)?;
    Ok(Statement::select(format!("SELECT * FROM {}", table)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::build_insertable_fields;

    fn players() -> TableSchema {
        TableSchema::new(
            "PLAYERS",
            vec![
                ColumnDescriptor::new("player_id", "int").primary().auto_increment(),
                ColumnDescriptor::new("player_name", "varchar(100)"),
                ColumnDescriptor::new("DOB", "date"),
                ColumnDescriptor::new("role", "enum('Batsman','Bowler','All-rounder')"),
                ColumnDescriptor::new("team_id", "int"),
            ],
        )
    }

    fn submitted(pairs: &[(&str, &str)]) -> SubmittedFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_insert_placeholders_follow_field_order() {
        let schema = players();
        let fields = build_insertable_fields(&schema, None);
        let stmt = build_insert(
            "PLAYERS",
            &fields,
            &submitted(&[
                ("team_id", "3"),
                ("player_name", "R. Sharma"),
                ("DOB", "1987-04-30"),
                ("role", "Batsman"),
            ]),
        )
        .unwrap();

        assert_eq!(stmt.kind, StatementKind::Insert);
        assert_eq!(
            stmt.text,
            "INSERT INTO PLAYERS (player_name, DOB, role, team_id) VALUES (?, ?, ?, ?)"
        );
        assert_eq!(
            stmt.params,
            vec![
                Some("R. Sharma".to_string()),
                Some("1987-04-30".to_string()),
                Some("Batsman".to_string()),
                Some("3".to_string()),
            ]
        );
    }

    #[test]
    fn test_insert_blank_and_missing_become_null() {
        let schema = players();
        let fields = build_insertable_fields(&schema, None);
        let stmt = build_insert(
            "PLAYERS",
            &fields,
            &submitted(&[("player_name", "K. Rabada"), ("DOB", "")]),
        )
        .unwrap();
        assert_eq!(
            stmt.params,
            vec![Some("K. Rabada".to_string()), None, None, None]
        );
    }

    #[test]
    fn test_insert_ignores_values_for_excluded_fields() {
        let schema = players();
        let fields = build_insertable_fields(&schema, None);
        let stmt = build_insert(
            "PLAYERS",
            &fields,
            &submitted(&[("player_id", "99"), ("player_name", "X")]),
        )
        .unwrap();
        assert!(!stmt.text.contains("player_id"));
        assert_eq!(stmt.params.len(), 4);
    }

    #[test]
    fn test_insert_rejects_unsafe_table() {
        let schema = players();
        let fields = build_insertable_fields(&schema, None);
        let err = build_insert("PLAYERS; DROP", &fields, &SubmittedFields::new()).unwrap_err();
        assert!(matches!(err, EngineError::IdentifierSafety(_)));
    }

    #[test]
    fn test_aggregate_insert() {
        let schema = TableSchema::new(
            "PLAYER_STATS",
            vec![
                ColumnDescriptor::new("stat_id", "int").primary().auto_increment(),
                ColumnDescriptor::new("player_id", "int"),
                ColumnDescriptor::new("runs_scored", "int"),
                ColumnDescriptor::new("wickets_taken", "int"),
            ],
        );
        let fields = build_insertable_fields(&schema, None);
        let stmt = build_aggregate_insert(
            "add_player_stats",
            &fields,
            &submitted(&[("player_id", "7"), ("runs_scored", "54"), ("wickets_taken", "")]),
        )
        .unwrap();
        assert_eq!(stmt.kind, StatementKind::Call);
        assert_eq!(stmt.text, "CALL add_player_stats(?, ?, ?)");
        assert_eq!(
            stmt.params,
            vec![Some("7".to_string()), Some("54".to_string()), None]
        );
    }

    #[test]
    fn test_update_partial() {
        let schema = players();
        let pk = schema.get_column("player_id").unwrap().clone();
        let stmt = build_update(
            &schema,
            &pk,
            &submitted(&[("role", "Bowler"), ("DOB", "")]),
            "12",
            None,
        )
        .unwrap();
        assert_eq!(stmt.kind, StatementKind::Update);
        assert_eq!(
            stmt.text,
            "UPDATE PLAYERS SET DOB = ?, role = ? WHERE player_id = ?"
        );
        assert_eq!(
            stmt.params,
            vec![None, Some("Bowler".to_string()), Some("12".to_string())]
        );
    }

    #[test]
    fn test_update_skips_primary_key() {
        let schema = players();
        let pk = schema.get_column("player_id").unwrap().clone();
        let stmt = build_update(
            &schema,
            &pk,
            &submitted(&[("player_id", "500"), ("player_name", "New")]),
            "12",
            None,
        )
        .unwrap();
        assert_eq!(
            stmt.text,
            "UPDATE PLAYERS SET player_name = ? WHERE player_id = ?"
        );
    }

    #[test]
    fn test_update_keeps_whitelisted_key() {
        let schema = players();
        let pk = schema.get_column("player_id").unwrap().clone();
        let exception = AutoIncrementException::new("PLAYERS", "player_id");
        let stmt = build_update(
            &schema,
            &pk,
            &submitted(&[("player_id", "500")]),
            "12",
            Some(&exception),
        )
        .unwrap();
        assert_eq!(stmt.text, "UPDATE PLAYERS SET player_id = ? WHERE player_id = ?");
        assert_eq!(
            stmt.params,
            vec![Some("500".to_string()), Some("12".to_string())]
        );
    }

    #[test]
    fn test_update_with_no_fields() {
        let schema = players();
        let pk = schema.get_column("player_id").unwrap().clone();
        let err = build_update(&schema, &pk, &SubmittedFields::new(), "1", None).unwrap_err();
        assert!(matches!(err, EngineError::NoUpdatableFields { ref table } if table == "PLAYERS"));

        // only non-updatable or unknown fields submitted
        let err = build_update(
            &schema,
            &pk,
            &submitted(&[("player_id", "2"), ("not_a_column", "x")]),
            "1",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::NoUpdatableFields { .. }));
    }

    #[test]
    fn test_delete_and_select_by_key() {
        let schema = players();
        let pk = schema.get_column("player_id").unwrap();

        let stmt = build_delete("PLAYERS", pk, "4").unwrap();
        assert_eq!(stmt.kind, StatementKind::Delete);
        assert_eq!(stmt.text, "DELETE FROM PLAYERS WHERE player_id = ?");
        assert_eq!(stmt.params, vec![Some("4".to_string())]);

        let stmt = build_select_by_key("PLAYERS", pk, "4").unwrap();
        assert_eq!(stmt.text, "SELECT * FROM PLAYERS WHERE player_id = ?");
        assert!(stmt.kind.returns_rows());
    }

    #[test]
    fn test_key_value_is_bound_not_interpolated() {
        let schema = players();
        let pk = schema.get_column("player_id").unwrap();
        let stmt = build_delete("PLAYERS", pk, "1 OR 1=1").unwrap();
        assert!(!stmt.text.contains("1=1"));
        assert_eq!(stmt.params, vec![Some("1 OR 1=1".to_string())]);
    }

    #[test]
    fn test_read_statement_classification() {
        assert!(is_read_statement("SELECT * FROM TEAMS"));
        assert!(is_read_statement("  select 1"));
        assert!(is_read_statement("show tables;"));
        assert!(is_read_statement("DESC TEAMS"));
        assert!(is_read_statement("describe TEAMS"));
        assert!(is_read_statement("select(1)"));
        assert!(!is_read_statement("selective_update()"));
        assert!(!is_read_statement("UPDATE TEAMS SET coach_name = 'x'"));
        assert!(!is_read_statement("DELETE FROM TEAMS"));
        assert!(!is_read_statement(""));

        assert_eq!(Statement::raw("show tables").kind, StatementKind::Select);
        assert_eq!(Statement::raw("drop table x").kind, StatementKind::Command);
    }

    #[test]
    fn test_stacked_statements_are_not_a_read() {
        assert!(is_read_statement("SELECT 1;  \n"));
        assert!(is_read_statement("SELECT 1;;"));
        assert!(!is_read_statement("SELECT 1; DELETE FROM TEAMS"));
        assert!(!is_read_statement("SELECT 1;DELETE FROM TEAMS;"));
        assert!(!is_read_statement("SHOW TABLES; DROP TABLE TEAMS"));
        assert!(!is_read_statement("SELECT ';'"));
        assert!(!is_read_statement("SELECT 1 /* ; */"));

        assert_eq!(
            Statement::raw("SELECT 1; DELETE FROM TEAMS").kind,
            StatementKind::Command
        );
    }

    #[test]
    fn test_leading_keyword() {
        assert_eq!(leading_keyword("  SELECT * FROM TEAMS"), "select");
        assert_eq!(leading_keyword("Show tables"), "show");
        assert_eq!(leading_keyword("select(1)"), "select");
        assert_eq!(leading_keyword(""), "");
    }
}
