//! In-memory `Database` double that records every call.

use crate::adapter::{Database, DatabaseError, ExecOutcome, RawColumn, ResultSet};
use crate::statement::Statement;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Describe(String),
    Execute(Statement),
    Identity,
    ListTables,
}

#[derive(Debug, Default)]
pub struct RecordingDatabase {
    pub calls: Vec<Call>,
    tables: HashMap<String, Vec<RawColumn>>,
    describe_error: Option<DatabaseError>,
    responses: VecDeque<Result<ExecOutcome, DatabaseError>>,
    identity: String,
}

impl RecordingDatabase {
    pub fn new() -> Self {
        Self {
            identity: "admin@localhost".to_string(),
            ..Default::default()
        }
    }

    pub fn with_table(mut self, name: &str, columns: Vec<RawColumn>) -> Self {
        self.tables.insert(name.to_string(), columns);
        self
    }

    pub fn failing_describe(mut self, error: DatabaseError) -> Self {
        self.describe_error = Some(error);
        self
    }

    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = identity.to_string();
        self
    }

    /// Queue the outcome of the next `execute` call. Unscripted calls
    /// return an empty row set for reads and one affected row otherwise.
    pub fn respond(mut self, outcome: Result<ExecOutcome, DatabaseError>) -> Self {
        self.responses.push_back(outcome);
        self
    }

    pub fn respond_rows(self, columns: &[&str], rows: Vec<Vec<serde_json::Value>>) -> Self {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        self.respond(Ok(ExecOutcome::Rows(ResultSet::new(columns, rows))))
    }

    pub fn executed(&self) -> Vec<&Statement> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Execute(statement) => Some(statement),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Database for RecordingDatabase {
    async fn describe(&mut self, table: &str) -> Result<Vec<RawColumn>, DatabaseError> {
        self.calls.push(Call::Describe(table.to_string()));
        if let Some(error) = &self.describe_error {
            return Err(error.clone());
        }
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }

    async fn execute(&mut self, statement: &Statement) -> Result<ExecOutcome, DatabaseError> {
        self.calls.push(Call::Execute(statement.clone()));
        match self.responses.pop_front() {
            Some(outcome) => outcome,
            None if statement.kind.returns_rows() => Ok(ExecOutcome::Rows(ResultSet::default())),
            None => Ok(ExecOutcome::Affected(1)),
        }
    }

    async fn current_identity(&mut self) -> Result<String, DatabaseError> {
        self.calls.push(Call::Identity);
        Ok(self.identity.clone())
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, DatabaseError> {
        self.calls.push(Call::ListTables);
        let mut tables: Vec<String> = self.tables.keys().cloned().collect();
        tables.sort();
        Ok(tables)
    }
}

pub fn raw_column(name: &str, column_type: &str, key: &str, extra: &str) -> RawColumn {
    RawColumn {
        name: name.to_string(),
        column_type: column_type.to_string(),
        nullable: key != "PRI",
        key: key.to_string(),
        default: None,
        extra: extra.to_string(),
    }
}
