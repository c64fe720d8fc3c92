//! Request executor.
//!
//! [`CrudEngine`] runs one [`EngineRequest`] against a request-scoped
//! [`Database`]. Every entry point follows the same pipeline:
//!
//! 1. Ask the access gate about `(role, operation)`. A denial returns
//!    before the database is touched.
//! 2. Introspect the table.
//! 3. Resolve the primary key and the insertable fields.
//! 4. Synthesize and execute.
//!
//! Database errors on insert, update and delete come back as a failed
//! [`MutationOutcome`] rather than an `Err`, so the caller can show the
//! message next to the form. Everything checked before execution is an
//! [`EngineError`].

use crate::adapter::{Database, ExecOutcome, ResultSet};
use crate::constraints::{build_insertable_fields, is_whitelisted, resolve_primary_key};
use crate::error::EngineError;
use crate::identifier::validate_identifier;
use crate::schema::{self, ColumnDescriptor, TableSchema};
use crate::statement::{
    Statement, SubmittedFields, build_aggregate_insert, build_delete, build_insert,
    build_select_all, build_select_by_key, build_update,
};
use crate::views::CuratedViews;
use serde::Serialize;
use serde_json::Value;
use wicket_core::EngineConfig;
use wicket_policy::{Operation, SessionRole, ensure_allowed};

/// Who is asking. Built once at login and passed into every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    /// Database identity the session authenticated as.
    pub identity: String,
    pub role: SessionRole,
}

impl SessionContext {
    pub fn new(identity: impl Into<String>, role: SessionRole) -> Self {
        Self {
            identity: identity.into(),
            role,
        }
    }

    /// Derive the role from the identity's name prefix.
    pub fn from_identity(identity: impl Into<String>, viewer_prefix: &str) -> Self {
        let identity = identity.into();
        let role = SessionRole::from_identity(&identity, viewer_prefix);
        Self { identity, role }
    }
}

/// A single engine call.
///
/// For console operations `table` carries the statement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    pub table: String,
    pub operation: Operation,
    pub submitted_fields: SubmittedFields,
    /// Primary key value of the row an update or delete targets.
    pub selected_key: Option<String>,
    /// Second phase of a delete.
    pub confirmed: bool,
}

impl EngineRequest {
    pub fn new(table: impl Into<String>, operation: Operation) -> Self {
        Self {
            table: table.into(),
            operation,
            submitted_fields: SubmittedFields::new(),
            selected_key: None,
            confirmed: false,
        }
    }

    pub fn read(table: impl Into<String>) -> Self {
        Self::new(table, Operation::Read)
    }

    pub fn insert(table: impl Into<String>, fields: SubmittedFields) -> Self {
        Self::new(table, Operation::Insert).with_fields(fields)
    }

    pub fn update(table: impl Into<String>, key: impl Into<String>, fields: SubmittedFields) -> Self {
        Self::new(table, Operation::Update)
            .with_key(key)
            .with_fields(fields)
    }

    pub fn delete(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(table, Operation::Delete).with_key(key)
    }

    pub fn console(text: impl Into<String>) -> Self {
        Self::new(text, Operation::ConsoleRead)
    }

    pub fn with_fields(mut self, fields: SubmittedFields) -> Self {
        self.submitted_fields = fields;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.selected_key = Some(key.into());
        self
    }

    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }
}

/// Result of a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    pub success: bool,
    pub message: String,
    /// Rows the statement changed; zero on failure.
    pub affected: u64,
}

impl MutationOutcome {
    pub fn succeeded(message: impl Into<String>, affected: u64) -> Self {
        Self {
            success: true,
            message: message.into(),
            affected,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            affected: 0,
        }
    }
}

/// One input on a generated form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub declared_type: String,
    pub nullable: bool,
    pub is_primary: bool,
    /// Allowed values when the column is an enumeration.
    pub enum_values: Option<Vec<String>>,
    /// Current value, on update forms.
    pub value: Option<String>,
}

impl FormField {
    fn from_column(column: &ColumnDescriptor) -> Self {
        Self {
            name: column.name.clone(),
            declared_type: column.declared_type.clone(),
            nullable: column.nullable,
            is_primary: column.is_primary(),
            enum_values: column.enum_values(),
            value: None,
        }
    }

    fn with_value(mut self, value: Option<String>) -> Self {
        self.value = value;
        self
    }
}

/// Everything needed to render an insert form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertForm {
    pub table: String,
    pub fields: Vec<FormField>,
    /// Set when inserts merge into existing rows through a procedure.
    pub aggregate: bool,
    /// Current contents of an aggregated table; empty when unavailable.
    pub existing: ResultSet,
}

/// Row picker plus, once a row is chosen, its editable fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateForm {
    pub table: String,
    pub primary_key: String,
    /// All rows, for the picker; empty when they could not be fetched.
    pub rows: ResultSet,
    pub selected_key: Option<String>,
    /// Editable fields, prefilled from the selected row.
    pub fields: Vec<FormField>,
}

/// Row picker for deletes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteForm {
    pub table: String,
    pub primary_key: String,
    pub rows: ResultSet,
}

/// The two phases of a delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DeleteResponse {
    /// The row as it is now. Nothing was deleted.
    Preview { key: String, row: ResultSet },
    /// The delete ran.
    Done(MutationOutcome),
}

/// Anything the engine can answer with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineResponse {
    Rows(ResultSet),
    Mutation(MutationOutcome),
    InsertForm(InsertForm),
    UpdateForm(UpdateForm),
    DeleteForm(DeleteForm),
    Delete(DeleteResponse),
    /// The actions menu may be shown for this table.
    ActionsMenu { table: String },
}

/// The schema-driven CRUD engine.
///
/// Holds only configuration; it is shared across requests while each
/// request brings its own connection.
#[derive(Debug, Clone)]
pub struct CrudEngine {
    config: EngineConfig,
    views: CuratedViews,
}

impl CrudEngine {
    /// An engine using the standard curated views.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_views(config, CuratedViews::standard().clone())
    }

    pub fn with_views(config: EngineConfig, views: CuratedViews) -> Self {
        Self { config, views }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn views(&self) -> &CuratedViews {
        &self.views
    }

    /// Dispatch a request on its operation.
    pub async fn handle(
        &self,
        db: &mut dyn Database,
        session: &SessionContext,
        request: EngineRequest,
    ) -> Result<EngineResponse, EngineError> {
        let EngineRequest {
            table,
            operation,
            submitted_fields,
            selected_key,
            confirmed,
        } = request;

        match operation {
            Operation::Read => self.read(db, session, &table).await.map(EngineResponse::Rows),
            Operation::InsertForm => self
                .insert_form(db, session, &table)
                .await
                .map(EngineResponse::InsertForm),
            Operation::Insert => self
                .insert(db, session, &table, &submitted_fields)
                .await
                .map(EngineResponse::Mutation),
            Operation::UpdateForm => self
                .update_form(db, session, &table, selected_key.as_deref())
                .await
                .map(EngineResponse::UpdateForm),
            Operation::Update => {
                ensure_allowed(session.role, operation)?;
                let key = require_key(&table, operation, selected_key)?;
                self.update(db, session, &table, &key, &submitted_fields)
                    .await
                    .map(EngineResponse::Mutation)
            }
            Operation::DeleteForm => self
                .delete_form(db, session, &table)
                .await
                .map(EngineResponse::DeleteForm),
            Operation::Delete => {
                ensure_allowed(session.role, operation)?;
                let key = require_key(&table, operation, selected_key)?;
                self.delete(db, session, &table, &key, confirmed)
                    .await
                    .map(EngineResponse::Delete)
            }
            Operation::ActionsMenu => {
                self.actions_menu(session, &table)?;
                Ok(EngineResponse::ActionsMenu { table })
            }
            Operation::ConsoleRead | Operation::ConsoleWrite => {
                self.console(db, session, &table).await
            }
        }
    }

    /// Read a table through its curated view, or `SELECT *`.
    pub async fn read(
        &self,
        db: &mut dyn Database,
        session: &SessionContext,
        table: &str,
    ) -> Result<ResultSet, EngineError> {
        ensure_allowed(session.role, Operation::Read)?;

        let statement = match self.views.get(table) {
            Some(query) => Statement::select(query),
            None => {
                // surfaces a missing table as a schema error
                let schema = schema::describe(db, table).await?;
                build_select_all(&schema.table)?
            }
        };

        tracing::debug!(table = %table, sql = %statement.text, "Reading table");
        Ok(db.execute(&statement).await?.into_rows())
    }

    /// Table names visible to the session.
    pub async fn list_tables(
        &self,
        db: &mut dyn Database,
        session: &SessionContext,
    ) -> Result<Vec<String>, EngineError> {
        ensure_allowed(session.role, Operation::Read)?;
        Ok(db.list_tables().await?)
    }

    /// Fields for an insert form. Enum columns carry their allowed values.
    pub async fn insert_form(
        &self,
        db: &mut dyn Database,
        session: &SessionContext,
        table: &str,
    ) -> Result<InsertForm, EngineError> {
        ensure_allowed(session.role, Operation::InsertForm)?;

        let schema = schema::describe(db, table).await?;
        let fields = build_insertable_fields(&schema, self.exception())
            .fields()
            .iter()
            .map(FormField::from_column)
            .collect();

        let aggregate = self.aggregate_procedure(table).is_some();
        let existing = if aggregate {
            let statement = Statement::select(self.views.resolve(table)?);
            self.fetch_or_empty(db, table, &statement).await
        } else {
            ResultSet::default()
        };

        Ok(InsertForm {
            table: schema.table,
            fields,
            aggregate,
            existing,
        })
    }

    /// Insert one row, or merge it through the aggregation procedure.
    pub async fn insert(
        &self,
        db: &mut dyn Database,
        session: &SessionContext,
        table: &str,
        submitted: &SubmittedFields,
    ) -> Result<MutationOutcome, EngineError> {
        ensure_allowed(session.role, Operation::Insert)?;

        let schema = schema::describe(db, table).await?;
        let fields = build_insertable_fields(&schema, self.exception());

        let statement = match self.aggregate_procedure(table) {
            Some(procedure) => build_aggregate_insert(procedure, &fields, submitted)?,
            None => build_insert(&schema.table, &fields, submitted)?,
        };

        Ok(self
            .execute_write(db, table, &statement, "Record inserted successfully")
            .await)
    }

    /// Row picker for updates; with a key, the row's editable fields.
    ///
    /// The row list is a convenience: if it cannot be fetched the form is
    /// still returned with no rows.
    pub async fn update_form(
        &self,
        db: &mut dyn Database,
        session: &SessionContext,
        table: &str,
        selected_key: Option<&str>,
    ) -> Result<UpdateForm, EngineError> {
        ensure_allowed(session.role, Operation::UpdateForm)?;

        let schema = schema::describe(db, table).await?;
        let primary_key = require_single_key(&schema)?;

        let rows = self
            .fetch_or_empty(db, table, &build_select_all(&schema.table)?)
            .await;

        let mut fields = Vec::new();
        if let Some(key) = selected_key {
            let statement = build_select_by_key(&schema.table, primary_key, key)?;
            let row = db.execute(&statement).await?.into_rows();
            if row.is_empty() {
                return Err(EngineError::RowNotFound {
                    table: schema.table.clone(),
                    column: primary_key.name.clone(),
                    key: key.to_string(),
                });
            }
            fields = schema
                .columns
                .iter()
                .filter(|c| self.is_updatable(&schema, primary_key, c))
                .map(|c| FormField::from_column(c).with_value(cell_text(&row, &c.name)))
                .collect();
        }

        Ok(UpdateForm {
            primary_key: primary_key.name.clone(),
            table: schema.table,
            rows,
            selected_key: selected_key.map(str::to_string),
            fields,
        })
    }

    /// Update the submitted columns of one row.
    pub async fn update(
        &self,
        db: &mut dyn Database,
        session: &SessionContext,
        table: &str,
        key: &str,
        submitted: &SubmittedFields,
    ) -> Result<MutationOutcome, EngineError> {
        ensure_allowed(session.role, Operation::Update)?;

        let schema = schema::describe(db, table).await?;
        let primary_key = require_single_key(&schema)?;
        let statement = build_update(&schema, primary_key, submitted, key, self.exception())?;

        Ok(self
            .execute_write(db, table, &statement, "Record updated successfully")
            .await)
    }

    /// Row picker for deletes.
    pub async fn delete_form(
        &self,
        db: &mut dyn Database,
        session: &SessionContext,
        table: &str,
    ) -> Result<DeleteForm, EngineError> {
        ensure_allowed(session.role, Operation::DeleteForm)?;

        let schema = schema::describe(db, table).await?;
        let primary_key = require_single_key(&schema)?;
        let rows = self
            .fetch_or_empty(db, table, &build_select_all(&schema.table)?)
            .await;

        Ok(DeleteForm {
            primary_key: primary_key.name.clone(),
            table: schema.table,
            rows,
        })
    }

    /// Two-phase delete.
    ///
    /// Without `confirmed` this only reads the target row and returns it.
    /// With `confirmed` it issues exactly one DELETE bound to `key`. No
    /// state is kept between the phases.
    pub async fn delete(
        &self,
        db: &mut dyn Database,
        session: &SessionContext,
        table: &str,
        key: &str,
        confirmed: bool,
    ) -> Result<DeleteResponse, EngineError> {
        ensure_allowed(session.role, Operation::Delete)?;

        let schema = schema::describe(db, table).await?;
        let primary_key = require_single_key(&schema)?;

        if !confirmed {
            let statement = build_select_by_key(&schema.table, primary_key, key)?;
            let row = db.execute(&statement).await?.into_rows();
            if row.is_empty() {
                return Err(EngineError::RowNotFound {
                    table: schema.table.clone(),
                    column: primary_key.name.clone(),
                    key: key.to_string(),
                });
            }
            return Ok(DeleteResponse::Preview {
                key: key.to_string(),
                row,
            });
        }

        let statement = build_delete(&schema.table, primary_key, key)?;
        let mut outcome = self
            .execute_write(db, table, &statement, "Record deleted successfully")
            .await;
        if outcome.success && outcome.affected == 0 {
            outcome = MutationOutcome::failed(format!(
                "No row in {} where {} = {}",
                schema.table, primary_key.name, key
            ));
        }
        Ok(DeleteResponse::Done(outcome))
    }

    /// Check that the actions menu may be opened for `table`.
    pub fn actions_menu(&self, session: &SessionContext, table: &str) -> Result<(), EngineError> {
        ensure_allowed(session.role, Operation::ActionsMenu)?;
        validate_identifier(table)?;
        Ok(())
    }

    /// Run console text as-is.
    ///
    /// Reads return rows. Anything else needs the write permission and
    /// reports a mutation outcome. Database errors come back as a failed
    /// outcome either way.
    pub async fn console(
        &self,
        db: &mut dyn Database,
        session: &SessionContext,
        text: &str,
    ) -> Result<EngineResponse, EngineError> {
        let statement = Statement::raw(text.trim());
        let operation = if statement.kind.returns_rows() {
            Operation::ConsoleRead
        } else {
            Operation::ConsoleWrite
        };
        ensure_allowed(session.role, operation)?;

        tracing::info!(
            identity = %session.identity,
            operation = ?operation,
            "Running console statement"
        );

        match db.execute(&statement).await {
            Ok(ExecOutcome::Rows(rows)) => Ok(EngineResponse::Rows(rows)),
            Ok(ExecOutcome::Affected(count)) => Ok(EngineResponse::Mutation(
                MutationOutcome::succeeded("Query executed successfully", count),
            )),
            Err(e) => {
                tracing::warn!(error = %e, "Console statement failed");
                Ok(EngineResponse::Mutation(MutationOutcome::failed(
                    e.to_string(),
                )))
            }
        }
    }

    fn exception(&self) -> Option<&wicket_core::AutoIncrementException> {
        self.config.auto_increment_exception.as_ref()
    }

    fn aggregate_procedure(&self, table: &str) -> Option<&str> {
        self.config
            .aggregate_insert
            .as_ref()
            .filter(|a| a.applies_to(table))
            .map(|a| a.procedure.as_str())
    }

    /// Same column filter the update synthesizer applies.
    fn is_updatable(
        &self,
        schema: &TableSchema,
        primary_key: &ColumnDescriptor,
        column: &ColumnDescriptor,
    ) -> bool {
        let whitelisted = is_whitelisted(self.exception(), &schema.table, &column.name);
        let is_key = column.name == primary_key.name;
        whitelisted || !(is_key || column.is_auto_increment)
    }

    async fn execute_write(
        &self,
        db: &mut dyn Database,
        table: &str,
        statement: &Statement,
        success_message: &str,
    ) -> MutationOutcome {
        tracing::debug!(
            table = %table,
            sql = %statement.text,
            params = statement.params.len(),
            "Executing write"
        );

        match db.execute(statement).await {
            Ok(outcome) => {
                let affected = outcome.affected();
                tracing::info!(
                    table = %table,
                    kind = ?statement.kind,
                    affected,
                    "Write committed"
                );
                MutationOutcome::succeeded(success_message, affected)
            }
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "Write rejected by database");
                MutationOutcome::failed(e.to_string())
            }
        }
    }

    async fn fetch_or_empty(
        &self,
        db: &mut dyn Database,
        table: &str,
        statement: &Statement,
    ) -> ResultSet {
        match db.execute(statement).await {
            Ok(outcome) => outcome.into_rows(),
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "Could not load rows for form");
                ResultSet::default()
            }
        }
    }
}

fn require_key(
    table: &str,
    operation: Operation,
    key: Option<String>,
) -> Result<String, EngineError> {
    key.filter(|k| !k.is_empty())
        .ok_or_else(|| EngineError::MissingKey {
            table: table.to_string(),
            operation,
        })
}

fn require_primary_key(schema: &TableSchema) -> Result<&ColumnDescriptor, EngineError> {
    resolve_primary_key(schema).ok_or_else(|| EngineError::NoPrimaryKey {
        table: schema.table.clone(),
    })
}

/// Rows are addressed by one key value, so a composite key cannot be used.
fn require_single_key(schema: &TableSchema) -> Result<&ColumnDescriptor, EngineError> {
    let primary_key = require_primary_key(schema)?;
    if schema.has_composite_key() {
        return Err(EngineError::schema(
            &schema.table,
            "composite primary keys cannot be addressed by a single key value",
        ));
    }
    Ok(primary_key)
}

/// Text of `column` in the first row, for prefilling a form.
fn cell_text(rows: &ResultSet, column: &str) -> Option<String> {
    match rows.value(0, column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
