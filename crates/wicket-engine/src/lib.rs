//! # wicket-engine
//!
//! Schema-driven CRUD engine. Given only a table name, the engine asks the
//! database for the table's column metadata and synthesizes the read,
//! insert, update and delete statements from it. No table-specific code
//! exists beyond two configured exceptions and the curated read views.
//!
//! ## Architecture
//!
//! ```text
//! EngineRequest { table, operation, fields, key, confirmed }
//!       │
//!       ▼
//! ┌──────────────────────┐
//! │ 1. Access gate       │  ← wicket-policy (role, operation)
//! │ 2. Introspect        │  ← Database::describe, every request
//! │ 3. Resolve PK / auto │
//! │    increment / enums │
//! │ 4a. Read: curated    │  ← views
//! │     view or SELECT * │
//! │ 4b. Write: synthesize│  ← statement
//! │     and execute      │
//! └──────────┬───────────┘
//!            ▼
//!      Database (MySQL)
//! ```
//!
//! The [`Database`] trait is the only seam to the outside world. The MySQL
//! implementation lives in `wicket-adapter-mysql`.

pub mod adapter;
pub mod constraints;
pub mod error;
pub mod executor;
pub mod identifier;
pub mod schema;
pub mod statement;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{Database, DatabaseError, ExecOutcome, RawColumn, ResultSet};
pub use constraints::{
    InsertableFieldSet, build_insertable_fields, parse_enum_domain, resolve_primary_key,
};
pub use error::EngineError;
pub use executor::{
    CrudEngine, DeleteForm, DeleteResponse, EngineRequest, EngineResponse, FormField, InsertForm,
    MutationOutcome, SessionContext, UpdateForm,
};
pub use identifier::{IdentifierError, is_safe_identifier, validate_identifier};
pub use schema::{ColumnDescriptor, KeyRole, TableSchema};
pub use statement::{
    Statement, StatementKind, SubmittedFields, is_single_statement, leading_keyword,
};
pub use views::{CuratedViews, resolve_read_query};
