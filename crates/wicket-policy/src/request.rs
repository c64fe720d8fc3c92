//! Session roles and the operations they are checked against.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an authenticated dashboard session.
///
/// Derived once at login and never re-evaluated for the lifetime of the
/// session, even if the underlying database grants change. Logging in again
/// re-derives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    /// Full read-write access.
    Manager,
    /// Read-only access.
    Viewer,
}

impl SessionRole {
    /// Derive a role from a database identity such as `viewer1@localhost`.
    ///
    /// The host part (after `@`) and any surrounding quotes are ignored.
    /// Identities whose user part starts with `viewer_prefix`
    /// (case-insensitively) are viewers; everyone else is a manager.
    pub fn from_identity(identity: &str, viewer_prefix: &str) -> Self {
        let user = identity.split('@').next().unwrap_or_default();
        let user = user.trim().trim_matches(|c| c == '\'' || c == '`' || c == '"');
        if user
            .to_ascii_lowercase()
            .starts_with(&viewer_prefix.to_ascii_lowercase())
        {
            SessionRole::Viewer
        } else {
            SessionRole::Manager
        }
    }

    /// Whether this role may issue writes at all.
    pub fn can_write(&self) -> bool {
        matches!(self, SessionRole::Manager)
    }
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionRole::Manager => write!(f, "manager"),
            SessionRole::Viewer => write!(f, "viewer"),
        }
    }
}

/// An operation a session asks the engine (or dashboard) to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Read a table through the curated or generic SELECT.
    Read,
    /// Render the insert form for a table.
    InsertForm,
    /// Insert a row.
    Insert,
    /// Render the update form for a table or row.
    UpdateForm,
    /// Update a row.
    Update,
    /// Render the delete picker for a table.
    DeleteForm,
    /// Delete a row (both the preview and the confirmed phase).
    Delete,
    /// Open the per-table actions menu (insert / update / delete links).
    ActionsMenu,
    /// Run a read-only statement in the query console.
    ConsoleRead,
    /// Run any other statement in the query console.
    ConsoleWrite,
}

impl Operation {
    /// Operations that mutate data or expose the mutation paths.
    pub fn is_write(&self) -> bool {
        !matches!(self, Operation::Read | Operation::ConsoleRead)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::InsertForm => "open the insert form",
            Operation::Insert => "insert",
            Operation::UpdateForm => "open the update form",
            Operation::Update => "update",
            Operation::DeleteForm => "open the delete form",
            Operation::Delete => "delete",
            Operation::ActionsMenu => "open the actions menu",
            Operation::ConsoleRead => "run read queries",
            Operation::ConsoleWrite => "run write queries",
        };
        write!(f, "{}", name)
    }
}
