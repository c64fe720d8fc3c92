//! The access gate.
//!
//! Managers may do everything. Viewers may only read tables and run
//! read-only console statements.

use crate::error::AccessDenied;
use crate::request::{Operation, SessionRole};

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether `role` may perform `operation`.
pub fn authorize(role: SessionRole, operation: Operation) -> Decision {
    match role {
        SessionRole::Manager => Decision::Allow,
        SessionRole::Viewer if operation.is_write() => Decision::Deny,
        SessionRole::Viewer => Decision::Allow,
    }
}

/// [`authorize`], turning a denial into an error.
pub fn ensure_allowed(role: SessionRole, operation: Operation) -> Result<(), AccessDenied> {
    match authorize(role, operation) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            tracing::warn!(%role, ?operation, "Access denied by role gate");
            Err(AccessDenied::new(role, operation))
        }
    }
}
