//! Access gate error type.

use crate::request::{Operation, SessionRole};
use thiserror::Error;

/// Raised when a session role is not permitted to perform an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("access denied: {role} sessions may not {operation}")]
pub struct AccessDenied {
    pub role: SessionRole,
    pub operation: Operation,
}

impl AccessDenied {
    pub fn new(role: SessionRole, operation: Operation) -> Self {
        Self { role, operation }
    }
}
