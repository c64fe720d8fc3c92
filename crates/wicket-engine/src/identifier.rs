//! Identifier safety check.
//!
//! Table and column names cannot be bound as statement parameters, so they
//! are spliced into statement text. Every identifier passes through
//! [`validate_identifier`] first. Names containing anything other than ASCII
//! letters, digits and underscore are rejected outright; they are never
//! escaped or truncated into something that would pass.

use thiserror::Error;

/// Longest identifier MySQL accepts.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// An identifier failed the safe-character check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsafe identifier '{identifier}': {reason}")]
pub struct IdentifierError {
    pub identifier: String,
    pub reason: &'static str,
}

impl IdentifierError {
    fn new(identifier: &str, reason: &'static str) -> Self {
        Self {
            identifier: identifier.to_string(),
            reason,
        }
    }
}

/// Check that `ident` is safe to interpolate into statement text.
pub fn validate_identifier(ident: &str) -> Result<&str, IdentifierError> {
    if ident.is_empty() {
        return Err(IdentifierError::new(ident, "identifier is empty"));
    }
    if ident.len() > MAX_IDENTIFIER_LEN {
        return Err(IdentifierError::new(ident, "identifier is too long"));
    }
    if !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(IdentifierError::new(
            ident,
            "only letters, digits and underscore are allowed",
        ));
    }
    if ident.chars().all(|c| c.is_ascii_digit()) {
        return Err(IdentifierError::new(ident, "identifier is all digits"));
    }
    Ok(ident)
}

pub fn is_safe_identifier(ident: &str) -> bool {
    validate_identifier(ident).is_ok()
}

/// Validate every identifier, returning the first failure.
pub fn validate_all<'a, I>(idents: I) -> Result<(), IdentifierError>
where
    I: IntoIterator<Item = &'a str>,
{
    for ident in idents {
        validate_identifier(ident)?;
    }
    Ok(())
}
