//! Wicket access control.
//!
//! A session's role is derived once, at login, from the authenticated
//! database identity. Every engine entry point then asks the access gate
//! whether the role may perform the requested operation before touching the
//! database.
//!
//! The gate is a pure function of `(role, operation)`: it keeps no state and
//! never consults the database, so a denial can never leak schema details.

pub mod error;
pub mod gate;
pub mod request;

pub use error::AccessDenied;
pub use gate::{Decision, authorize, ensure_allowed};
pub use request::{Operation, SessionRole};
