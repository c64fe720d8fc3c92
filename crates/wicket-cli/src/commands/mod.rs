//! Subcommand implementations for the `wicket` binary.

pub mod check;
pub mod describe;
pub mod serve;
pub mod snapshot;
pub mod views;
