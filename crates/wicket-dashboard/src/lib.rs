//! # wicket-dashboard
//!
//! Admin web UI for a MySQL database.
//!
//! Users sign in with their own database account. The account's identity
//! decides whether the session is a manager, who may insert, update and
//! delete rows, or a viewer, who may only read. Pages:
//!
//! - Table list with per-table actions
//! - Table viewer, using curated views where they exist
//! - Insert, update and delete forms generated from the table schema
//! - Query console
//!
//! ## Tech Stack
//!
//! - Axum for HTTP server
//! - Server-rendered HTML styled with Tailwind CSS

pub mod auth;
pub mod connector;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

pub use connector::{Connector, MySqlConnector};
pub use error::DashboardError;
pub use routes::create_router;
pub use server::DashboardServer;
pub use state::{AppState, SessionStore};
