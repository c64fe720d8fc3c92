//! Error types for the dashboard crate.

use crate::templates;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use thiserror::Error;
use wicket_engine::{DatabaseError, EngineError};

/// Errors that can occur in the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Failed to start the server.
    #[error("failed to start dashboard: {0}")]
    StartupFailed(String),

    /// No valid session cookie.
    #[error("not logged in")]
    NotLoggedIn,

    /// Invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The per-request connection could not be opened.
    #[error(transparent)]
    Connection(#[from] DatabaseError),

    /// The engine refused or failed the request.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            DashboardError::NotLoggedIn => StatusCode::SEE_OTHER,
            DashboardError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DashboardError::Engine(e) => match e {
                EngineError::AccessDenied(_) => StatusCode::FORBIDDEN,
                EngineError::Schema { .. } | EngineError::RowNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                EngineError::IdentifierSafety(_)
                | EngineError::NoPrimaryKey { .. }
                | EngineError::NoUpdatableFields { .. }
                | EngineError::MissingKey { .. } => StatusCode::BAD_REQUEST,
                EngineError::Database(_) => StatusCode::BAD_GATEWAY,
            },
            DashboardError::Connection(_) => StatusCode::BAD_GATEWAY,
            DashboardError::StartupFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        if matches!(self, DashboardError::NotLoggedIn) {
            return Redirect::to("/").into_response();
        }

        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Dashboard request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Dashboard request rejected");
        }

        let title = status.canonical_reason().unwrap_or("Error");
        let body = templates::card(
            title,
            &format!(
                "{}<div class=\"mt-4\">{}</div>",
                templates::alert(&self.to_string(), false),
                templates::link_button("Back to tables", "/dashboard", "secondary")
            ),
        );
        (status, Html(templates::layout(title, None, &body))).into_response()
    }
}
