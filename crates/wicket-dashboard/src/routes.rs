//! Route definitions for the dashboard.

use crate::auth;
use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Create the dashboard router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(auth::login_page).post(auth::login_submit))
        .route("/logout", get(auth::logout))
        .route("/dashboard", get(handlers::dashboard))
        .route("/viewdb", get(handlers::view_database))
        .route("/viewdb/{table}", get(handlers::view_table))
        .route("/actions/{table}", get(handlers::actions))
        .route(
            "/insert/{table}",
            get(handlers::insert_form).post(handlers::insert_submit),
        )
        .route(
            "/update/{table}",
            get(handlers::update_form).post(handlers::update_submit),
        )
        .route(
            "/delete/{table}",
            get(handlers::delete_form).post(handlers::delete_submit),
        )
        .route(
            "/query",
            get(handlers::query_page).post(handlers::query_submit),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
