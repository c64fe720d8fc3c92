//! Request handlers for the dashboard.
//!
//! Every handler opens its own connection with the session's credentials
//! and hands it to the engine. Write pages check the session role before
//! the connection is opened; the engine checks it again.

use axum::{
    Form,
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;
use wicket_engine::{
    DeleteResponse, EngineError, EngineResponse, MutationOutcome, SubmittedFields,
};
use wicket_policy::{Operation, ensure_allowed};

use crate::auth::CurrentSession;
use crate::error::DashboardError;
use crate::pages::{self, CONFIRM_FIELD, KEY_FIELD};
use crate::state::AppState;

type PageResult = Result<Html<String>, DashboardError>;

/// Query string of the update page.
#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

/// Console form data
#[derive(Debug, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    pub sql: String,
}

fn require(session: &CurrentSession, operation: Operation) -> Result<(), DashboardError> {
    ensure_allowed(session.context().role, operation).map_err(EngineError::from)?;
    Ok(())
}

/// Split the control fields off a submitted form.
fn split_controls(mut form: SubmittedFields) -> (Option<String>, bool, SubmittedFields) {
    let key = form.remove(KEY_FIELD).filter(|k| !k.is_empty());
    let confirmed = form.remove(CONFIRM_FIELD).is_some_and(|v| v == "yes");
    (key, confirmed, form)
}

// =============================================================================
// Browsing
// =============================================================================

/// Handler for the table list.
pub async fn dashboard(State(state): State<AppState>, session: CurrentSession) -> PageResult {
    let mut db = session.connect(&state).await?;
    let tables = state
        .engine()
        .list_tables(db.as_mut(), session.context())
        .await?;
    Ok(Html(pages::dashboard_page(
        session.nav_user(),
        state.config().project_name(),
        &tables,
        session.context().role.can_write(),
    )))
}

/// Handler for the table picker.
pub async fn view_database(State(state): State<AppState>, session: CurrentSession) -> PageResult {
    let mut db = session.connect(&state).await?;
    let tables = state
        .engine()
        .list_tables(db.as_mut(), session.context())
        .await?;
    Ok(Html(pages::view_database_page(session.nav_user(), &tables)))
}

/// Handler for one table's rows.
pub async fn view_table(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(table): Path<String>,
) -> PageResult {
    let mut db = session.connect(&state).await?;
    let rows = state
        .engine()
        .read(db.as_mut(), session.context(), &table)
        .await?;
    let curated = state.engine().views().contains(&table);
    Ok(Html(pages::view_table_page(
        session.nav_user(),
        &table,
        &rows,
        curated,
    )))
}

/// Handler for the per-table actions menu.
pub async fn actions(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(table): Path<String>,
) -> PageResult {
    state.engine().actions_menu(session.context(), &table)?;
    Ok(Html(pages::actions_page(session.nav_user(), &table)))
}

// =============================================================================
// Insert
// =============================================================================

pub async fn insert_form(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(table): Path<String>,
) -> PageResult {
    require(&session, Operation::InsertForm)?;
    let mut db = session.connect(&state).await?;
    let form = state
        .engine()
        .insert_form(db.as_mut(), session.context(), &table)
        .await?;
    Ok(Html(pages::insert_page(session.nav_user(), &form, None)))
}

pub async fn insert_submit(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(table): Path<String>,
    Form(fields): Form<SubmittedFields>,
) -> PageResult {
    require(&session, Operation::Insert)?;
    let (_, _, fields) = split_controls(fields);
    let mut db = session.connect(&state).await?;
    let engine = state.engine();

    let outcome = engine
        .insert(db.as_mut(), session.context(), &table, &fields)
        .await?;
    log_outcome(&session, "insert", &table, &outcome);

    let form = engine
        .insert_form(db.as_mut(), session.context(), &table)
        .await?;
    Ok(Html(pages::insert_page(
        session.nav_user(),
        &form,
        Some(&outcome),
    )))
}

// =============================================================================
// Update
// =============================================================================

pub async fn update_form(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(table): Path<String>,
    Query(query): Query<KeyQuery>,
) -> PageResult {
    require(&session, Operation::UpdateForm)?;
    let mut db = session.connect(&state).await?;
    let key = query.key.filter(|k| !k.is_empty());
    let form = state
        .engine()
        .update_form(db.as_mut(), session.context(), &table, key.as_deref())
        .await?;
    Ok(Html(pages::update_page(session.nav_user(), &form, None)))
}

pub async fn update_submit(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(table): Path<String>,
    Form(fields): Form<SubmittedFields>,
) -> PageResult {
    require(&session, Operation::Update)?;
    let (key, _, fields) = split_controls(fields);
    let key = key.ok_or_else(|| DashboardError::InvalidRequest("no row selected".to_string()))?;
    let mut db = session.connect(&state).await?;
    let engine = state.engine();

    let outcome = engine
        .update(db.as_mut(), session.context(), &table, &key, &fields)
        .await?;
    log_outcome(&session, "update", &table, &outcome);

    let form = engine
        .update_form(db.as_mut(), session.context(), &table, Some(&key))
        .await?;
    Ok(Html(pages::update_page(
        session.nav_user(),
        &form,
        Some(&outcome),
    )))
}

// =============================================================================
// Delete
// =============================================================================

pub async fn delete_form(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(table): Path<String>,
) -> PageResult {
    require(&session, Operation::DeleteForm)?;
    let mut db = session.connect(&state).await?;
    let form = state
        .engine()
        .delete_form(db.as_mut(), session.context(), &table)
        .await?;
    Ok(Html(pages::delete_page(session.nav_user(), &form, None)))
}

/// First submission previews the row, the confirmed one deletes it.
pub async fn delete_submit(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(table): Path<String>,
    Form(fields): Form<SubmittedFields>,
) -> PageResult {
    require(&session, Operation::Delete)?;
    let (key, confirmed, _) = split_controls(fields);
    let key = key.ok_or_else(|| DashboardError::InvalidRequest("no row selected".to_string()))?;
    let mut db = session.connect(&state).await?;
    let engine = state.engine();

    match engine
        .delete(db.as_mut(), session.context(), &table, &key, confirmed)
        .await?
    {
        DeleteResponse::Preview { key, row } => Ok(Html(pages::delete_confirm_page(
            session.nav_user(),
            &table,
            &key,
            &row,
        ))),
        DeleteResponse::Done(outcome) => {
            log_outcome(&session, "delete", &table, &outcome);
            let form = engine
                .delete_form(db.as_mut(), session.context(), &table)
                .await?;
            Ok(Html(pages::delete_page(
                session.nav_user(),
                &form,
                Some(&outcome),
            )))
        }
    }
}

// =============================================================================
// Console
// =============================================================================

pub async fn query_page(session: CurrentSession) -> Html<String> {
    Html(pages::query_page(session.nav_user(), "", None, None))
}

pub async fn query_submit(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<QueryForm>,
) -> PageResult {
    if form.sql.trim().is_empty() {
        return Ok(Html(pages::query_page(session.nav_user(), "", None, None)));
    }

    let mut db = session.connect(&state).await?;
    let response = state
        .engine()
        .console(db.as_mut(), session.context(), &form.sql)
        .await?;

    let html = match response {
        EngineResponse::Rows(rows) => {
            pages::query_page(session.nav_user(), &form.sql, Some(&rows), None)
        }
        EngineResponse::Mutation(outcome) => {
            log_outcome(&session, "console", "-", &outcome);
            pages::query_page(session.nav_user(), &form.sql, None, Some(&outcome))
        }
        other => {
            return Err(DashboardError::InvalidRequest(format!(
                "unexpected console response: {:?}",
                other
            )));
        }
    };
    Ok(Html(html))
}

fn log_outcome(session: &CurrentSession, action: &str, table: &str, outcome: &MutationOutcome) {
    if outcome.success {
        tracing::info!(
            user = %session.session.username,
            action,
            table,
            affected = outcome.affected,
            "Write committed"
        );
    } else {
        tracing::warn!(
            user = %session.session.username,
            action,
            table,
            message = %outcome.message,
            "Write failed"
        );
    }
}
