//! Login, logout and the session extractor.
//!
//! Logging in opens a connection with the submitted credentials. If that
//! succeeds the role is derived from the identity the server reports, and
//! a session id cookie maps to the stored credentials from then on. The
//! role is fixed until the next login.

use axum::{
    Form,
    extract::{FromRequestParts, State},
    http::{HeaderMap, header, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use uuid::Uuid;
use wicket_engine::{Database, SessionContext};

use crate::error::DashboardError;
use crate::state::{AppState, Session};
use crate::templates;

/// Session cookie name
pub const SESSION_COOKIE_NAME: &str = "wicket_session";

/// Login form data
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub user: String,
    pub password: String,
}

/// The session behind the request's cookie. Rejects with a redirect to the
/// login page.
pub struct CurrentSession {
    pub id: Uuid,
    pub session: Session,
}

impl CurrentSession {
    pub fn context(&self) -> &SessionContext {
        &self.session.context
    }

    /// Name and role for the nav bar.
    pub fn nav_user(&self) -> Option<(&str, &str)> {
        let role = if self.session.context.role.can_write() {
            "manager"
        } else {
            "viewer"
        };
        Some((self.session.username.as_str(), role))
    }

    /// Open this request's connection.
    pub async fn connect(&self, state: &AppState) -> Result<Box<dyn Database>, DashboardError> {
        let db = state
            .connector()
            .connect(&self.session.username, &self.session.password)
            .await?;
        Ok(db)
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = DashboardError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = session_id(&parts.headers).ok_or(DashboardError::NotLoggedIn)?;
        let session = state
            .sessions()
            .get(&id)
            .await
            .ok_or(DashboardError::NotLoggedIn)?;
        Ok(Self { id, session })
    }
}

/// Session id from the cookie header.
fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| {
            cookie
                .trim()
                .strip_prefix(SESSION_COOKIE_NAME)?
                .strip_prefix('=')
        })
        .find_map(|value| Uuid::parse_str(value).ok())
}

/// Handler for the login page (GET)
pub async fn login_page() -> Html<String> {
    Html(login_page_template(None))
}

/// Handler for login form submission (POST)
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match establish(&state, &form).await {
        Ok(context) => {
            tracing::info!(
                user = %form.user,
                identity = %context.identity,
                role = %context.role,
                "Login succeeded"
            );
            let id = state
                .sessions()
                .create(&form.user, &form.password, context)
                .await;
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                SESSION_COOKIE_NAME,
                id,
                state.sessions().max_age().as_secs()
            );
            ([(header::SET_COOKIE, cookie)], Redirect::to("/dashboard")).into_response()
        }
        Err(e) => {
            tracing::warn!(user = %form.user, error = %e, "Login failed");
            Html(login_page_template(Some(&format!("Login failed: {}", e)))).into_response()
        }
    }
}

/// Connect with the submitted credentials and derive the session role.
async fn establish(state: &AppState, form: &LoginForm) -> Result<SessionContext, DashboardError> {
    let mut db = state.connector().connect(&form.user, &form.password).await?;
    let identity = db.current_identity().await?;
    Ok(SessionContext::from_identity(
        identity,
        &state.config().engine.viewer_prefix,
    ))
}

/// Handler for logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        state.sessions().remove(&id).await;
    }
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE_NAME
    );
    ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}

fn login_page_template(message: Option<&str>) -> String {
    let message_html = message
        .map(|m| templates::alert(m, false))
        .unwrap_or_default();

    let content = format!(
        r##"<div class="max-w-md mx-auto mt-16">
        <div class="bg-white rounded-2xl shadow-2xl p-8 space-y-5">
            <div class="text-center">
                <h2 class="text-xl font-semibold text-gray-900">Sign in</h2>
                <p class="text-gray-500 mt-1">Use your database account</p>
            </div>
            {message_html}
            <form method="POST" action="/" class="space-y-5">
                {user}
                <div class="space-y-1">
                    <label for="password" class="block text-sm font-medium text-gray-700">Password</label>
                    <input type="password" id="password" name="password"
                           class="w-full px-4 py-2 border border-gray-300 rounded-lg focus:ring-2 focus:ring-emerald-500">
                </div>
                {submit}
            </form>
        </div>
    </div>"##,
        user = templates::input("user", "Username", "", "e.g. manager1"),
        submit = templates::submit_button("Sign In", "primary"),
    );
    templates::layout("Login", None, &content)
}
