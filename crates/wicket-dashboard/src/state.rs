//! Dashboard application state.

use crate::connector::Connector;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;
use wicket_core::WicketConfig;
use wicket_engine::{CrudEngine, SessionContext};

/// Shared application state for the dashboard.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WicketConfig,
    engine: CrudEngine,
    connector: Arc<dyn Connector>,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(config: WicketConfig, connector: Arc<dyn Connector>) -> Self {
        let engine = CrudEngine::new(config.engine.clone());
        let max_age = Duration::from_secs(config.dashboard.session_max_age_seconds);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                engine,
                connector,
                sessions: SessionStore::new(max_age),
            }),
        }
    }

    pub fn config(&self) -> &WicketConfig {
        &self.inner.config
    }

    pub fn engine(&self) -> &CrudEngine {
        &self.inner.engine
    }

    pub fn connector(&self) -> &dyn Connector {
        self.inner.connector.as_ref()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }
}

/// A logged-in dashboard session.
///
/// The password is kept so each request can open its own connection as
/// the same database account.
#[derive(Clone)]
pub struct Session {
    pub username: String,
    pub password: String,
    pub context: SessionContext,
    created_at: Instant,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// In-process session store keyed by the session cookie.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    max_age: Duration,
}

impl SessionStore {
    pub fn new(max_age: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Store a new session and return its id.
    pub async fn create(&self, username: &str, password: &str, context: SessionContext) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            username: username.to_string(),
            password: password.to_string(),
            context,
            created_at: Instant::now(),
        };
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.created_at.elapsed() < self.max_age);
        sessions.insert(id, session);
        id
    }

    /// The live session for `id`, if any.
    pub async fn get(&self, id: &Uuid) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .filter(|s| s.created_at.elapsed() < self.max_age)
            .cloned()
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
