use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tokio::sync::Mutex;

use crate::auth::provider::IdentityProvider;
use crate::auth::session::SessionStore;
use crate::config::Config;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type SharedSessions = Arc<Mutex<SessionStore>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub sessions: SharedSessions,
    pub provider: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config, provider: Arc<dyn IdentityProvider>) -> Self {
        let sessions = SessionStore::with_hours(config.auth.session_hours)
            .with_max_sessions(config.auth.max_sessions);
        Self {
            db,
            config,
            sessions: Arc::new(Mutex::new(sessions)),
            provider,
        }
    }
}
