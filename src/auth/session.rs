use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;

const STATE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const STATE_LEN: usize = 32;

/// Per-browser login state, kept in process memory.
#[derive(Debug, Clone)]
pub struct LoginSession {
    /// Anti-forgery token issued with the most recently rendered page.
    pub state: Option<String>,
    pub access_token: Option<String>,
    /// Identity provider's id for the signed-in user (`sub` claim).
    pub subject: Option<String>,
    pub provider: Option<String>,
    pub username: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
    pub user_id: Option<i64>,
    flashes: Vec<String>,
    expires_at: Instant,
}

impl LoginSession {
    fn new(ttl: Duration) -> Self {
        Self {
            state: None,
            access_token: None,
            subject: None,
            provider: None,
            username: None,
            picture: None,
            email: None,
            user_id: None,
            flashes: Vec::new(),
            expires_at: Instant::now() + ttl,
        }
    }

    /// Signed in through a provider and linked to a user row.
    pub fn logged_in_user(&self) -> Option<i64> {
        self.provider.as_ref().and(self.user_id)
    }

    /// Issue a fresh anti-forgery token, replacing the previous one.
    pub fn rotate_state(&mut self) -> String {
        let state = generate_state();
        self.state = Some(state.clone());
        state
    }

    pub fn state_matches(&self, candidate: Option<&str>) -> bool {
        match (self.state.as_deref(), candidate) {
            (Some(expected), Some(given)) => !expected.is_empty() && expected == given,
            _ => false,
        }
    }

    /// Same provider subject already holds an access token here.
    pub fn is_connected_as(&self, subject: &str) -> bool {
        self.access_token.is_some() && self.subject.as_deref() == Some(subject)
    }

    /// Forget everything tied to the provider login. The anti-forgery state
    /// and pending flashes survive.
    pub fn clear_login(&mut self) {
        self.access_token = None;
        self.subject = None;
        self.provider = None;
        self.username = None;
        self.picture = None;
        self.email = None;
        self.user_id = None;
    }

    pub fn flash(&mut self, message: impl Into<String>) {
        self.flashes.push(message.into());
    }

    pub fn take_flashes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.flashes)
    }
}

/// Upper bound on live sessions unless configured otherwise.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Store for browser sessions, keyed by the session cookie value.
///
/// Expired entries are swept at most once a minute, when new sessions are
/// created. When the store is full the session closest to
/// expiry is evicted.
pub struct SessionStore {
    sessions: HashMap<String, LoginSession>,
    ttl: Duration,
    max_sessions: usize,
    next_sweep: Instant,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
            max_sessions: DEFAULT_MAX_SESSIONS,
            next_sweep: Instant::now() + SWEEP_INTERVAL,
        }
    }

    pub fn with_hours(hours: u64) -> Self {
        Self::new(Duration::from_secs(hours * 3600))
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Start a new empty session and return its id.
    pub fn create(&mut self) -> String {
        let now = Instant::now();
        if now >= self.next_sweep {
            self.purge_expired();
            self.next_sweep = now + SWEEP_INTERVAL;
        }
        if self.sessions.len() >= self.max_sessions {
            self.purge_expired();
        }
        if self.sessions.len() >= self.max_sessions {
            self.evict_oldest();
        }

        let id = generate_session_id();
        self.sessions.insert(id.clone(), LoginSession::new(self.ttl));
        id
    }

    /// True when `id` names a live session.
    pub fn is_live(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&LoginSession> {
        self.sessions
            .get(id)
            .filter(|s| Instant::now() < s.expires_at)
    }

    /// Session for `id`, recreated empty if it expired mid-request.
    pub fn entry(&mut self, id: &str) -> &mut LoginSession {
        let ttl = self.ttl;
        let session = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| LoginSession::new(ttl));
        if Instant::now() >= session.expires_at {
            *session = LoginSession::new(ttl);
        }
        session
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn purge_expired(&mut self) {
        let now = Instant::now();
        self.sessions.retain(|_, session| now < session.expires_at);
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|(_, session)| session.expires_at)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            tracing::warn!("Session store full ({} entries), evicting oldest", self.max_sessions);
            self.sessions.remove(&id);
        }
    }
}

/// Random 32-character token of uppercase letters and digits.
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    (0..STATE_LEN)
        .map(|_| STATE_CHARSET[rng.gen_range(0..STATE_CHARSET.len())] as char)
        .collect()
}

/// Cryptographically random 32-byte hex session id.
fn generate_session_id() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}
