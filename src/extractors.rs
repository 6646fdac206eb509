use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::session::LoginSession;
use crate::error::AppError;
use crate::state::{AppState, SharedSessions};

/// The browser session attached to the current request.
#[derive(Clone)]
pub struct SessionHandle {
    pub id: String,
    store: SharedSessions,
}

impl SessionHandle {
    pub fn new(id: String, store: SharedSessions) -> Self {
        Self { id, store }
    }

    /// Run `f` against the session while holding the store lock.
    pub async fn with<R>(&self, f: impl FnOnce(&mut LoginSession) -> R) -> R {
        let mut store = self.store.lock().await;
        f(store.entry(&self.id))
    }

    pub async fn snapshot(&self) -> LoginSession {
        self.with(|session| session.clone()).await
    }

    /// Logged-in user id, if any.
    pub async fn user_id(&self) -> Option<i64> {
        self.with(|session| session.logged_in_user()).await
    }
}

impl FromRequestParts<AppState> for SessionHandle {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .cloned()
            .ok_or(AppError::MissingSession)
    }
}

/// Attach a session to every request, issuing a cookie to browsers that
/// arrive without a live one.
pub async fn ensure_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = &state.config.auth.cookie_name;
    let presented = cookie_value(request.headers(), cookie_name).map(str::to_string);

    let (id, issued) = {
        let mut store = state.sessions.lock().await;
        match presented {
            Some(id) if store.is_live(&id) => (id, false),
            _ => (store.create(), true),
        }
    };

    request
        .extensions_mut()
        .insert(SessionHandle::new(id.clone(), state.sessions.clone()));

    let mut response = next.run(request).await;

    if issued {
        let cookie = session_cookie(cookie_name, &id, state.config.auth.session_hours);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Invalid session cookie header: {}", e),
        }
    }

    response
}

fn session_cookie(name: &str, id: &str, max_age_hours: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name,
        id,
        max_age_hours * 3600
    )
}

pub fn cookie_value<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}
