//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use spareparts::auth::provider::{
    Credentials, IdentityProvider, ProviderError, TokenInfo, UserInfo,
};
use spareparts::auth::session::LoginSession;
use spareparts::catalog::repository;
use spareparts::config::Config;
use spareparts::db::{self, models::SpareFields};
use spareparts::state::AppState;

pub const CLIENT_ID: &str = "test-client.apps.googleusercontent.com";
pub const ADMIN_EMAIL: &str = "admin@spareparts.local";
pub const FORM_STATE: &str = "FORMSTATE0123456789ABCDEFGHIJKLM";

/// Provider that accepts every code and answers for one fixed account.
pub struct FakeProvider {
    pub revoke_ok: bool,
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn exchange_code(&self, _code: &str) -> Result<Credentials, ProviderError> {
        Ok(Credentials {
            access_token: "access-token".into(),
            subject: "subject-1".into(),
        })
    }

    async fn token_info(&self, _access_token: &str) -> Result<TokenInfo, ProviderError> {
        Ok(TokenInfo {
            error: None,
            user_id: Some("subject-1".into()),
            issued_to: Some(CLIENT_ID.into()),
        })
    }

    async fn user_info(&self, _access_token: &str) -> Result<UserInfo, ProviderError> {
        Ok(UserInfo {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            picture: Some("https://example.com/ana.png".into()),
        })
    }

    async fn revoke(&self, _access_token: &str) -> Result<(), ProviderError> {
        if self.revoke_ok {
            Ok(())
        } else {
            Err(ProviderError::Revoke(400))
        }
    }
}

pub struct TestApp {
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_provider(FakeProvider { revoke_ok: true })
    }

    pub fn with_provider(provider: FakeProvider) -> Self {
        let dir = TempDir::new().unwrap();
        let pool = db::create_pool(&dir.path().join("test.db")).unwrap();
        db::run_migrations(&pool).unwrap();

        let mut config = Config::default();
        config.oauth.client_id = CLIENT_ID.into();
        config.auth.admin_email = ADMIN_EMAIL.into();

        let state = AppState::new(pool, config, Arc::new(provider));
        Self { state, _dir: dir }
    }

    pub fn router(&self) -> Router {
        spareparts::routes::app(self.state.clone())
    }

    pub fn create_user(&self, name: &str, email: &str) -> i64 {
        let conn = self.state.db.get().unwrap();
        repository::create_user(&conn, name, email, None, "google").unwrap()
    }

    pub fn add_spare(&self, name: &str, category: &str, owner: i64) -> i64 {
        let conn = self.state.db.get().unwrap();
        let fields = SpareFields {
            name: name.into(),
            manufacturer: "Nokia".into(),
            category: category.into(),
            unit: "https://bit.ly/2QEsbqB".into(),
            description: "Microwave link unit".into(),
        };
        repository::insert_spare(&conn, &fields, owner).unwrap()
    }

    /// Session cookie for a browser that already rendered a form with
    /// `FORM_STATE`, optionally signed in as `user_id`.
    pub async fn session(&self, user_id: Option<i64>) -> String {
        let mut store = self.state.sessions.lock().await;
        let id = store.create();
        let session = store.entry(&id);
        session.state = Some(FORM_STATE.into());
        if let Some(user_id) = user_id {
            session.provider = Some("google".into());
            session.access_token = Some("access-token".into());
            session.subject = Some("subject-1".into());
            session.username = Some("Tester".into());
            session.user_id = Some(user_id);
        }
        format!("{}={}", self.state.config.auth.cookie_name, id)
    }

    /// Reset the session behind `cookie` to `FORM_STATE` after a page render
    /// rotated it.
    pub async fn session_state(&self, cookie: &str) {
        let id = cookie.split_once('=').map(|(_, id)| id).unwrap();
        let mut store = self.state.sessions.lock().await;
        store.entry(id).state = Some(FORM_STATE.into());
    }

    pub async fn snapshot(&self, cookie: &str) -> LoginSession {
        let id = cookie.split_once('=').map(|(_, id)| id).unwrap();
        let store = self.state.sessions.lock().await;
        store.get(id).cloned().unwrap()
    }
}

pub async fn get(app: Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(app: Router, uri: &str, cookie: &str, form: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_body(app: Router, uri: &str, cookie: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/octet-stream; charset=utf-8")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
