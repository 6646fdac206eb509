use askama::Template;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::oauth::{self, ConnectError, VerifiedLogin};
use crate::auth::provider::UserInfo;
use crate::catalog::repository;
use crate::error::AppResult;
use crate::extractors::SessionHandle;
use crate::routes::home::{Html, Viewer};
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub viewer: Viewer,
}

/// Fragment returned to the sign-in script after a successful login.
#[derive(Template)]
#[template(path = "components/welcome.html")]
pub struct WelcomeTemplate {
    pub name: String,
    pub picture: Option<String>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct ConnectQuery {
    pub state: Option<String>,
}

// -- Handlers --

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    session: SessionHandle,
) -> AppResult<Response> {
    let viewer = Viewer::issue(&session, &state).await;
    Ok(Html(LoginTemplate { viewer }).into_response())
}

/// POST /gconnect?state=... with the one-time authorization code as the body.
pub async fn gconnect(
    State(state): State<AppState>,
    session: SessionHandle,
    Query(query): Query<ConnectQuery>,
    code: String,
) -> Result<Response, ConnectError> {
    let snapshot = session.snapshot().await;
    let provider = state.provider.as_ref();

    let verified = oauth::verify_login(
        &snapshot,
        query.state.as_deref(),
        &code,
        provider,
        &state.config.oauth.client_id,
    )
    .await?;

    let credentials = match verified {
        VerifiedLogin::AlreadyConnected => {
            return Ok(Json("Current user is already connected.").into_response());
        }
        VerifiedLogin::Fresh(credentials) => credentials,
    };

    let profile = provider
        .user_info(&credentials.access_token)
        .await
        .map_err(ConnectError::Profile)?;

    let user_id = register_user(&state, &profile, provider.name())?;

    session
        .with(|s| oauth::apply_login(s, provider.name(), credentials, &profile, user_id))
        .await;
    tracing::info!("{} logged in as user #{}", profile.email, user_id);

    Ok(Html(WelcomeTemplate {
        name: profile.name,
        picture: profile.picture,
    })
    .into_response())
}

/// Id of the catalog user behind `profile`, created on first login.
fn register_user(state: &AppState, profile: &UserInfo, provider: &str) -> AppResult<i64> {
    let conn = state.db.get()?;
    Ok(repository::find_or_create_user(
        &conn,
        &profile.name,
        &profile.email,
        profile.picture.as_deref(),
        provider,
    )?)
}

/// GET /gdisconnect: revoke the provider token and forget the login.
///
/// Reachable by plain GET, so a cross-site link can sign the user out. It
/// never signs anyone in or touches catalog records.
pub async fn gdisconnect(State(state): State<AppState>, session: SessionHandle) -> Response {
    disconnect(&state, &session).await
}

/// POST /logout: dispatch on the provider the session signed in with.
pub async fn logout(State(state): State<AppState>, session: SessionHandle) -> Response {
    let provider = session.with(|s| s.provider.clone()).await;
    match provider.as_deref() {
        Some(name) if name == state.provider.name() => disconnect(&state, &session).await,
        _ => Json(json!({ "state": "notConnected" })).into_response(),
    }
}

async fn disconnect(state: &AppState, session: &SessionHandle) -> Response {
    let Some(token) = session.with(|s| s.access_token.clone()).await else {
        return (
            StatusCode::UNAUTHORIZED,
            Json("Current user not connected."),
        )
            .into_response();
    };

    match state.provider.revoke(&token).await {
        Ok(()) => {
            session
                .with(|s| {
                    s.clear_login();
                    s.flash("You have successfully been logged out.");
                })
                .await;
            Json(json!({ "state": "loggedOut" })).into_response()
        }
        Err(e) => {
            tracing::warn!("Failed to revoke token: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "state": "errorRevoke" })),
            )
                .into_response()
        }
    }
}
