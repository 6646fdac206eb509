use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::auth::provider::{Credentials, IdentityProvider, ProviderError, UserInfo};
use crate::auth::session::LoginSession;
use crate::error::AppError;

/// Reasons a provider login is refused. Each renders as a JSON message.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid state parameter.")]
    InvalidState,

    #[error("Failed to upgrade the authorization code.")]
    CodeExchange(#[source] ProviderError),

    #[error("Token info error: {0}")]
    TokenInfo(serde_json::Value),

    #[error("Token's user ID doesn't match given user ID.")]
    SubjectMismatch,

    #[error("Token's client ID does not match app's.")]
    ClientMismatch,

    #[error("Failed to fetch user info.")]
    Profile(#[source] ProviderError),

    #[error("Failed to store user.")]
    Storage(#[from] AppError),
}

impl IntoResponse for ConnectError {
    fn into_response(self) -> Response {
        match self {
            ConnectError::TokenInfo(error) => {
                tracing::warn!("Token info returned error: {}", error);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            }
            ConnectError::CodeExchange(ref e) => {
                tracing::warn!("Code exchange failed: {}", e);
                (StatusCode::UNAUTHORIZED, Json(self.to_string())).into_response()
            }
            ConnectError::Profile(ref e) => {
                tracing::error!("User info request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(self.to_string())).into_response()
            }
            ConnectError::Storage(ref e) => {
                tracing::error!("Failed to store user: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(self.to_string())).into_response()
            }
            ConnectError::InvalidState
            | ConnectError::SubjectMismatch
            | ConnectError::ClientMismatch => {
                tracing::warn!("Login rejected: {}", self);
                (StatusCode::UNAUTHORIZED, Json(self.to_string())).into_response()
            }
        }
    }
}

/// A code that passed every provenance check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifiedLogin {
    /// The session already holds a token for this provider subject.
    AlreadyConnected,
    Fresh(Credentials),
}

/// Check the anti-forgery state, exchange the code and confirm the token
/// belongs to the same subject and was issued to `client_id`.
///
/// `session` is a snapshot; nothing is written to it here.
pub async fn verify_login(
    session: &LoginSession,
    state: Option<&str>,
    code: &str,
    provider: &dyn IdentityProvider,
    client_id: &str,
) -> Result<VerifiedLogin, ConnectError> {
    if !session.state_matches(state) {
        return Err(ConnectError::InvalidState);
    }

    let credentials = provider
        .exchange_code(code.trim())
        .await
        .map_err(ConnectError::CodeExchange)?;

    let info = provider
        .token_info(&credentials.access_token)
        .await
        .map_err(|e| ConnectError::TokenInfo(serde_json::Value::String(e.to_string())))?;

    if let Some(error) = info.error {
        return Err(ConnectError::TokenInfo(error));
    }

    if info.user_id.as_deref() != Some(credentials.subject.as_str()) {
        return Err(ConnectError::SubjectMismatch);
    }

    if client_id.is_empty() || info.issued_to.as_deref() != Some(client_id) {
        return Err(ConnectError::ClientMismatch);
    }

    if session.is_connected_as(&credentials.subject) {
        return Ok(VerifiedLogin::AlreadyConnected);
    }

    Ok(VerifiedLogin::Fresh(credentials))
}

/// Record a completed login on the session.
pub fn apply_login(
    session: &mut LoginSession,
    provider: &str,
    credentials: Credentials,
    profile: &UserInfo,
    user_id: i64,
) {
    session.access_token = Some(credentials.access_token);
    session.subject = Some(credentials.subject);
    session.provider = Some(provider.to_string());
    session.username = Some(profile.name.clone());
    session.picture = profile.picture.clone();
    session.email = Some(profile.email.clone());
    session.user_id = Some(user_id);
    session.flash(format!("You are now logged in as {}", profile.name));
}
