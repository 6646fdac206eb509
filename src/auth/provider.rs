//! Identity provider client.
//!
//! The OAuth handshake only needs four calls from the provider: exchange a
//! one-time code, introspect the resulting access token, read the user's
//! profile and revoke the token on logout. [`IdentityProvider`] is the seam
//! between those calls and the session logic; [`GoogleProvider`] talks to
//! Google's endpoints over HTTP.

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, Validation};
use serde::Deserialize;

use crate::config::OAuthConfig;

/// Result of a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    /// `sub` claim of the id token returned alongside the access token.
    pub subject: String,
}

/// Token introspection response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub issued_to: Option<String>,
}

/// Profile fields the catalog keeps for a user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token exchange rejected: {0}")]
    Exchange(String),

    #[error("Invalid id token: {0}")]
    IdToken(#[from] jsonwebtoken::errors::Error),

    #[error("Revoke returned status {0}")]
    Revoke(u16),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name stored on sessions and user rows.
    fn name(&self) -> &'static str;

    async fn exchange_code(&self, code: &str) -> Result<Credentials, ProviderError>;

    async fn token_info(&self, access_token: &str) -> Result<TokenInfo, ProviderError>;

    async fn user_info(&self, access_token: &str) -> Result<UserInfo, ProviderError>;

    async fn revoke(&self, access_token: &str) -> Result<(), ProviderError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct IdTokenClaims {
    sub: String,
}

/// Google OAuth 2.0 endpoints.
pub struct GoogleProvider {
    http: reqwest::Client,
    config: OAuthConfig,
}

impl GoogleProvider {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn exchange_code(&self, code: &str) -> Result<Credentials, ProviderError> {
        let resp = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Exchange(format!("{}: {}", status, body)));
        }

        let token: TokenResponse = resp.json().await?;
        let id_token = token
            .id_token
            .ok_or_else(|| ProviderError::Exchange("response carried no id_token".into()))?;

        Ok(Credentials {
            access_token: token.access_token,
            subject: id_token_subject(&id_token)?,
        })
    }

    async fn token_info(&self, access_token: &str) -> Result<TokenInfo, ProviderError> {
        // Invalid tokens come back as 400 with an `error` field, so the body
        // is parsed regardless of status.
        let info = self
            .http
            .get(&self.config.tokeninfo_url)
            .query(&[("access_token", access_token)])
            .send()
            .await?
            .json()
            .await?;
        Ok(info)
    }

    async fn user_info(&self, access_token: &str) -> Result<UserInfo, ProviderError> {
        let info = self
            .http
            .get(&self.config.userinfo_url)
            .query(&[("access_token", access_token), ("alt", "json")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(info)
    }

    async fn revoke(&self, access_token: &str) -> Result<(), ProviderError> {
        let resp = self
            .http
            .get(&self.config.revoke_url)
            .query(&[("token", access_token)])
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::Revoke(resp.status().as_u16()))
        }
    }
}

/// Read the `sub` claim of an id token.
///
/// The signature is not checked: the token was received directly from the
/// provider's token endpoint over TLS.
pub fn id_token_subject(id_token: &str) -> Result<String, ProviderError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<IdTokenClaims>(
        id_token,
        &DecodingKey::from_secret(&[]),
        &validation,
    )?;
    Ok(data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn id_token_subject_reads_sub_claim() {
        let claims = serde_json::json!({
            "sub": "110169484474386276334",
            "aud": "client.apps.googleusercontent.com",
            "email": "ana@example.com",
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"provider-key"),
        )
        .unwrap();

        assert_eq!(id_token_subject(&token).unwrap(), "110169484474386276334");
    }

    #[test]
    fn id_token_subject_rejects_garbage() {
        assert!(matches!(
            id_token_subject("not-a-jwt"),
            Err(ProviderError::IdToken(_))
        ));
    }

    #[test]
    fn token_info_tolerates_missing_fields() {
        let info: TokenInfo = serde_json::from_str(r#"{"error": "invalid_token"}"#).unwrap();
        assert_eq!(info.error, Some(serde_json::json!("invalid_token")));
        assert!(info.user_id.is_none());
        assert!(info.issued_to.is_none());
    }

    #[test]
    fn google_provider_is_named_google() {
        let provider = GoogleProvider::new(OAuthConfig::default());
        assert_eq!(provider.name(), "google");
    }
}
