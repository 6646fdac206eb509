use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::extractors::SessionHandle;
use crate::state::AppState;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> Html<T> {
    /// Render with `status`. A template that fails to render is a 500
    /// regardless.
    pub fn with_status(self, status: StatusCode) -> Response {
        match self.0.render() {
            Ok(body) => (
                status,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        self.with_status(StatusCode::OK)
    }
}

/// Per-page chrome shared by every catalog template: the anti-forgery token
/// issued with this render, the signed-in user and pending flash messages.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub state: String,
    pub client_id: String,
    pub provider: Option<String>,
    pub username: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
    pub flashes: Vec<String>,
}

impl Viewer {
    /// Rotate the session's anti-forgery token and collect what the page
    /// needs to show. Flash messages are consumed.
    pub async fn issue(session: &SessionHandle, app: &AppState) -> Self {
        let client_id = app.config.oauth.client_id.clone();
        session
            .with(|s| {
                let logged_in = s.logged_in_user().is_some();
                Viewer {
                    state: s.rotate_state(),
                    client_id,
                    provider: s.provider.clone().filter(|_| logged_in),
                    username: s.username.clone().filter(|_| logged_in),
                    picture: s.picture.clone().filter(|_| logged_in),
                    email: s.email.clone().filter(|_| logged_in),
                    flashes: s.take_flashes(),
                }
            })
            .await
    }

    pub fn logged_in(&self) -> bool {
        self.provider.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    struct Unprintable;

    impl fmt::Display for Unprintable {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[derive(Template)]
    #[template(source = "<p>{{ value }}</p>", ext = "html")]
    struct Broken {
        value: Unprintable,
    }

    #[derive(Template)]
    #[template(source = "<p>{{ value }}</p>", ext = "html")]
    struct Plain {
        value: &'static str,
    }

    #[test]
    fn render_failure_is_500_even_with_another_status() {
        let response = Html(Broken { value: Unprintable }).with_status(StatusCode::NOT_FOUND);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn rendered_page_keeps_requested_status() {
        let response = Html(Plain { value: "missing" }).with_status(StatusCode::NOT_FOUND);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }
}
