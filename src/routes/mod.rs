pub mod assets;
pub mod auth;
pub mod home;
pub mod json;
pub mod spares;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::extractors::ensure_session;
use crate::state::AppState;

/// The full catalog application with request tracing.
///
/// Only the HTML pages and the login endpoints carry a session; the JSON
/// export and static assets never create one.
pub fn app(state: AppState) -> Router {
    let pages = Router::new()
        .merge(spares::router())
        .merge(auth::router())
        .layer(middleware::from_fn_with_state(state.clone(), ensure_session));

    Router::new()
        .route("/assets/{*path}", get(assets::serve))
        .merge(json::router())
        .merge(pages)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
