use axum::routing::{get, post};
use axum::Router;

use crate::auth::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(handlers::login_page))
        .route("/gconnect", post(handlers::gconnect))
        .route("/gdisconnect", get(handlers::gdisconnect))
        .route("/logout", post(handlers::logout))
}
