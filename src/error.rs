//! Failures of the catalog itself: records that are not there and storage
//! that cannot be reached. Login failures have their own type in
//! `auth::oauth` and wrap these when storage breaks mid-login.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No spare #{id} in category {category}")]
    SpareNotFound { category: String, id: i64 },

    #[error("Catalog query failed: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("No catalog connection available: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Request reached a handler without a session")]
    MissingSession,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::SpareNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Pool(_) | AppError::MissingSession => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
            return (status, Json(json!({ "error": "Internal server error" }))).into_response();
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
