use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::catalog::repository;
use crate::db::models::SpareJson;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/spare/JSON", get(all_spares))
        .route("/spare/category/{category}/JSON", get(category_spares))
        .route("/spare/category/{category}/{spare_id}/JSON", get(one_spare))
}

async fn all_spares(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let spares: Vec<SpareJson> = repository::list_spares(&conn)?
        .into_iter()
        .map(SpareJson::from)
        .collect();
    Ok(Json(json!({ "spares": spares })))
}

async fn category_spares(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let spares: Vec<SpareJson> = repository::list_spares_in_category(&conn, &category)?
        .into_iter()
        .map(SpareJson::from)
        .collect();
    Ok(Json(json!({ "spares": spares })))
}

async fn one_spare(
    State(state): State<AppState>,
    Path((category, spare_id)): Path<(String, i64)>,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;
    let spare = repository::find_spare(&conn, &category, spare_id)?.ok_or(
        AppError::SpareNotFound {
            category,
            id: spare_id,
        },
    )?;
    Ok(Json(json!({ "spare": SpareJson::from(spare) })))
}
