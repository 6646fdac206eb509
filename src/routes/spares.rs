use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use rusqlite::Connection;
use serde::Deserialize;

use crate::auth::oauth::ConnectError;
use crate::catalog::{repository, Actor};
use crate::db::models::{SpareFields, SparePart};
use crate::error::AppResult;
use crate::extractors::SessionHandle;
use crate::routes::home::{Html, Viewer};
use crate::state::AppState;

const ALL_FIELDS_REQUIRED: &str = "All Fields are Required!";
const LOGIN_TO_ADD: &str = "Please Login first to Add!";
const LOGIN_TO_EDIT: &str = "Please Login to Edit the spare Details!";
const OWNER_ONLY_EDIT: &str = "Sorry! The Owner can only edit spare Details!";
const LOGIN_TO_DELETE: &str = "Please Login to Delete the spare!";
const OWNER_ONLY_DELETE: &str = "Sorry! Only the Owner Can delete the spare";
const EMPTY_CATEGORY: &str = "Sorry! No spare in Database";
const SPARE_NOT_FOUND: &str = "No spare Found with this Category and spare Id";

// --- Templates ---

#[derive(Template)]
#[template(path = "pages/main.html")]
pub struct MainTemplate {
    pub viewer: Viewer,
    pub spares: Vec<SparePart>,
    pub categories: Vec<String>,
    pub category: Option<String>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/detail.html")]
pub struct DetailTemplate {
    pub viewer: Viewer,
    pub spare: SparePart,
    pub can_modify: bool,
    pub error: Option<String>,
}

/// Record an edit form posts back to. `None` means the create form.
pub struct EditTarget {
    pub category: String,
    pub id: i64,
}

impl From<&SparePart> for EditTarget {
    fn from(spare: &SparePart) -> Self {
        Self {
            category: spare.category.clone(),
            id: spare.id,
        }
    }
}

#[derive(Template)]
#[template(path = "pages/spare_form.html")]
pub struct SpareFormTemplate {
    pub viewer: Viewer,
    pub title: String,
    pub editing: Option<EditTarget>,
    pub fields: SpareFields,
    pub categories: Vec<String>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/delete.html")]
pub struct DeleteTemplate {
    pub viewer: Viewer,
    pub spare: SparePart,
}

// --- Forms ---

#[derive(Deserialize)]
pub struct SpareForm {
    pub state: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
}

impl SpareForm {
    fn fields(&self) -> SpareFields {
        SpareFields {
            name: self.name.clone(),
            manufacturer: self.manufacturer.clone(),
            category: self.category.clone(),
            unit: self.unit.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct StateForm {
    pub state: Option<String>,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show_spares))
        .route("/spare/", get(show_spares))
        .route("/spare/new/", get(new_spare_page).post(create_spare))
        .route("/spare/category/{category}/", get(spares_in_category))
        .route("/spare/category/{category}/{spare_id}/", get(spare_detail))
        .route(
            "/spare/category/{category}/{spare_id}/edit/",
            get(edit_spare_page).post(update_spare),
        )
        .route(
            "/spare/category/{category}/{spare_id}/delete/",
            get(delete_spare_page).post(delete_spare),
        )
}

// --- Access ---

enum Access {
    Anonymous,
    Denied,
    Granted,
}

fn check_access(
    conn: &Connection,
    user_id: Option<i64>,
    admin_email: &str,
    spare: &SparePart,
) -> rusqlite::Result<Access> {
    let Some(user_id) = user_id else {
        return Ok(Access::Anonymous);
    };
    let actor = Actor::resolve(conn, user_id, admin_email)?;
    Ok(if actor.can_modify(spare) {
        Access::Granted
    } else {
        Access::Denied
    })
}

/// JSON 401 when the submitted anti-forgery token is not the one last issued.
async fn reject_forged(session: &SessionHandle, given: Option<&str>) -> Option<Response> {
    let valid = session.with(|s| s.state_matches(given)).await;
    (!valid).then(|| ConnectError::InvalidState.into_response())
}

// --- Renderers ---

async fn render_main(
    state: &AppState,
    session: &SessionHandle,
    spares: Vec<SparePart>,
    category: Option<String>,
    error: Option<&str>,
    status: StatusCode,
) -> AppResult<Response> {
    let categories = {
        let conn = state.db.get()?;
        repository::list_categories(&conn)?
    };
    let viewer = Viewer::issue(session, state).await;
    let page = MainTemplate {
        viewer,
        spares,
        categories,
        category,
        error: error.map(str::to_string),
    };
    Ok(Html(page).with_status(status))
}

async fn render_all_with_error(
    state: &AppState,
    session: &SessionHandle,
    error: &str,
    status: StatusCode,
) -> AppResult<Response> {
    let spares = {
        let conn = state.db.get()?;
        repository::list_spares(&conn)?
    };
    render_main(state, session, spares, None, Some(error), status).await
}

async fn render_missing(state: &AppState, session: &SessionHandle) -> AppResult<Response> {
    render_main(
        state,
        session,
        Vec::new(),
        None,
        Some(SPARE_NOT_FOUND),
        StatusCode::NOT_FOUND,
    )
    .await
}

async fn render_detail(
    state: &AppState,
    session: &SessionHandle,
    spare: SparePart,
    error: Option<&str>,
    status: StatusCode,
) -> AppResult<Response> {
    let user_id = session.user_id().await;
    let can_modify = {
        let conn = state.db.get()?;
        matches!(
            check_access(&conn, user_id, &state.config.auth.admin_email, &spare)?,
            Access::Granted
        )
    };
    let viewer = Viewer::issue(session, state).await;
    let page = DetailTemplate {
        viewer,
        spare,
        can_modify,
        error: error.map(str::to_string),
    };
    Ok(Html(page).with_status(status))
}

async fn render_form(
    state: &AppState,
    session: &SessionHandle,
    title: &str,
    editing: Option<EditTarget>,
    fields: SpareFields,
    error: Option<&str>,
) -> AppResult<Response> {
    let categories = {
        let conn = state.db.get()?;
        repository::list_categories(&conn)?
    };
    let viewer = Viewer::issue(session, state).await;
    let page = SpareFormTemplate {
        viewer,
        title: title.to_string(),
        editing,
        fields,
        categories,
        error: error.map(str::to_string),
    };
    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    Ok(Html(page).with_status(status))
}

fn find(state: &AppState, category: &str, spare_id: i64) -> AppResult<Option<SparePart>> {
    let conn = state.db.get()?;
    Ok(repository::find_spare(&conn, category, spare_id)?)
}

// --- Handlers ---

async fn show_spares(
    State(state): State<AppState>,
    session: SessionHandle,
) -> AppResult<Response> {
    let spares = {
        let conn = state.db.get()?;
        repository::list_spares(&conn)?
    };
    render_main(&state, &session, spares, None, None, StatusCode::OK).await
}

async fn spares_in_category(
    State(state): State<AppState>,
    session: SessionHandle,
    Path(category): Path<String>,
) -> AppResult<Response> {
    let spares = {
        let conn = state.db.get()?;
        repository::list_spares_in_category(&conn, &category)?
    };
    let error = spares.is_empty().then_some(EMPTY_CATEGORY);
    render_main(&state, &session, spares, Some(category), error, StatusCode::OK).await
}

async fn spare_detail(
    State(state): State<AppState>,
    session: SessionHandle,
    Path((category, spare_id)): Path<(String, i64)>,
) -> AppResult<Response> {
    match find(&state, &category, spare_id)? {
        Some(spare) => render_detail(&state, &session, spare, None, StatusCode::OK).await,
        None => render_missing(&state, &session).await,
    }
}

async fn new_spare_page(
    State(state): State<AppState>,
    session: SessionHandle,
) -> AppResult<Response> {
    if session.user_id().await.is_none() {
        return render_all_with_error(&state, &session, LOGIN_TO_ADD, StatusCode::UNAUTHORIZED)
            .await;
    }
    render_form(
        &state,
        &session,
        "Add New spare",
        None,
        SpareFields::default(),
        None,
    )
    .await
}

async fn create_spare(
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<SpareForm>,
) -> AppResult<Response> {
    let Some(user_id) = session.user_id().await else {
        return render_all_with_error(&state, &session, LOGIN_TO_ADD, StatusCode::UNAUTHORIZED)
            .await;
    };
    if let Some(rejection) = reject_forged(&session, form.state.as_deref()).await {
        return Ok(rejection);
    }

    let Some(fields) = form.fields().complete() else {
        return render_form(
            &state,
            &session,
            "Add New spare",
            None,
            form.fields(),
            Some(ALL_FIELDS_REQUIRED),
        )
        .await;
    };

    let spare_id = {
        let conn = state.db.get()?;
        repository::insert_spare(&conn, &fields, user_id)?
    };
    tracing::info!("User #{} added spare #{} ({})", user_id, spare_id, fields.name);

    session
        .with(|s| s.flash(format!("{} added!", fields.name)))
        .await;
    Ok(Redirect::to("/spare/new/").into_response())
}

async fn edit_spare_page(
    State(state): State<AppState>,
    session: SessionHandle,
    Path((category, spare_id)): Path<(String, i64)>,
) -> AppResult<Response> {
    let Some(spare) = find(&state, &category, spare_id)? else {
        return render_missing(&state, &session).await;
    };

    let user_id = session.user_id().await;
    let access = {
        let conn = state.db.get()?;
        check_access(&conn, user_id, &state.config.auth.admin_email, &spare)?
    };

    match access {
        Access::Anonymous => {
            render_detail(&state, &session, spare, Some(LOGIN_TO_EDIT), StatusCode::UNAUTHORIZED)
                .await
        }
        Access::Denied => {
            render_detail(&state, &session, spare, Some(OWNER_ONLY_EDIT), StatusCode::FORBIDDEN)
                .await
        }
        Access::Granted => {
            render_form(
                &state,
                &session,
                "Edit spare Details",
                Some(EditTarget::from(&spare)),
                SpareFields::from(&spare),
                None,
            )
            .await
        }
    }
}

async fn update_spare(
    State(state): State<AppState>,
    session: SessionHandle,
    Path((category, spare_id)): Path<(String, i64)>,
    Form(form): Form<SpareForm>,
) -> AppResult<Response> {
    let Some(spare) = find(&state, &category, spare_id)? else {
        return render_missing(&state, &session).await;
    };

    let user_id = session.user_id().await;
    let access = {
        let conn = state.db.get()?;
        check_access(&conn, user_id, &state.config.auth.admin_email, &spare)?
    };

    match access {
        Access::Anonymous => {
            return render_detail(
                &state,
                &session,
                spare,
                Some(LOGIN_TO_EDIT),
                StatusCode::UNAUTHORIZED,
            )
            .await;
        }
        Access::Denied => {
            tracing::warn!(
                "User #{:?} tried to edit spare #{} owned by #{}",
                user_id,
                spare.id,
                spare.user_id
            );
            return render_detail(
                &state,
                &session,
                spare,
                Some(OWNER_ONLY_EDIT),
                StatusCode::FORBIDDEN,
            )
            .await;
        }
        Access::Granted => {}
    }

    if let Some(rejection) = reject_forged(&session, form.state.as_deref()).await {
        return Ok(rejection);
    }

    let Some(fields) = form.fields().complete() else {
        return render_form(
            &state,
            &session,
            "Edit spare Details",
            Some(EditTarget::from(&spare)),
            form.fields(),
            Some(ALL_FIELDS_REQUIRED),
        )
        .await;
    };

    {
        let conn = state.db.get()?;
        repository::update_spare(&conn, spare.id, &fields)?;
    }
    tracing::info!("Spare #{} updated by user #{:?}", spare.id, user_id);

    session
        .with(|s| s.flash(format!("{} updated!", fields.name)))
        .await;
    Ok(Redirect::to("/spare/new/").into_response())
}

async fn delete_spare_page(
    State(state): State<AppState>,
    session: SessionHandle,
    Path((category, spare_id)): Path<(String, i64)>,
) -> AppResult<Response> {
    let Some(spare) = find(&state, &category, spare_id)? else {
        return render_missing(&state, &session).await;
    };

    let user_id = session.user_id().await;
    let access = {
        let conn = state.db.get()?;
        check_access(&conn, user_id, &state.config.auth.admin_email, &spare)?
    };

    match access {
        Access::Anonymous => {
            render_detail(
                &state,
                &session,
                spare,
                Some(LOGIN_TO_DELETE),
                StatusCode::UNAUTHORIZED,
            )
            .await
        }
        Access::Denied => {
            render_detail(
                &state,
                &session,
                spare,
                Some(OWNER_ONLY_DELETE),
                StatusCode::FORBIDDEN,
            )
            .await
        }
        Access::Granted => {
            let viewer = Viewer::issue(&session, &state).await;
            Ok(Html(DeleteTemplate { viewer, spare }).into_response())
        }
    }
}

async fn delete_spare(
    State(state): State<AppState>,
    session: SessionHandle,
    Path((category, spare_id)): Path<(String, i64)>,
    Form(form): Form<StateForm>,
) -> AppResult<Response> {
    let Some(spare) = find(&state, &category, spare_id)? else {
        return render_missing(&state, &session).await;
    };

    let user_id = session.user_id().await;
    let access = {
        let conn = state.db.get()?;
        check_access(&conn, user_id, &state.config.auth.admin_email, &spare)?
    };

    match access {
        Access::Anonymous => {
            return render_detail(
                &state,
                &session,
                spare,
                Some(LOGIN_TO_DELETE),
                StatusCode::UNAUTHORIZED,
            )
            .await;
        }
        Access::Denied => {
            tracing::warn!(
                "User #{:?} tried to delete spare #{} owned by #{}",
                user_id,
                spare.id,
                spare.user_id
            );
            return render_detail(
                &state,
                &session,
                spare,
                Some(OWNER_ONLY_DELETE),
                StatusCode::FORBIDDEN,
            )
            .await;
        }
        Access::Granted => {}
    }

    if let Some(rejection) = reject_forged(&session, form.state.as_deref()).await {
        return Ok(rejection);
    }

    {
        let conn = state.db.get()?;
        repository::delete_spare(&conn, spare.id)?;
    }
    tracing::info!("Spare #{} deleted by user #{:?}", spare.id, user_id);

    session
        .with(|s| s.flash(format!("{} deleted!", spare.name)))
        .await;
    Ok(Redirect::to("/spare/").into_response())
}
