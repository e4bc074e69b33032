use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use mime::Mime;
use serde::Deserialize;
use serde_json::json;

use super::domain::{GuideId, GuideSubmission, GuideView};
use super::import::sample::TEMPLATE_FILE_NAME;
use super::import::template_csv;
use super::repository::{GuideRepository, RosterRepositoryError};
use super::service::{RosterError, RosterService};
use crate::auth::{require_session, AuthService};

pub struct RosterRouterState<R> {
    pub roster: Arc<RosterService<R>>,
    pub auth: Arc<AuthService>,
}

impl<R> Clone for RosterRouterState<R> {
    fn clone(&self) -> Self {
        Self {
            roster: self.roster.clone(),
            auth: self.auth.clone(),
        }
    }
}

/// Router builder exposing the roster endpoints.
pub fn roster_router<R>(state: RosterRouterState<R>) -> Router
where
    R: GuideRepository + 'static,
{
    Router::new()
        .route("/api/v1/guides", get(list_handler::<R>))
        .route("/api/v1/guides", post(create_handler::<R>))
        .route("/api/v1/guides/import", post(import_handler::<R>))
        .route("/api/v1/guides/import/template", get(template_handler))
        .route("/api/v1/guides/:id", get(get_handler::<R>))
        .route("/api/v1/guides/:id", put(update_handler::<R>))
        .route("/api/v1/guides/:id", delete(delete_handler::<R>))
        .route("/api/v1/guides/:id/active", post(toggle_handler::<R>))
        .route("/api/v1/guides/:id/photo", post(photo_handler::<R>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportRequest {
    /// The uploaded sheet, transported as CSV text.
    pub(crate) csv: String,
}

async fn list_handler<R>(State(state): State<RosterRouterState<R>>, headers: HeaderMap) -> Response
where
    R: GuideRepository + 'static,
{
    let session = match require_session(&headers, &state.auth) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state.roster.list(&session.user.id) {
        Ok(views) => {
            let payload = json!({ "total": views.len(), "guides": views });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => roster_error_response(&err),
    }
}

async fn create_handler<R>(
    State(state): State<RosterRouterState<R>>,
    headers: HeaderMap,
    Json(submission): Json<GuideSubmission>,
) -> Response
where
    R: GuideRepository + 'static,
{
    let session = match require_session(&headers, &state.auth) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state.roster.create(&session.user.id, submission) {
        Ok(record) => {
            let view = GuideView::from_record(&record, None);
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(err) => roster_error_response(&err),
    }
}

async fn get_handler<R>(
    State(state): State<RosterRouterState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response
where
    R: GuideRepository + 'static,
{
    let session = match require_session(&headers, &state.auth) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state.roster.get(&session.user.id, &GuideId(id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => roster_error_response(&err),
    }
}

async fn update_handler<R>(
    State(state): State<RosterRouterState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(submission): Json<GuideSubmission>,
) -> Response
where
    R: GuideRepository + 'static,
{
    let session = match require_session(&headers, &state.auth) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state.roster.update(&session.user.id, &GuideId(id), submission) {
        Ok(record) => {
            let view = GuideView::from_record(&record, None);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(err) => roster_error_response(&err),
    }
}

async fn delete_handler<R>(
    State(state): State<RosterRouterState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response
where
    R: GuideRepository + 'static,
{
    let session = match require_session(&headers, &state.auth) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state.roster.delete(&session.user.id, &GuideId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => roster_error_response(&err),
    }
}

async fn toggle_handler<R>(
    State(state): State<RosterRouterState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response
where
    R: GuideRepository + 'static,
{
    let session = match require_session(&headers, &state.auth) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state.roster.toggle_active(&session.user.id, &GuideId(id)) {
        Ok(record) => {
            let view = GuideView::from_record(&record, None);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(err) => roster_error_response(&err),
    }
}

async fn photo_handler<R>(
    State(state): State<RosterRouterState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> Response
where
    R: GuideRepository + 'static,
{
    let session = match require_session(&headers, &state.auth) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Mime>().ok());
    let content_type = match content_type {
        Some(mime) => mime,
        None => {
            let payload = json!({ "error": "JPG, PNG, WEBP 형식의 이미지만 업로드 가능합니다" });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    };

    match state.roster.attach_photo(
        &session.user.id,
        &GuideId(id),
        body.to_vec(),
        &content_type,
    ) {
        Ok(record) => {
            let view = GuideView::from_record(&record, None);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(err) => roster_error_response(&err),
    }
}

async fn import_handler<R>(
    State(state): State<RosterRouterState<R>>,
    headers: HeaderMap,
    Json(request): Json<ImportRequest>,
) -> Response
where
    R: GuideRepository + 'static,
{
    let session = match require_session(&headers, &state.auth) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let reader = Cursor::new(request.csv.into_bytes());
    match state.roster.import_sheet(&session.user.id, reader) {
        Ok(inserted) => {
            let payload = json!({ "inserted": inserted });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => roster_error_response(&err),
    }
}

async fn template_handler() -> Response {
    let disposition = format!("attachment; filename=\"{TEMPLATE_FILE_NAME}\"");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        template_csv(),
    )
        .into_response()
}

fn roster_error_response(error: &RosterError) -> Response {
    match error {
        RosterError::Import(errors) => {
            let payload = json!({
                "error": error.to_string(),
                "errors": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        RosterError::Validation(_) | RosterError::Upload(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        RosterError::NotFound => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        RosterError::Storage(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        RosterError::Repository(RosterRepositoryError::Conflict) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        RosterError::Repository(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
