use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Local;
use serde::Serialize;
use serde_json::json;

use super::export::{ExportSheet, RosterExport};
use super::service::{AdminError, AdminService};
use crate::auth::{require_admin, AuthService, CompanyId};
use crate::profile::ProfileRepository;
use crate::roster::{GuideRepository, GuideView};

pub struct AdminRouterState<PR, GR> {
    pub admin: Arc<AdminService<PR, GR>>,
    pub auth: Arc<AuthService>,
}

impl<PR, GR> Clone for AdminRouterState<PR, GR> {
    fn clone(&self) -> Self {
        Self {
            admin: self.admin.clone(),
            auth: self.auth.clone(),
        }
    }
}

/// Router builder exposing the admin endpoints. Every route is gated on the
/// admin role; tenants receive 403.
pub fn admin_router<PR, GR>(state: AdminRouterState<PR, GR>) -> Router
where
    PR: ProfileRepository + 'static,
    GR: GuideRepository + 'static,
{
    Router::new()
        .route("/api/v1/admin/overview", get(overview_handler::<PR, GR>))
        .route(
            "/api/v1/admin/companies/:id",
            get(company_detail_handler::<PR, GR>),
        )
        .route("/api/v1/admin/export", get(export_handler::<PR, GR>))
        .with_state(state)
}

/// Pull the `sheet` parameter out of the query string. Values here are plain
/// ASCII labels, so no decoding is needed.
fn sheet_param(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key == "sheet" && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[derive(Debug, Serialize)]
struct CompanyDetailView {
    id: String,
    email: String,
    company_name: Option<String>,
    business_number: Option<String>,
    guides: Vec<GuideView>,
}

async fn overview_handler<PR, GR>(
    State(state): State<AdminRouterState<PR, GR>>,
    headers: HeaderMap,
) -> Response
where
    PR: ProfileRepository + 'static,
    GR: GuideRepository + 'static,
{
    if let Err(response) = require_admin(&headers, &state.auth) {
        return response;
    }

    match state.admin.overview() {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(err) => admin_error_response(&err),
    }
}

async fn company_detail_handler<PR, GR>(
    State(state): State<AdminRouterState<PR, GR>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response
where
    PR: ProfileRepository + 'static,
    GR: GuideRepository + 'static,
{
    if let Err(response) = require_admin(&headers, &state.auth) {
        return response;
    }

    match state.admin.company_detail(&CompanyId(id)) {
        Ok(detail) => {
            let view = CompanyDetailView {
                id: detail.profile.id.0.clone(),
                email: detail.profile.email.clone(),
                company_name: detail.profile.company_name.clone(),
                business_number: detail
                    .profile
                    .business_number
                    .as_ref()
                    .map(|number| number.as_str().to_string()),
                guides: detail
                    .guides
                    .iter()
                    .map(|record| GuideView::from_record(record, None))
                    .collect(),
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(err) => admin_error_response(&err),
    }
}

async fn export_handler<PR, GR>(
    State(state): State<AdminRouterState<PR, GR>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response
where
    PR: ProfileRepository + 'static,
    GR: GuideRepository + 'static,
{
    if let Err(response) = require_admin(&headers, &state.auth) {
        return response;
    }

    let sheet = match sheet_param(&uri).as_deref() {
        None => ExportSheet::Guides,
        Some(label) => match ExportSheet::from_label(label) {
            Some(sheet) => sheet,
            None => {
                let payload = json!({
                    "error": "sheet must be one of guides, companies, summary",
                });
                return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
            }
        },
    };

    match state.admin.export() {
        Ok(export) => {
            let file_name = RosterExport::file_name(sheet, Local::now().date_naive());
            let disposition = format!("attachment; filename=\"{file_name}\"");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                export.sheet_csv(sheet).to_string(),
            )
                .into_response()
        }
        Err(err) => admin_error_response(&err),
    }
}

fn admin_error_response(error: &AdminError) -> Response {
    let status = match error {
        AdminError::CompanyNotFound => StatusCode::NOT_FOUND,
        AdminError::Profiles(_) | AdminError::Roster(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
