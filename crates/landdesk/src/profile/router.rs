use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::CompanyProfile;
use super::repository::ProfileRepository;
use super::service::{ProfileError, ProfileService};
use crate::auth::{require_session, AuthService};

pub struct ProfileRouterState<R> {
    pub profiles: Arc<ProfileService<R>>,
    pub auth: Arc<AuthService>,
}

impl<R> Clone for ProfileRouterState<R> {
    fn clone(&self) -> Self {
        Self {
            profiles: self.profiles.clone(),
            auth: self.auth.clone(),
        }
    }
}

/// Router builder exposing the company profile endpoints.
pub fn profile_router<R>(state: ProfileRouterState<R>) -> Router
where
    R: ProfileRepository + 'static,
{
    Router::new()
        .route("/api/v1/profile", get(get_profile_handler::<R>))
        .route("/api/v1/profile", post(complete_profile_handler::<R>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompleteProfileRequest {
    pub(crate) company_name: String,
    pub(crate) business_number: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileView {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) company_name: Option<String>,
    pub(crate) business_number: Option<String>,
    pub(crate) complete: bool,
}

impl ProfileView {
    pub(crate) fn from_profile(profile: &CompanyProfile) -> Self {
        Self {
            id: profile.id.0.clone(),
            email: profile.email.clone(),
            company_name: profile.company_name.clone(),
            business_number: profile
                .business_number
                .as_ref()
                .map(|number| number.as_str().to_string()),
            complete: profile.is_complete(),
        }
    }
}

async fn get_profile_handler<R>(
    State(state): State<ProfileRouterState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: ProfileRepository + 'static,
{
    let session = match require_session(&headers, &state.auth) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state.profiles.load(&session.user) {
        Ok(profile) => {
            (StatusCode::OK, Json(ProfileView::from_profile(&profile))).into_response()
        }
        Err(err) => profile_error_response(&err),
    }
}

async fn complete_profile_handler<R>(
    State(state): State<ProfileRouterState<R>>,
    headers: HeaderMap,
    Json(request): Json<CompleteProfileRequest>,
) -> Response
where
    R: ProfileRepository + 'static,
{
    let session = match require_session(&headers, &state.auth) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state
        .profiles
        .complete(&session.user, &request.company_name, &request.business_number)
    {
        Ok(profile) => {
            (StatusCode::OK, Json(ProfileView::from_profile(&profile))).into_response()
        }
        Err(err) => profile_error_response(&err),
    }
}

fn profile_error_response(error: &ProfileError) -> Response {
    let status = match error {
        ProfileError::CompanyNameRequired | ProfileError::BusinessNumber(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ProfileError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
