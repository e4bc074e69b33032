use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Session, SessionToken};
use super::service::{AuthError, AuthService};

/// Router builder exposing the account endpoints.
pub fn auth_router(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/v1/auth/signup", post(signup_handler))
        .route("/api/v1/auth/login", post(login_handler))
        .route("/api/v1/auth/logout", post(logout_handler))
        .route("/api/v1/auth/confirm/:token", get(confirm_handler))
        .route(
            "/api/v1/auth/resend-verification",
            post(resend_verification_handler),
        )
        .route("/api/v1/auth/password-reset", post(password_reset_handler))
        .route("/api/v1/auth/password", post(update_password_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CredentialsRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmailRequest {
    pub(crate) email: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PasswordRequest {
    pub(crate) password: String,
}

/// Extract the bearer token from the `Authorization` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?;
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(SessionToken(token.to_string()))
    }
}

/// Load the session for a request, or produce the 401 response directly.
pub fn require_session(headers: &HeaderMap, service: &AuthService) -> Result<Session, Response> {
    let token = match bearer_token(headers) {
        Some(token) => token,
        None => return Err(auth_error_response(&AuthError::SessionRequired)),
    };

    service
        .authenticate(&token)
        .map_err(|err| auth_error_response(&err))
}

/// As [`require_session`], additionally rejecting non-admin sessions.
pub fn require_admin(headers: &HeaderMap, service: &AuthService) -> Result<Session, Response> {
    let session = require_session(headers, service)?;
    if session.is_admin() {
        Ok(session)
    } else {
        let payload = json!({ "error": "관리자만 접근할 수 있습니다" });
        Err((StatusCode::FORBIDDEN, Json(payload)).into_response())
    }
}

pub(crate) fn auth_error_response(error: &AuthError) -> Response {
    let status = match error {
        AuthError::EmailNotConfirmed
        | AuthError::InvalidCredentials
        | AuthError::SessionRequired
        | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
        AuthError::AlreadyRegistered => StatusCode::CONFLICT,
        AuthError::InvalidEmail | AuthError::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::MailDelivery => StatusCode::BAD_GATEWAY,
        AuthError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

async fn signup_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<CredentialsRequest>,
) -> Response {
    match service.sign_up(&request.email, &request.password) {
        Ok(user) => {
            let payload = json!({
                "user_id": user.id.0,
                "email": user.email,
                "verification_sent": true,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => auth_error_response(&err),
    }
}

async fn login_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<CredentialsRequest>,
) -> Response {
    match service.sign_in(&request.email, &request.password) {
        Ok(session) => {
            let payload = json!({
                "token": session.token.0,
                "user_id": session.user.id.0,
                "email": session.user.email,
                "role": session.role.label(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => auth_error_response(&err),
    }
}

async fn logout_handler(State(service): State<Arc<AuthService>>, headers: HeaderMap) -> Response {
    let session = match require_session(&headers, &service) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match service.sign_out(&session.token) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => auth_error_response(&err),
    }
}

async fn confirm_handler(
    State(service): State<Arc<AuthService>>,
    Path(token): Path<String>,
) -> Response {
    match service.confirm_email(&token) {
        Ok(user) => {
            let payload = json!({ "email": user.email, "verified": true });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => auth_error_response(&err),
    }
}

async fn resend_verification_handler(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Response {
    let session = match require_session(&headers, &service) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match service.resend_verification(&session) {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(err) => auth_error_response(&err),
    }
}

async fn password_reset_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<EmailRequest>,
) -> Response {
    match service.request_password_reset(&request.email) {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(err) => auth_error_response(&err),
    }
}

async fn update_password_handler(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Json(request): Json<PasswordRequest>,
) -> Response {
    let session = match require_session(&headers, &service) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match service.update_password(&session.token, &request.password) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => auth_error_response(&err),
    }
}
