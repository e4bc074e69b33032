use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;

use landdesk::admin::{admin_router, AdminRouterState, AdminService};
use landdesk::auth::{auth_router, AuthService};
use landdesk::profile::{profile_router, ProfileRepository, ProfileRouterState, ProfileService};
use landdesk::roster::{roster_router, GuideRepository, RosterRouterState, RosterService};

/// Compose every bounded-area router with the operational endpoints.
pub(crate) fn compose_router<PR, GR>(
    auth: Arc<AuthService>,
    profiles: Arc<ProfileService<PR>>,
    roster: Arc<RosterService<GR>>,
    admin: Arc<AdminService<PR, GR>>,
) -> Router
where
    PR: ProfileRepository + 'static,
    GR: GuideRepository + 'static,
{
    auth_router(auth.clone())
        .merge(profile_router(ProfileRouterState {
            profiles,
            auth: auth.clone(),
        }))
        .merge(roster_router(RosterRouterState {
            roster,
            auth: auth.clone(),
        }))
        .merge(admin_router(AdminRouterState { admin, auth }))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
