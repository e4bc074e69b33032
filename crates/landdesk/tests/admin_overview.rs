//! Admin aggregation scenarios: the cross-company overview, per-company
//! drill-down, role gating on the router, and the spreadsheet export.

mod common;

use std::io::Cursor;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{harness, register_company, valid_submission, ADMIN_EMAIL};
use landdesk::admin::{admin_router, AdminError, AdminRouterState, ExportSheet};
use landdesk::auth::CompanyId;
use landdesk::roster::template_csv;

fn seeded() -> (common::Harness, CompanyId, CompanyId) {
    let harness = harness();

    let first = register_company(&harness, "first@example.com", "secret1");
    harness
        .profiles
        .complete(&first.user, "한라여행사", "2208162517")
        .expect("profile complete");
    harness
        .roster
        .create(&first.user.id, valid_submission())
        .expect("guide registered");
    harness
        .roster
        .import_sheet(&first.user.id, Cursor::new(template_csv().into_bytes()))
        .expect("template imported");

    let second = register_company(&harness, "second@example.com", "secret1");
    harness.profiles.load(&second.user).expect("profile row");

    // The admin account exists but must not show up as a company.
    let admin = register_company(&harness, ADMIN_EMAIL, "admin-secret");
    harness.profiles.load(&admin.user).expect("profile row");

    (harness, first.user.id.clone(), second.user.id.clone())
}

#[test]
fn overview_excludes_the_admin_account_and_totals_are_rounded() {
    let (harness, first, _) = seeded();

    let overview = harness.admin.overview().expect("overview");
    assert_eq!(overview.totals.companies, 2);
    assert_eq!(overview.totals.guides, 3);
    // 3 guides over 2 companies rounds to 2.
    assert_eq!(overview.totals.average_guides, 2);

    assert!(overview
        .companies
        .iter()
        .all(|company| company.profile.email != ADMIN_EMAIL));
    let seeded_company = overview
        .companies
        .iter()
        .find(|company| company.profile.id == first)
        .expect("seeded company listed");
    assert_eq!(seeded_company.guide_count, 3);
}

#[test]
fn company_detail_returns_the_full_roster() {
    let (harness, first, second) = seeded();

    let detail = harness.admin.company_detail(&first).expect("detail");
    assert_eq!(detail.guides.len(), 3);
    assert_eq!(
        detail.profile.company_name.as_deref(),
        Some("한라여행사")
    );

    let empty = harness.admin.company_detail(&second).expect("detail");
    assert!(empty.guides.is_empty());

    let error = harness
        .admin
        .company_detail(&CompanyId("missing".to_string()))
        .expect_err("unknown company");
    assert!(matches!(error, AdminError::CompanyNotFound));
}

#[test]
fn export_sheets_cover_guides_companies_and_summary() {
    let (harness, _, _) = seeded();

    let export = harness.admin.export().expect("export");
    assert_eq!(export.guide_rows, 3);
    assert_eq!(export.company_rows, 2);

    let guides = export.sheet_csv(ExportSheet::Guides);
    assert!(guides.starts_with("번호,랜드사명,사업자번호"));
    assert_eq!(guides.lines().count(), 4);
    assert!(guides.contains("220-81-62517"));

    let summary = export.sheet_csv(ExportSheet::Summary);
    assert!(summary.contains("총 랜드사 수,2개"));
    assert!(summary.contains("총 가이드 수,3명"));
    assert!(summary.contains("평균 가이드 수,2명"));
}

mod routing {
    use super::*;

    fn router(harness: &common::Harness) -> axum::Router {
        admin_router(AdminRouterState {
            admin: harness.admin.clone(),
            auth: harness.auth.clone(),
        })
    }

    #[tokio::test]
    async fn tenant_sessions_are_forbidden() {
        let harness = harness();
        let tenant = register_company(&harness, "land@example.com", "secret1");

        let response = router(&harness)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/admin/overview")
                    .header("authorization", format!("Bearer {}", tenant.token.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("dispatch");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_overview_is_served_to_the_admin_session() {
        let (harness, _, _) = seeded();
        let admin = harness
            .auth
            .sign_in(ADMIN_EMAIL, "admin-secret")
            .expect("admin login");

        let response = router(&harness)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/admin/overview")
                    .header("authorization", format!("Bearer {}", admin.token.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.pointer("/totals/companies"),
            Some(&json!(2))
        );
    }

    #[tokio::test]
    async fn export_endpoint_serves_csv_with_a_dated_name() {
        let (harness, _, _) = seeded();
        let admin = harness
            .auth
            .sign_in(ADMIN_EMAIL, "admin-secret")
            .expect("admin login");

        let response = router(&harness)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/admin/export?sheet=summary")
                    .header("authorization", format!("Bearer {}", admin.token.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/csv"));
        let disposition = response
            .headers()
            .get("content-disposition")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(disposition.contains("_summary.csv"));

        let body = to_bytes(response.into_body(), 1024 * 1024).await.expect("body");
        let sheet = String::from_utf8(body.to_vec()).expect("utf-8");
        assert!(sheet.contains("총 랜드사 수"));
    }

    #[tokio::test]
    async fn unknown_export_sheet_is_a_bad_request() {
        let (harness, _, _) = seeded();
        let admin = harness
            .auth
            .sign_in(ADMIN_EMAIL, "admin-secret")
            .expect("admin login");

        let response = router(&harness)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/admin/export?sheet=everything")
                    .header("authorization", format!("Bearer {}", admin.token.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
