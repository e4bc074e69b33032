//! Roster CRUD scenarios through the service facade and HTTP router:
//! ownership scoping, the photo attachment flow, and read-time signed URL
//! resolution.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{harness, register_company, valid_submission};
use landdesk::roster::GuideRepository;
use landdesk::roster::{roster_router, RosterError, RosterRouterState};
use landdesk::storage::PhotoUploadError;

#[test]
fn create_normalizes_and_stores_the_entry() {
    let harness = harness();
    let session = register_company(&harness, "land@example.com", "secret1");

    let record = harness
        .roster
        .create(&session.user.id, valid_submission())
        .expect("guide registered");

    assert_eq!(record.guide.name_en_last, "HONG");
    assert_eq!(record.guide.birth_date.as_deref(), Some("1990-01-01"));
    assert!(record.guide.is_active);
    assert_eq!(record.owner, session.user.id);
}

#[test]
fn update_keeps_photo_and_active_flag() {
    let harness = harness();
    let session = register_company(&harness, "land@example.com", "secret1");
    let record = harness
        .roster
        .create(&session.user.id, valid_submission())
        .expect("guide registered");

    harness
        .roster
        .attach_photo(&session.user.id, &record.id, vec![1u8; 64], &mime::IMAGE_JPEG)
        .expect("photo attached");
    harness
        .roster
        .toggle_active(&session.user.id, &record.id)
        .expect("deactivated");

    let mut submission = valid_submission();
    submission.name_ko = "홍길순".to_string();
    let updated = harness
        .roster
        .update(&session.user.id, &record.id, submission)
        .expect("updated");

    assert_eq!(updated.guide.name_ko, "홍길순");
    assert!(updated.guide.photo.is_some());
    assert!(!updated.guide.is_active);
}

#[test]
fn delete_is_hard_and_owner_scoped() {
    let harness = harness();
    let owner = register_company(&harness, "land@example.com", "secret1");
    let other = register_company(&harness, "other@example.com", "secret1");

    let record = harness
        .roster
        .create(&owner.user.id, valid_submission())
        .expect("guide registered");

    let error = harness
        .roster
        .delete(&other.user.id, &record.id)
        .expect_err("foreign delete must fail");
    assert!(matches!(error, RosterError::NotFound));

    harness
        .roster
        .delete(&owner.user.id, &record.id)
        .expect("owner delete succeeds");
    assert_eq!(harness.guide_repo.total(), 0);
}

#[test]
fn foreign_records_are_invisible() {
    let harness = harness();
    let owner = register_company(&harness, "land@example.com", "secret1");
    let other = register_company(&harness, "other@example.com", "secret1");

    let record = harness
        .roster
        .create(&owner.user.id, valid_submission())
        .expect("guide registered");

    let error = harness
        .roster
        .get(&other.user.id, &record.id)
        .expect_err("foreign read must fail");
    assert!(matches!(error, RosterError::NotFound));
    assert!(harness.roster.list(&other.user.id).expect("list").is_empty());
}

#[test]
fn photo_upload_preconditions_are_enforced() {
    let harness = harness();
    let session = register_company(&harness, "land@example.com", "secret1");
    let record = harness
        .roster
        .create(&session.user.id, valid_submission())
        .expect("guide registered");

    let oversized = vec![0u8; 5 * 1024 * 1024 + 1];
    let error = harness
        .roster
        .attach_photo(&session.user.id, &record.id, oversized, &mime::IMAGE_JPEG)
        .expect_err("oversized upload");
    assert!(matches!(
        error,
        RosterError::Upload(PhotoUploadError::TooLarge)
    ));

    let gif: mime::Mime = "image/gif".parse().expect("valid mime");
    let error = harness
        .roster
        .attach_photo(&session.user.id, &record.id, vec![0u8; 64], &gif)
        .expect_err("unsupported type");
    assert!(matches!(
        error,
        RosterError::Upload(PhotoUploadError::UnsupportedType)
    ));
}

#[test]
fn signed_urls_are_minted_per_read_and_never_stored() {
    let harness = harness();
    let session = register_company(&harness, "land@example.com", "secret1");
    let record = harness
        .roster
        .create(&session.user.id, valid_submission())
        .expect("guide registered");

    harness
        .roster
        .attach_photo(&session.user.id, &record.id, vec![1u8; 64], &mime::IMAGE_PNG)
        .expect("photo attached");

    // The persisted row keeps the opaque reference, not a URL.
    let stored = harness
        .guide_repo
        .fetch(&session.user.id, &record.id)
        .expect("fetch")
        .expect("record present");
    let photo_ref = stored.guide.photo.expect("photo reference stored");
    assert!(!photo_ref.0.contains("://"));

    let first = harness.roster.list(&session.user.id).expect("list");
    let second = harness.roster.list(&session.user.id).expect("list");
    let first_url = first[0].photo_url.as_deref().expect("resolved url");
    let second_url = second[0].photo_url.as_deref().expect("resolved url");
    assert_ne!(first_url, second_url);
    assert!(first_url.contains("ttl_hours=24"));
    assert_eq!(harness.photos.mint_count(), 2);
}

#[test]
fn photo_resolution_failure_degrades_to_no_url() {
    let harness = harness();
    let session = register_company(&harness, "land@example.com", "secret1");
    let record = harness
        .roster
        .create(&session.user.id, valid_submission())
        .expect("guide registered");

    harness
        .roster
        .attach_photo(&session.user.id, &record.id, vec![1u8; 64], &mime::IMAGE_PNG)
        .expect("photo attached");

    // Drop the object behind the reference; listing should still succeed.
    let stored = harness
        .guide_repo
        .fetch(&session.user.id, &record.id)
        .expect("fetch")
        .expect("record present");
    let photo_ref = stored.guide.photo.expect("photo reference stored");
    use landdesk::storage::PhotoStorage as _;
    harness.photos.remove(&photo_ref).expect("object removed");

    let views = harness.roster.list(&session.user.id).expect("list");
    assert_eq!(views.len(), 1);
    assert!(views[0].photo_url.is_none());
}

mod routing {
    use super::*;

    fn router(harness: &common::Harness) -> axum::Router {
        roster_router(RosterRouterState {
            roster: harness.roster.clone(),
            auth: harness.auth.clone(),
        })
    }

    #[tokio::test]
    async fn list_requires_a_session() {
        let harness = harness();
        let response = router(&harness)
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/guides")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_then_list_roundtrip() {
        let harness = harness();
        let session = register_company(&harness, "land@example.com", "secret1");
        let router = router(&harness);

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/guides")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", session.token.0))
            .body(Body::from(
                serde_json::to_vec(&valid_submission()).expect("serialize"),
            ))
            .expect("request");

        let response = router.clone().oneshot(request).await.expect("dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/guides")
                    .header("authorization", format!("Bearer {}", session.token.0))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024 * 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload.get("total"), Some(&json!(1)));
        let guides = payload
            .get("guides")
            .and_then(Value::as_array)
            .expect("guides array");
        assert_eq!(
            guides[0].get("name_en_last").and_then(Value::as_str),
            Some("HONG")
        );
    }

    #[tokio::test]
    async fn invalid_submission_returns_a_field_message() {
        let harness = harness();
        let session = register_company(&harness, "land@example.com", "secret1");

        let mut submission = valid_submission();
        submission.guide_type = "driver".to_string();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/guides")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", session.token.0))
            .body(Body::from(
                serde_json::to_vec(&submission).expect("serialize"),
            ))
            .expect("request");

        let response = router(&harness).oneshot(request).await.expect("dispatch");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = to_bytes(response.into_body(), 1024 * 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert!(payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .contains("tour_conductor"));
    }

    #[tokio::test]
    async fn photo_endpoint_validates_content_type() {
        let harness = harness();
        let session = register_company(&harness, "land@example.com", "secret1");
        let record = harness
            .roster
            .create(&session.user.id, valid_submission())
            .expect("guide registered");

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/guides/{}/photo", record.id.0))
            .header("content-type", "application/pdf")
            .header("authorization", format!("Bearer {}", session.token.0))
            .body(Body::from(vec![0u8; 64]))
            .expect("request");

        let response = router(&harness).oneshot(request).await.expect("dispatch");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
