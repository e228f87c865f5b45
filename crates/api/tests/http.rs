//! Router-level behaviour that does not need a live database: health
//! degradation, request rejection, request ids and preview throttling.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, post_json};
use tower::ServiceExt;

const PREVIEW_BODY: &str = r#"{
    "snapshot": {
        "width": 200.0,
        "height": 220.0,
        "depth": 60.0,
        "korpus_material_id": 1
    }
}"#;

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_degraded_when_database_is_down() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/api/v1/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Request rejection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preview_without_json_content_type_returns_415() {
    let app = common::build_test_app(common::unreachable_pool());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/pricing/preview")
        .body(Body::from(PREVIEW_BODY))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn preview_with_malformed_compartment_entry_is_not_rejected() {
    let app = common::build_test_app(common::unreachable_pool());
    let body = r#"{
        "snapshot": {
            "width": 200.0, "height": 220.0, "depth": 60.0,
            "korpus_material_id": 1,
            "compartment_extras": { "1A": { "rod": true }, "A1": { "rod": "yes" } }
        }
    }"#;
    let response = post_json(app, "/api/v1/pricing/preview", body).await;

    // The snapshot is accepted and quoting goes on to the (unreachable) catalog.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn preview_without_dimensions_returns_422() {
    let app = common::build_test_app(common::unreachable_pool());
    let body = r#"{ "snapshot": { "height": 220.0, "depth": 60.0 } }"#;
    let response = post_json(app, "/api/v1/pricing/preview", body).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn wardrobe_id_must_be_numeric() {
    let app = common::build_test_app(common::unreachable_pool());
    let response = get(app, "/api/v1/wardrobes/not-a-number").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Preview throttling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preview_is_throttled_per_caller() {
    let mut config = common::test_config();
    config.preview_rate_limit_per_min = 1;
    let app = common::build_test_app_with(common::unreachable_pool(), config);

    // The first preview is admitted and fails on the unreachable database.
    let first = post_json(app.clone(), "/api/v1/pricing/preview", PREVIEW_BODY).await;
    assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let second = post_json(app, "/api/v1/pricing/preview", PREVIEW_BODY).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(second).await;
    assert_eq!(json["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn preview_throttle_refuses_callers_past_its_capacity() {
    let mut config = common::test_config();
    config.preview_throttle_max_keys = 1;
    let app = common::build_test_app_with(common::unreachable_pool(), config);

    let from = |client: &str| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/pricing/preview")
            .header("content-type", "application/json")
            .header("x-forwarded-for", client)
            .body(Body::from(PREVIEW_BODY))
            .unwrap()
    };

    let first = app.clone().oneshot(from("10.0.0.1")).await.unwrap();
    assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let rotated = app.oneshot(from("10.0.0.2")).await.unwrap();
    assert_eq!(rotated.status(), StatusCode::TOO_MANY_REQUESTS);
}
