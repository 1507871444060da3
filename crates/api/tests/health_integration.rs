//! Integration tests for health, request id and metrics endpoints.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{create_test_app, get_request};
use maintenance_tracker_api::middleware::{init_metrics, REQUEST_ID_HEADER};

#[tokio::test]
async fn test_health_reports_memory_backend() {
    let app = create_test_app();
    let (status, body) = app.send_json(get_request("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"]["backend"], "memory");
    assert_eq!(body["storage"]["connected"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_live_and_ready() {
    let app = create_test_app();

    let response = app.send(get_request("/api/health/live")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(get_request("/api/health/ready")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = create_test_app();
    let response = app.send(get_request("/api/health/live")).await;

    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app();
    let request = Request::builder()
        .uri("/api/health/live")
        .header(REQUEST_ID_HEADER, "trace-abc")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).unwrap(),
        "trace-abc"
    );
}

#[tokio::test]
async fn test_metrics_endpoint_after_init() {
    init_metrics().unwrap();
    let app = create_test_app();

    let response = app.send(get_request("/metrics")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = create_test_app();
    let response = app.send(get_request("/api/v1/nothing-here")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
