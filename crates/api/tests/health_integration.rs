//! Integration tests for probes and the global middleware stack.

mod common;

use axum::http::StatusCode;
use common::{create_test_app, get_request, parse_response_body};
use tower::ServiceExt;

#[tokio::test]
async fn test_live() {
    let app = create_test_app().await;

    let response = app
        .router
        .oneshot(get_request("/api/health/live", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await["status"], "alive");
}

#[tokio::test]
async fn test_ready() {
    let app = create_test_app().await;

    let response = app
        .router
        .oneshot(get_request("/api/health/ready", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_check_reports_storage() {
    let app = create_test_app().await;

    let response = app
        .router
        .oneshot(get_request("/api/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["connected"], true);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app().await;
    let mut request = get_request("/api/health/live", None);
    request
        .headers_mut()
        .insert("x-request-id", "req-1234".parse().unwrap());

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-1234");
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = create_test_app().await;

    let response = app
        .router
        .oneshot(get_request("/api/health/live", None))
        .await
        .unwrap();

    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = create_test_app().await;

    let response = app
        .router
        .oneshot(get_request("/api/health/live", None))
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_app().await;

    let response = app
        .router
        .oneshot(get_request("/api/v2/opportunity", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
