//! Routing misses, method mismatches and the deliberate failure path.

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;

use crate::{app, send};

#[tokio::test]
async fn health_reports_up() {
    let (status, body) = send(&app(), Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert!(body["data"].is_string());
}

#[tokio::test]
async fn test_error_is_always_500() {
    let (status, body) = send(&app(), Method::GET, "/api/test/error", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 500);
    assert_eq!(body["message"], "internal server error");
    assert_eq!(body["details"], "This is a test error");
}

#[tokio::test]
async fn routing_miss_and_method_mismatch_never_collapse() {
    let app = app();

    let (miss_status, miss) = send(
        &app,
        Method::GET,
        "/api/users/does-not-exist-path-segment/and/more",
        None,
    )
    .await;
    let (mismatch_status, mismatch) = send(&app, Method::PUT, "/api/users", Some("{}")).await;

    assert_eq!(miss_status, StatusCode::NOT_FOUND);
    assert_eq!(miss["code"], 404);
    assert_eq!(miss["message"], "resource not found");

    assert_eq!(mismatch_status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(mismatch["code"], 405);
    assert_eq!(mismatch["message"], "method not allowed");
    assert_eq!(mismatch["method"], "PUT");
}

#[tokio::test]
async fn routing_miss_details_differ_from_missing_resource() {
    let app = app();

    let (_, route_miss) = send(&app, Method::GET, "/api/widgets/1", None).await;
    let (_, resource_miss) = send(&app, Method::GET, "/api/users/99", None).await;

    assert_eq!(route_miss["message"], resource_miss["message"]);
    assert!(route_miss["details"].as_str().unwrap().contains("/api/widgets/1"));
    assert!(resource_miss["details"].as_str().unwrap().contains("'99'"));
    assert_ne!(route_miss["details"], resource_miss["details"]);
}

#[tokio::test]
async fn paths_outside_context_path_are_not_found() {
    let (status, body) = send(&app(), Method::GET, "/users", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["path"], "/users");
}

#[tokio::test]
async fn error_envelope_has_no_null_fields() {
    let (_, body) = send(&app(), Method::PATCH, "/api/health", None).await;

    let object = body.as_object().unwrap();
    assert!(object.values().all(|v| !v.is_null()));
    assert!(object.contains_key("timestamp"));
}
