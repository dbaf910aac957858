//! End-to-end tests driving the HTTP router in-process.
//!
//! Run with: cargo test --test integration

mod routing;
mod users;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use user_api::api::{create_router, user_api, AppState, FailureNormalizer};
use user_api::store::UserStore;

/// A router over a freshly seeded store.
pub fn app() -> Router {
    let store = Arc::new(UserStore::with_seed_data());
    let dispatcher = user_api(store, "/api", FailureNormalizer::default());
    create_router(AppState::new(dispatcher, 1024 * 1024))
}

/// Send one request and decode the JSON body.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("body is not JSON ({e}): {}", String::from_utf8_lossy(&bytes)));
    (status, json)
}
