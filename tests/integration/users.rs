//! User CRUD through the full pipeline.

use std::collections::HashSet;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{app, send};

#[tokio::test]
async fn list_returns_seed_users() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/users", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["data"],
        json!([
            {"id": "1", "name": "user1", "email": "user1@example.com"},
            {"id": "2", "name": "user2", "email": "user2@example.com"},
            {"id": "3", "name": "user3", "email": "user3@example.com"}
        ])
    );
}

#[tokio::test]
async fn get_existing_user() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/users/1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "user1");
    assert_eq!(body["data"]["email"], "user1@example.com");
}

#[tokio::test]
async fn missing_id_is_404_for_get_put_delete() {
    let app = app();
    let cases = [
        (Method::GET, None),
        (Method::PUT, Some(r#"{"name":"n","email":"e"}"#)),
        (Method::DELETE, None),
    ];

    for (method, payload) in cases {
        let (status, body) = send(&app, method.clone(), "/api/users/404404", payload).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(body["code"], 404);
        assert_eq!(body["message"], "resource not found");
        assert!(body["details"].as_str().unwrap().contains("404404"));
        assert_eq!(body["path"], "/api/users/404404");
        assert_eq!(body["method"], method.as_str());
    }
}

#[tokio::test]
async fn create_assigns_id_four_on_fresh_store() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(r#"{"name":"n","email":"e"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], json!({"id": "4", "name": "n", "email": "e"}));
    assert!(body["message"].as_str().unwrap().contains('4'));
}

#[tokio::test]
async fn creates_yield_strictly_increasing_ids() {
    let app = app();
    let mut previous = 3u64;
    let mut seen = HashSet::new();

    for i in 0..5 {
        let payload = format!(r#"{{"name":"n{i}","email":"e{i}"}}"#);
        let (_, body) = send(&app, Method::POST, "/api/users", Some(&payload)).await;
        let id: u64 = body["data"]["id"].as_str().unwrap().parse().unwrap();

        assert!(id > previous);
        assert!(seen.insert(id));
        previous = id;
    }
}

#[tokio::test]
async fn malformed_body_is_500_envelope() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/users", Some("{invalid json}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 500);
    assert_eq!(body["message"], "internal server error");
    assert!(!body["details"].as_str().unwrap().is_empty());
    assert_eq!(body["path"], "/api/users");
    assert_eq!(body["method"], "POST");
}

#[tokio::test]
async fn malformed_update_body_is_500_envelope() {
    let app = app();
    let (status, body) = send(&app, Method::PUT, "/api/users/1", Some("{bad")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 500);
    assert_eq!(body["message"], "internal server error");
    assert_eq!(body["path"], "/api/users/1");
    assert_eq!(body["method"], "PUT");

    let (_, body) = send(&app, Method::GET, "/api/users/1", None).await;
    assert_eq!(body["data"]["name"], "user1");
}

#[tokio::test]
async fn create_with_missing_fields_is_accepted() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/users", Some(r#"{"name":"n"}"#)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], "4");
    assert_eq!(body["data"]["name"], "n");
}

#[tokio::test]
async fn create_with_numeric_id_ignores_it() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(r#"{"id":5,"name":"n","email":"e"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"], json!({"id": "4", "name": "n", "email": "e"}));
}

#[tokio::test]
async fn update_then_get_round_trips() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/users/1",
        Some(r#"{"name":"updated-user","email":"updated@example.com"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "1");

    let (_, body) = send(&app, Method::GET, "/api/users/1", None).await;
    assert_eq!(
        body["data"],
        json!({"id": "1", "name": "updated-user", "email": "updated@example.com"})
    );
}

#[tokio::test]
async fn delete_scenario() {
    let app = app();

    let (status, body) = send(&app, Method::DELETE, "/api/users/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains('2'));

    let (status, _) = send(&app, Method::GET, "/api/users/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/users", None).await;
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "3"]);

    let (status, body) = send(&app, Method::DELETE, "/api/users/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["details"].as_str().unwrap().contains('2'));
}
