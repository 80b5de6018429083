// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::{header, Method, StatusCode};
use serde_json::json;
use tower::util::ServiceExt;

use super::support::*;

#[tokio::test]
async fn test_register_returns_token_and_user() {
    let t = test_app().await;
    let (status, body) = send(
        &t.app,
        json_request(
            Method::POST,
            "/auth/register",
            json!({"name": "Alice", "email": "a@x.com", "password": "pw"}),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["name"], "Alice");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["company"], "N/A");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());

    let claims = t.codec.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.user_id, body["user"]["id"].as_i64().unwrap());
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let t = test_app().await;
    register(&t.app, "Alice", "a@x.com", "pw").await;

    let (status, body) = send(
        &t.app,
        json_request(
            Method::POST,
            "/auth/register",
            json!({"name": "Alice Again", "email": "A@X.com ", "password": "other"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User with this email already exists");
}

#[tokio::test]
async fn test_register_requires_fields() {
    let t = test_app().await;
    for payload in [
        json!({"email": "a@x.com", "password": "pw"}),
        json!({"name": "Alice", "password": "pw"}),
        json!({"name": "Alice", "email": "a@x.com", "password": ""}),
    ] {
        let (status, body) = send(
            &t.app,
            json_request(Method::POST, "/auth/register", payload, None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name, email, and password are required");
    }
}

#[tokio::test]
async fn test_register_rejects_unknown_role() {
    let t = test_app().await;
    let (status, body) = send(
        &t.app,
        json_request(
            Method::POST,
            "/auth/register",
            json!({"name": "Eve", "email": "e@x.com", "password": "pw", "role": "root"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("root"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let t = test_app().await;
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let t = test_app().await;
    register(&t.app, "Bob", "bob@x.com", "hunter2").await;

    let (status, body) = send(
        &t.app,
        json_request(
            Method::POST,
            "/auth/login",
            json!({"email": "bob@x.com", "password": "hunter2"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Bob");
    let claims = t.codec.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.email, "bob@x.com");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let t = test_app().await;
    register(&t.app, "Bob", "bob@x.com", "hunter2").await;

    for (email, password) in [("bob@x.com", "wrong"), ("nobody@x.com", "hunter2")] {
        let (status, body) = send(
            &t.app,
            json_request(
                Method::POST,
                "/auth/login",
                json!({"email": email, "password": password}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_login_sets_token_cookie() {
    let t = test_app().await;
    register(&t.app, "Bob", "bob@x.com", "hunter2").await;

    let response = t
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/auth/login",
            json!({"email": "bob@x.com", "password": "hunter2"}),
            None,
        ))
        .await
        .unwrap();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
}
