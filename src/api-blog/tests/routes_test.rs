//! Integration tests for API route handlers
//!
//! Drives the full router (middleware included) against the in-memory store:
//! - POST /api/register, /api/login, /api/logout
//! - GET /{user_id}/
//! - POST, GET /api/post
//! - GET, PUT, DELETE /api/post/{id}

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use chrono::Utc;
use core_blog::AuthConfig;
use data_model_blog::{
    models::{ErrorResponse, MessageResponse, Post, PostPayload},
    test_helpers::MemoryStore,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use api_blog::{AppState, routes::router};

const TEST_SECRET: &str = "integration_test_secret_0123456789abcdef";
const TEST_BCRYPT_COST: u32 = 4;

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        key: TEST_SECRET.to_string(),
        duration_seconds: 3600,
        min_login_millis: 0,
        bcrypt_cost: TEST_BCRYPT_COST,
    }
}

/// Helper to create a router over a fresh in-memory store
fn test_router() -> (axum::Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_store(store.clone(), test_auth_config());
    (router(state, Duration::from_secs(5)), store)
}

/// Helper to parse JSON response body
async fn response_json<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn form_request(uri: &str, username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={}&password={}", username, password)))
        .unwrap()
}

fn json_request(method: &str, uri: &str, payload: &PostPayload) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

fn payload(name: &str, text: &str) -> PostPayload {
    PostPayload {
        name: name.to_string(),
        text: text.to_string(),
    }
}

/// Extracts `session=<token>` from a Set-Cookie header, ready to send back as a Cookie header
fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn register_and_login(app: &axum::Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(form_request("/api/register", username, password))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(form_request("/api/login", username, password))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

//
// Auth flow tests
//

#[tokio::test]
async fn test_register_login_home_logout_scenario() {
    let (app, _store) = test_router();

    let response = app
        .clone()
        .oneshot(form_request("/api/register", "alice", "pw1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: MessageResponse = response_json(response).await;
    assert_eq!(body.message, "Registration successful");

    let response = app
        .clone()
        .oneshot(form_request("/api/login", "alice", "pw1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    assert!(cookie.starts_with("session="));
    let body: MessageResponse = response_json(response).await;
    assert_eq!(body.message, "Login successful");

    let home = Request::builder()
        .uri("/1/")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(home).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: MessageResponse = response_json(response).await;
    assert_eq!(body.message, "Hello, alice!");

    let logout = Request::builder()
        .method("POST")
        .uri("/api/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(logout).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // The browser now holds the cleared cookie
    let cleared = session_cookie(&response);
    assert_eq!(cleared, "session=");
    let body: MessageResponse = response_json(response).await;
    assert_eq!(body.message, "Logout successful");

    let home = Request::builder()
        .uri("/1/")
        .header(header::COOKIE, &cleared)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(home).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _store) = test_router();
    register_and_login(&app, "alice", "pw1").await;

    let wrong_password = app
        .clone()
        .oneshot(form_request("/api/login", "alice", "wrong"))
        .await
        .unwrap();
    let unknown_user = app
        .oneshot(form_request("/api/login", "nobody", "pw1"))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong_password.headers().get(header::SET_COOKIE).is_none());

    let wrong_password: ErrorResponse = response_json(wrong_password).await;
    let unknown_user: ErrorResponse = response_json(unknown_user).await;
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (app, _store) = test_router();
    register_and_login(&app, "alice", "pw1").await;

    let response = app
        .oneshot(form_request("/api/register", "alice", "other"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_requires_form_fields() {
    let (app, _store) = test_router();

    let request = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=alice"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_home_without_session_is_unauthorized() {
    let (app, _store) = test_router();

    let response = app.oneshot(empty_request("GET", "/1/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_home_with_forged_cookie_is_unauthorized() {
    let (app, _store) = test_router();
    register_and_login(&app, "alice", "pw1").await;

    let request = Request::builder()
        .uri("/1/")
        .header(header::COOKIE, "session=1:1700000000:bm9uY2U:c2lnbmF0dXJl")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_home_for_another_user_is_unauthorized() {
    let (app, _store) = test_router();
    register_and_login(&app, "alice", "pw1").await;
    let bob_cookie = register_and_login(&app, "bob", "pw2").await;

    let request = Request::builder()
        .uri("/1/")
        .header(header::COOKIE, &bob_cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/2/")
        .header(header::COOKIE, &bob_cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: MessageResponse = response_json(response).await;
    assert_eq!(body.message, "Hello, bob!");
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let (app, _store) = test_router();

    let response = app.oneshot(empty_request("POST", "/api/logout")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

//
// Post CRUD tests
//

#[tokio::test]
async fn test_post_crud_scenario() {
    let (app, _store) = test_router();

    let before = Utc::now();
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/post", &payload("t", "b")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Post = response_json(response).await;
    assert_eq!(created.id, 1);
    assert_eq!(created.name, "t");
    assert_eq!(created.text, "b");
    assert!(created.date >= before);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/post/1", &payload("t2", "b2")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Post = response_json(response).await;
    assert_eq!(updated.id, 1);
    assert_eq!(updated.name, "t2");
    assert_eq!(updated.text, "b2");
    assert!(updated.date >= created.date);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/api/post/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(empty_request("GET", "/api/post/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let (app, _store) = test_router();

    let before = Utc::now();
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/post", &payload("title", "body text")))
        .await
        .unwrap();
    let created: Post = response_json(response).await;

    let response = app
        .oneshot(empty_request("GET", &format!("/api/post/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Post = response_json(response).await;
    assert_eq!(fetched.name, "title");
    assert_eq!(fetched.text, "body text");
    assert!(fetched.date >= before);
}

#[tokio::test]
async fn test_list_posts() {
    let (app, _store) = test_router();

    let response = app.clone().oneshot(empty_request("GET", "/api/post")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let empty: Vec<Post> = response_json(response).await;
    assert!(empty.is_empty());

    for (name, text) in [("first", "1"), ("second", "2")] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/post", &payload(name, text)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.oneshot(empty_request("GET", "/api/post")).await.unwrap();
    let posts: Vec<Post> = response_json(response).await;
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].name, "first");
    assert_eq!(posts[1].name, "second");
    assert_ne!(posts[0].id, posts[1].id);
}

#[tokio::test]
async fn test_delete_missing_post_is_idempotent() {
    let (app, store) = test_router();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/post", &payload("keep", "me")))
        .await
        .unwrap();
    let kept: Post = response_json(response).await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/api/post/999"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    assert_eq!(store.post_count().await, 1);
    let response = app
        .oneshot(empty_request("GET", &format!("/api/post/{}", kept.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_missing_post_is_not_found() {
    let (app, store) = test_router();

    let response = app
        .oneshot(json_request("PUT", "/api/post/42", &payload("n", "t")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.post_count().await, 0);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let (app, _store) = test_router();

    for (method, uri) in [
        ("GET", "/api/post/abc"),
        ("DELETE", "/api/post/abc"),
    ] {
        let response = app.clone().oneshot(empty_request(method, uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", method, uri);
        let body: ErrorResponse = response_json(response).await;
        assert_eq!(body.error, "Invalid post ID");
    }

    let response = app
        .oneshot(json_request("PUT", "/api/post/abc", &payload("n", "t")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, store) = test_router();

    let request = Request::builder()
        .method("POST")
        .uri("/api/post")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": \"unterminated\""))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response_json(response).await;
    assert_eq!(body.error, "Invalid request payload");

    let request = Request::builder()
        .method("POST")
        .uri("/api/post")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("name=t&text=b"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(store.post_count().await, 0);
}

#[tokio::test]
async fn test_partial_and_untyped_post_body_accepted() {
    let (app, store) = test_router();

    // Missing fields default to empty strings
    let request = Request::builder()
        .method("POST")
        .uri("/api/post")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name": "t"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Post = response_json(response).await;
    assert_eq!(created.name, "t");
    assert_eq!(created.text, "");

    // Valid JSON without a Content-Type header
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/post/{}", created.id))
        .body(Body::from(r#"{"name": "t2", "text": "b2"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Post = response_json(response).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.text, "b2");

    let request = Request::builder()
        .method("POST")
        .uri("/api/post")
        .body(Body::from(r#"{"name": "n", "text": "t"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    assert_eq!(store.post_count().await, 2);
}

#[tokio::test]
async fn test_health_check() {
    let (app, _store) = test_router();

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
