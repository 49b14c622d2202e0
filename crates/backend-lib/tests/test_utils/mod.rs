//! Test utilities for the authkit HTTP tests
//!
//! Builds an in-memory application with cheap password hashing and a known
//! JWT secret, and drives it through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use authkit_backend::{
    auth::{JwtIssuer, PasswordService},
    config::{HashingSettings, Settings},
    create_router,
    storage::InMemoryUserStore,
    AppState,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Settings with hashing cheap enough for debug-build tests
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.jwt.secret = Some(SECRET.to_string());
    settings.hashing = HashingSettings {
        scrypt_log_n: 4,
        ..HashingSettings::default()
    };
    settings
}

/// Everything a test needs to talk to the app and inspect its effects
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub issuer: Arc<JwtIssuer>,
}

pub fn setup_test_app() -> TestApp {
    let settings = test_settings();
    let issuer = Arc::new(JwtIssuer::from_settings(&settings.jwt));
    let hasher = Arc::new(PasswordService::new(&settings.hashing).unwrap());
    let state = AppState::with_parts(
        Arc::new(InMemoryUserStore::new()),
        hasher,
        issuer.clone(),
        settings,
    );
    TestApp {
        router: create_router(state.clone()),
        state,
        issuer,
    }
}

/// POST a raw body with a JSON content type
pub async fn post_raw(router: &Router, path: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    post_raw(router, path, body.to_string()).await
}

pub async fn register(router: &Router, username: &str, email: &str, password: &str) -> (StatusCode, Value) {
    post_json(
        router,
        "/register/",
        serde_json::json!({ "username": username, "email": email, "password": password }),
    )
    .await
}

pub async fn login(router: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    post_json(
        router,
        "/login/",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await
}

/// Assert the uniform error envelope shape and return its message
pub fn assert_envelope(body: &Value, status: u16, error: &str, path: &str) -> Value {
    assert_eq!(body["status"], Value::from(status), "{body}");
    assert_eq!(body["error"], Value::from(error), "{body}");
    assert_eq!(body["path"], Value::from(path), "{body}");
    let timestamp = body["timestamp"].as_str().expect("timestamp is a string");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(), "{timestamp}");
    body["message"].clone()
}
