#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use pylearn_api::{config::Config, create_router, services::AppState};

/// Router over a store seeded with the sample curriculum
pub async fn create_test_app() -> Router {
    build_app(Config::default()).await
}

/// Router over an empty store
pub async fn create_empty_app() -> Router {
    let mut config = Config::default();
    config.seed.sample_data = false;
    build_app(config).await
}

pub async fn build_app(config: Config) -> Router {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let app_state = Arc::new(
        AppState::new(config)
            .await
            .expect("Failed to initialize test app state"),
    );

    create_router(app_state)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub cookies: Vec<String>,
    pub body: Value,
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookies = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(|s| s.to_string()))
        .collect();

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).to_string())
        })
    };

    TestResponse {
        status,
        cookies,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, "GET", uri, None, None).await
}

/// Logs in and returns `(user json, "name=value" cookie pair)`
pub async fn login(app: &Router, username: &str) -> (Value, String) {
    let response = send(
        app,
        "POST",
        "/api/auth/login",
        Some(serde_json::json!({ "username": username })),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);

    let cookie = session_cookie(&response.cookies).expect("login sets a session cookie");
    (response.body, cookie)
}

pub fn session_cookie(cookies: &[String]) -> Option<String> {
    cookies
        .iter()
        .find(|c| c.starts_with("pylearn_sid="))
        .and_then(|c| c.split(';').next())
        .map(|pair| pair.trim().to_string())
}
