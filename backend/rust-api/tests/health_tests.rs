use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use http_body_util::BodyExt;
use tower::ServiceExt;

mod common;

async fn scrape_metrics(app: &axum::Router) -> String {
    let credentials = general_purpose::STANDARD.encode("admin:changeme");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .header(header::AUTHORIZATION, format!("Basic {}", credentials))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = common::create_test_app().await;

    let response = common::get(&app, "/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["service"], "pylearn-api");
    assert_eq!(response.body["store"]["stages"], 3);
}

#[tokio::test]
async fn test_metrics_requires_basic_auth() {
    let app = common::create_test_app().await;

    let response = common::get(&app, "/metrics").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let bad = general_purpose::STANDARD.encode("admin:wrong");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .header(header::AUTHORIZATION, format!("Basic {}", bad))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_metrics_exposes_request_counters() {
    let app = common::create_test_app().await;
    common::get(&app, "/api/stages").await;
    common::get(&app, "/api/stages/2/lessons").await;

    let text = scrape_metrics(&app).await;

    assert!(text.contains("http_requests_total"));
    assert!(text.contains(r#"path="/api/stages""#));
    assert!(text.contains(r#"path="/api/stages/{id}/lessons""#));
}

#[tokio::test]
async fn test_metrics_label_unknown_paths_as_one_series() {
    let app = common::create_test_app().await;
    for n in 0..10 {
        let response = common::get(&app, &format!("/scan/junk-{}/x{}", n, n)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
    let response = common::get(&app, "/api/lessons/junk-id").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let text = scrape_metrics(&app).await;

    assert!(!text.contains("junk"));
    let unmatched: Vec<_> = text
        .lines()
        .filter(|line| line.starts_with("http_requests_total{"))
        .filter(|line| line.contains(r#"path="unmatched""#))
        .collect();
    assert_eq!(unmatched.len(), 1, "{:?}", unmatched);
    assert!(text.contains(r#"path="/api/lessons/{id}",status="400""#));
}

#[tokio::test]
async fn test_cors_preflight_allows_api_calls() {
    let app = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/lessons/1/complete")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap();
    assert!(methods.contains("PATCH"));
}

#[tokio::test]
async fn test_cors_with_configured_origins_allows_credentials() {
    let mut config = pylearn_api::Config::default();
    config.server.cors_origins = vec!["https://pylearn.example".to_string()];
    let app = common::build_app(config).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/stages")
                .header(header::ORIGIN, "https://pylearn.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://pylearn.example"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stages")
                .header(header::ORIGIN, "https://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_trace_id_is_echoed_or_generated() {
    let app = common::create_test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/stages")
                .header("x-trace-id", "trace-abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-trace-id"], "trace-abc-123");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let generated = response.headers()["x-trace-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = common::create_test_app().await;

    let response = common::get(&app, "/api/does-not-exist").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
