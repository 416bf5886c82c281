use axum::http::StatusCode;
use serde_json::json;

mod common;

use common::{get, login, send, session_cookie};

#[tokio::test]
async fn test_login_creates_user_with_derived_profile() {
    let app = common::create_test_app().await;

    let (user, cookie) = login(&app, "alice").await;

    assert_eq!(user["username"], "alice");
    assert_eq!(user["name"], "Alice");
    assert_eq!(user["email"], "alice@pylearn.com");
    assert_eq!(user["points"], 0);
    assert!(user["id"].as_i64().unwrap() >= 100);
    assert!(cookie.starts_with("pylearn_sid="));
}

#[tokio::test]
async fn test_login_twice_returns_same_user() {
    let app = common::create_test_app().await;

    let (first, _) = login(&app, "alice").await;
    let (second, _) = login(&app, "alice").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_login_existing_seed_user() {
    let app = common::create_test_app().await;

    let (user, _) = login(&app, "johndoe").await;

    assert_eq!(user["id"], 1);
    assert_eq!(user["name"], "John Doe");
    assert_eq!(user["points"], 1250);
}

#[tokio::test]
async fn test_login_requires_username() {
    let app = common::create_test_app().await;

    for body in [json!({}), json!({ "username": "" }), json!({ "username": "  " })] {
        let response = send(&app, "POST", "/api/auth/login", Some(body), None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["message"], "Username is required");
        assert!(session_cookie(&response.cookies).is_none());
    }
}

#[tokio::test]
async fn test_login_rejects_malformed_json() {
    let app = common::create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "username": 42 })),
        None,
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn test_current_user_requires_session() {
    let app = common::create_test_app().await;

    let response = get(&app, "/api/user").await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, json!({ "message": "Not authenticated" }));
}

#[tokio::test]
async fn test_current_user_with_session() {
    let app = common::create_test_app().await;
    let (user, cookie) = login(&app, "bob").await;

    let response = send(&app, "GET", "/api/user", None, Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, user);
}

#[tokio::test]
async fn test_unknown_session_cookie_is_unauthenticated() {
    let app = common::create_test_app().await;

    let response = send(
        &app,
        "GET",
        "/api/user",
        None,
        Some("pylearn_sid=forged-token"),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_destroys_session() {
    let app = common::create_test_app().await;
    let (_, cookie) = login(&app, "carol").await;

    let response = send(&app, "POST", "/api/auth/logout", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "message": "Logged out successfully" }));
    let cleared = response
        .cookies
        .iter()
        .find(|c| c.starts_with("pylearn_sid="))
        .expect("logout clears the session cookie");
    assert!(cleared.contains("Max-Age=0"));

    let response = send(&app, "GET", "/api/user", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let app = common::create_test_app().await;

    let response = send(&app, "POST", "/api/auth/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Logged out successfully");
}

#[tokio::test]
async fn test_relogin_replaces_previous_session() {
    let app = common::create_test_app().await;
    let (_, alice_cookie) = login(&app, "alice").await;

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "username": "dave" })),
        Some(&alice_cookie),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let dave_cookie = session_cookie(&response.cookies).unwrap();

    let old = send(&app, "GET", "/api/user", None, Some(&alice_cookie)).await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    let current = send(&app, "GET", "/api/user", None, Some(&dave_cookie)).await;
    assert_eq!(current.body["username"], "dave");
}

#[tokio::test]
async fn test_login_trims_surrounding_whitespace() {
    let app = common::create_test_app().await;
    let (alice, _) = login(&app, "alice").await;

    let (padded, _) = login(&app, "  alice\t").await;

    assert_eq!(padded, alice);
    assert_eq!(padded["username"], "alice");
}

#[tokio::test]
async fn test_login_rejects_overlong_username() {
    let app = common::create_test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "username": "x".repeat(65) })),
        None,
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Username must be at most 64 characters");
}
