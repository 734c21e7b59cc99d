//! Integration tests for login, authentication, and logout.

mod helpers;

use chrono::Duration;
use http::StatusCode;

use ticketdesk_core::clock::Clock;
use ticketdesk_core::traits::RevocationStore;

use helpers::{TestApp, field};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    let identity = app.create_test_user("testuser", "password123");

    let body = app.login("testuser", "password123", false).await;

    assert!(body.get("access_token").is_some());
    assert!(body.get("refresh_token").is_some());
    assert!(body.get("access_expires_at").is_some());
    assert_eq!(body["user"]["username"], "testuser");
    assert_eq!(app.store.count(identity.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.create_test_user("testuser2", "password123");

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "testuser2", "password": "wrong" })),
            None,
        )
        .await;
    let unknown_user = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "nobody", "password": "wrong" })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_login_rejects_empty_username() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "", "password": "x" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remember_extends_refresh_lifetime() {
    let app = TestApp::new();
    app.create_test_user("keeper", "pw");

    let short = app.login("keeper", "pw", false).await;
    let long = app.login("keeper", "pw", true).await;

    let short_exp: chrono::DateTime<chrono::Utc> =
        field(&short, "refresh_expires_at").parse().unwrap();
    let long_exp: chrono::DateTime<chrono::Utc> =
        field(&long, "refresh_expires_at").parse().unwrap();

    assert_eq!(short_exp, app.clock.now() + Duration::hours(24));
    assert_eq!(long_exp, app.clock.now() + Duration::days(7));
}

#[tokio::test]
async fn test_me_authenticated() {
    let app = TestApp::new();
    app.create_test_user("meuser", "password123");
    let body = app.login("meuser", "password123", false).await;

    let response = app
        .request("GET", "/api/auth/me", None, Some(field(&body, "access_token")))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str("username"), "meuser");
    assert_eq!(response.str("role"), "agent");
}

#[tokio::test]
async fn test_me_without_token() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.str("message"), "Missing token");
}

#[tokio::test]
async fn test_expired_access_reports_token_expired() {
    let app = TestApp::new();
    app.create_test_user("sleepy", "pw");
    let body = app.login("sleepy", "pw", false).await;

    app.clock.advance(Duration::minutes(60));
    let response = app
        .request("GET", "/api/auth/me", None, Some(field(&body, "access_token")))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.str("error"), "EXPIRED_CREDENTIAL");
    assert_eq!(response.str("message"), "Token expired");
}

#[tokio::test]
async fn test_tampered_access_reports_invalid_token() {
    let app = TestApp::new();
    app.create_test_user("mallory", "pw");
    let body = app.login("mallory", "pw", false).await;
    let forged = format!("{}x", field(&body, "access_token"));

    let response = app.request("GET", "/api/auth/me", None, Some(&forged)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.str("message"), "Invalid token");
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::new();
    app.create_test_user("swapper", "pw");
    let body = app.login("swapper", "pw", false).await;

    let response = app
        .request("GET", "/api/auth/me", None, Some(field(&body, "refresh_token")))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.str("message"), "Invalid token");
}

#[tokio::test]
async fn test_removed_user_access_token_stops_resolving() {
    let app = TestApp::new();
    let identity = app.create_test_user("leaver", "pw");
    let body = app.login("leaver", "pw", false).await;

    app.directory.remove(identity.id);
    let response = app
        .request("GET", "/api/auth/me", None, Some(field(&body, "access_token")))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.str("message"), "Invalid token");
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = TestApp::new();
    app.create_test_user("leaving", "pw");
    let body = app.login("leaving", "pw", false).await;
    let refresh_token = field(&body, "refresh_token");

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(serde_json::json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str("message"), "logged_out");

    let rotated = app.refresh(refresh_token).await;
    assert_eq!(rotated.status, StatusCode::UNAUTHORIZED);
    assert_eq!(rotated.str("message"), "unknown_or_reused_refresh");
}

#[tokio::test]
async fn test_logout_always_succeeds() {
    let app = TestApp::new();

    let garbage = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(serde_json::json!({ "refresh_token": "not-a-token" })),
            None,
        )
        .await;
    let empty = app.request("POST", "/api/auth/logout", None, None).await;

    assert_eq!(garbage.status, StatusCode::OK);
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.str("message"), "logged_out");
}

#[tokio::test]
async fn test_logout_with_expired_refresh_still_removes_record() {
    let app = TestApp::new();
    let identity = app.create_test_user("late", "pw");
    let body = app.login("late", "pw", false).await;

    app.clock.advance(Duration::hours(25));
    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(serde_json::json!({ "refresh_token": field(&body, "refresh_token") })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.store.count(identity.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str("status"), "ok");
}
