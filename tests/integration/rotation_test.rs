//! Integration tests for refresh rotation through the HTTP surface.

mod helpers;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use http::StatusCode;

use helpers::{TestApp, field};

fn expires(body: &serde_json::Value, key: &str) -> DateTime<Utc> {
    field(body, key).parse().expect("Bad timestamp")
}

#[tokio::test]
async fn test_refresh_returns_new_pair() {
    let app = TestApp::new();
    app.create_test_user("rotator", "pw");
    let login = app.login("rotator", "pw", false).await;

    let response = app.refresh(field(&login, "refresh_token")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_ne!(response.str("refresh_token"), field(&login, "refresh_token"));
    assert_ne!(response.str("access_token"), field(&login, "access_token"));

    let me = app
        .request("GET", "/api/auth/me", None, Some(response.str("access_token")))
        .await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_token_is_single_use() {
    let app = TestApp::new();
    app.create_test_user("once", "pw");
    let login = app.login("once", "pw", false).await;
    let refresh_token = field(&login, "refresh_token");

    let first = app.refresh(refresh_token).await;
    let replay = app.refresh(refresh_token).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.str("error"), "UNKNOWN_OR_REUSED_REFRESH");
    assert_eq!(replay.str("message"), "unknown_or_reused_refresh");
}

#[tokio::test]
async fn test_rotation_preserves_remaining_lifetime() {
    let app = TestApp::new();
    app.create_test_user("steady", "pw");
    let login = app.login("steady", "pw", true).await;
    let original_expiry = expires(&login, "refresh_expires_at");

    app.clock.advance(Duration::days(1));
    let response = app.refresh(field(&login, "refresh_token")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(expires(&response.body, "refresh_expires_at"), original_expiry);
}

#[tokio::test]
async fn test_expired_refresh_is_rejected() {
    let app = TestApp::new();
    app.create_test_user("stale", "pw");
    let login = app.login("stale", "pw", false).await;

    app.clock.advance(Duration::hours(24));
    let response = app.refresh(field(&login, "refresh_token")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.str("message"), "invalid_refresh");
}

#[tokio::test]
async fn test_access_token_cannot_refresh() {
    let app = TestApp::new();
    app.create_test_user("confused", "pw");
    let login = app.login("confused", "pw", false).await;

    let response = app.refresh(field(&login, "access_token")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.str("message"), "invalid_refresh");
}

#[tokio::test]
async fn test_garbage_and_empty_refresh_are_invalid() {
    let app = TestApp::new();

    for token in ["", "abc.def.ghi", "not-a-jwt"] {
        let response = app.refresh(token).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "token {token:?}");
        assert_eq!(response.str("message"), "invalid_refresh");
    }
}

#[tokio::test]
async fn test_sessions_rotate_independently() {
    let app = TestApp::new();
    app.create_test_user("two-tabs", "pw");
    let laptop = app.login("two-tabs", "pw", false).await;
    let phone = app.login("two-tabs", "pw", true).await;

    let laptop_rotated = app.refresh(field(&laptop, "refresh_token")).await;
    let phone_rotated = app.refresh(field(&phone, "refresh_token")).await;

    assert_eq!(laptop_rotated.status, StatusCode::OK);
    assert_eq!(phone_rotated.status, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rotation_has_one_winner() {
    let app = Arc::new(TestApp::new());
    app.create_test_user("racer", "pw");
    let login = app.login("racer", "pw", false).await;
    let refresh_token = field(&login, "refresh_token").to_string();

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let app = Arc::clone(&app);
            let token = refresh_token.clone();
            tokio::spawn(async move { app.refresh(&token).await.status })
        })
        .collect();

    let statuses: Vec<StatusCode> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::UNAUTHORIZED)
            .count(),
        7
    );
}

#[tokio::test]
async fn test_unreadable_refresh_body_is_invalid_refresh() {
    let app = TestApp::new();

    let missing = app.request("POST", "/api/auth/refresh", None, None).await;
    let wrong_shape = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "token": "abc" })),
            None,
        )
        .await;

    for response in [missing, wrong_shape] {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.str("error"), "INVALID_SIGNATURE");
        assert_eq!(response.str("message"), "invalid_refresh");
    }
}
