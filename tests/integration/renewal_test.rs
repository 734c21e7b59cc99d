//! End-to-end tests for client-side silent renewal against a live server.

mod helpers;

use std::sync::Arc;

use chrono::Duration;
use http::StatusCode;

use ticketdesk_client::{ClientConfig, ClientError, PortalClient, SessionEvent};
use ticketdesk_core::traits::RevocationStore;

use helpers::TestApp;

async fn connected(app: &TestApp) -> (PortalClient, String) {
    let base_url = app.spawn().await;
    let client = PortalClient::new(&ClientConfig::new(base_url.clone())).unwrap();
    (client, base_url)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_expired_access_renews_once_for_concurrent_calls() {
    let app = TestApp::new();
    let identity = app.create_test_user("agent", "pw");
    let (client, _) = connected(&app).await;
    let client = Arc::new(client);
    let mut events = client.subscribe();

    client.login("agent", "pw", false).await.unwrap();
    let first_refresh = client.token_store().refresh_token().unwrap();

    app.clock.advance(Duration::minutes(61));

    let calls: Vec<_> = (0..8)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.me().await })
        })
        .collect();
    for call in futures::future::join_all(calls).await {
        assert_eq!(call.unwrap().unwrap().username, "agent");
    }

    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Renewed { .. }
    ));
    assert!(events.try_recv().is_err());
    assert_ne!(client.token_store().refresh_token().unwrap(), first_refresh);
    assert_eq!(app.store.count(identity.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_expired_refresh_terminates_session() {
    let app = TestApp::new();
    app.create_test_user("idle", "pw");
    let (client, _) = connected(&app).await;
    let mut events = client.subscribe();

    client.login("idle", "pw", false).await.unwrap();
    app.clock.advance(Duration::hours(25));

    let err = client.me().await.unwrap_err();

    assert!(err.is_session_terminated());
    assert!(!client.is_authenticated());
    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Terminated { .. }
    ));
}

#[tokio::test]
async fn test_replayed_refresh_from_another_device_terminates() {
    let app = TestApp::new();
    app.create_test_user("shared", "pw");
    let (client, _) = connected(&app).await;

    client.login("shared", "pw", false).await.unwrap();
    let stolen = client.token_store().refresh_token().unwrap();
    assert_eq!(app.refresh(&stolen).await.status, StatusCode::OK);

    app.clock.advance(Duration::minutes(61));
    let err = client.me().await.unwrap_err();

    assert!(err.is_session_terminated());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_logout_revokes_server_side() {
    let app = TestApp::new();
    app.create_test_user("bye", "pw");
    let (client, _) = connected(&app).await;

    client.login("bye", "pw", false).await.unwrap();
    let refresh_token = client.token_store().refresh_token().unwrap();

    client.logout().await;

    assert!(!client.is_authenticated());
    let replay = app.refresh(&refresh_token).await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert!(matches!(
        client.me().await.unwrap_err(),
        ClientError::MissingCredential
    ));
}

#[tokio::test]
async fn test_remembered_session_survives_restart() {
    let app = TestApp::new();
    app.create_test_user("loyal", "pw");
    let (_, base_url) = connected(&app).await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::new(base_url).with_credential_file(dir.path().join("session.json"));

    let first = PortalClient::new(&config).unwrap();
    first.login("loyal", "pw", true).await.unwrap();
    drop(first);

    app.clock.advance(Duration::days(3));
    let restarted = PortalClient::new(&config).unwrap();

    assert!(restarted.is_authenticated());
    assert_eq!(restarted.me().await.unwrap().username, "loyal");
}

#[tokio::test]
async fn test_unremembered_session_ends_with_process() {
    let app = TestApp::new();
    app.create_test_user("transient", "pw");
    let (_, base_url) = connected(&app).await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::new(base_url).with_credential_file(dir.path().join("session.json"));

    let first = PortalClient::new(&config).unwrap();
    first.login("transient", "pw", false).await.unwrap();
    drop(first);

    let restarted = PortalClient::new(&config).unwrap();

    assert!(!restarted.is_authenticated());
    assert!(matches!(
        restarted.me().await.unwrap_err(),
        ClientError::MissingCredential
    ));
}
