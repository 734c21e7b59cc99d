//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use ticketdesk_api::{AppState, build_app};
use ticketdesk_auth::{MemoryIdentityDirectory, MemoryRevocationStore, PasswordHasher};
use ticketdesk_core::clock::{Clock, ManualClock};
use ticketdesk_core::config::AppConfig;
use ticketdesk_core::traits::{Identity, Role};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Clock shared with every service in the app
    pub clock: ManualClock,
    /// Identity directory backing login
    pub directory: Arc<MemoryIdentityDirectory>,
    /// Refresh-token store
    pub store: Arc<MemoryRevocationStore>,
    /// Application state
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new test application
    pub fn with_config(config: AppConfig) -> Self {
        let clock = ManualClock::starting_now();
        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());

        let directory = Arc::new(MemoryIdentityDirectory::new());
        let store = Arc::new(MemoryRevocationStore::new(Arc::clone(&shared_clock)));

        let state = AppState::new(
            config,
            shared_clock,
            store.clone(),
            directory.clone(),
        )
        .expect("Failed to build app state");

        Self {
            router: build_app(state.clone()),
            clock,
            directory,
            store,
            state,
        }
    }

    /// Create a test user
    pub fn create_test_user(&self, username: &str, password: &str) -> Identity {
        self.directory
            .register(username, password, None, Role::Agent, &PasswordHasher::new())
            .expect("Failed to create test user")
    }

    /// Login and return the full response body
    pub async fn login(&self, username: &str, password: &str, remember: bool) -> Value {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({
                    "username": username,
                    "password": password,
                    "remember": remember,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.body
    }

    /// Rotate a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refresh_token": refresh_token })),
            None,
        )
        .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the app on an ephemeral local port and return its base URL
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr: SocketAddr = listener.local_addr().expect("No local address");
        let router = self.router.clone();

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Test server failed");
        });

        format!("http://{addr}")
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// String field from the body
    pub fn str(&self, key: &str) -> &str {
        self.body
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| panic!("No '{key}' in response: {:?}", self.body))
    }
}

/// String field from a JSON body
pub fn field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("No '{key}' in body: {body:?}"))
}
