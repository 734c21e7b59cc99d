//! Request logging.
//!
//! Logs one line per request. Query strings and header values are never
//! logged; the only credential fact recorded is whether a bearer was sent.

use std::time::Instant;

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

/// Coarse grouping of request paths for log filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Login, refresh, and logout.
    Session,
    /// Routes behind the access credential.
    Protected,
    /// Liveness.
    Health,
    /// Anything not routed.
    Other,
}

impl RouteClass {
    /// Classifies a request path.
    pub fn of(path: &str) -> Self {
        match path {
            "/api/auth/login" | "/api/auth/refresh" | "/api/auth/logout" => Self::Session,
            "/api/health" => Self::Health,
            p if p.starts_with("/api/") => Self::Protected,
            _ => Self::Other,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Protected => "protected",
            Self::Health => "health",
            Self::Other => "other",
        }
    }
}

/// Logs method, path, route class, bearer presence, status, and duration.
/// Rejected session calls are logged at `warn`.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let class = RouteClass::of(&path);
    let has_bearer = request.headers().contains_key(AUTHORIZATION);
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if class == RouteClass::Session && response.status().is_client_error() {
        warn!(
            method = %method,
            path = %path,
            route = class.as_str(),
            status,
            duration_ms,
            "Session request rejected"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            route = class.as_str(),
            bearer = has_bearer,
            status,
            duration_ms,
            "HTTP request"
        );
    }

    response
}
