//! CORS for browser portals calling the session API.

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use ticketdesk_core::config::CorsConfig;

/// Methods the session routes answer when none are configured.
const DEFAULT_METHODS: [Method; 2] = [Method::GET, Method::POST];

/// Builds the CORS layer.
///
/// `"*"` allows any origin. Unparsable origins and methods are skipped with
/// a warning rather than failing startup.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins(&config.allowed_origins))
        .allow_methods(allowed_methods(&config.allowed_methods))
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age_seconds))
}

fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.iter().any(|o| o == "*") {
        return AllowOrigin::any();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    AllowOrigin::list(parsed)
}

fn allowed_methods(methods: &[String]) -> Vec<Method> {
    let parsed: Vec<Method> = methods
        .iter()
        .filter_map(|m| match m.to_ascii_uppercase().parse() {
            Ok(method) => Some(method),
            Err(_) => {
                tracing::warn!(method = %m, "Ignoring unparsable CORS method");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        DEFAULT_METHODS.to_vec()
    } else {
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_are_normalised_and_defaulted() {
        assert_eq!(
            allowed_methods(&["get".to_string(), "post".to_string()]),
            vec![Method::GET, Method::POST]
        );
        assert_eq!(allowed_methods(&[]), DEFAULT_METHODS.to_vec());
        assert_eq!(
            allowed_methods(&["bad method".to_string()]),
            DEFAULT_METHODS.to_vec()
        );
    }
}
