//! Application builder: wires state, router, and middleware into an Axum app.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use ticketdesk_auth::directory::MemoryIdentityDirectory;
use ticketdesk_auth::password::PasswordHasher;
use ticketdesk_auth::revocation::build_store;
use ticketdesk_core::clock::Clock;
use ticketdesk_core::config::AppConfig;
use ticketdesk_core::result::AppResult;
use ticketdesk_core::traits::IdentityProvider;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Builds the application state from configuration.
///
/// Connects the configured revocation store and seeds the in-memory
/// identity directory from `[[users]]`.
pub async fn build_state(config: AppConfig, clock: Arc<dyn Clock>) -> AppResult<AppState> {
    tracing::info!(
        provider = %config.revocation.provider,
        "Initializing revocation store"
    );
    let store = build_store(&config.revocation, Arc::clone(&clock)).await?;

    let directory = MemoryIdentityDirectory::from_seed(&config.users, &PasswordHasher::new())?;
    let identities: Arc<dyn IdentityProvider> = Arc::new(directory);

    AppState::new(config, clock, store, identities)
}
