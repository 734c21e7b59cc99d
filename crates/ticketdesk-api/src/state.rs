//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use ticketdesk_auth::jwt::CredentialCodec;
use ticketdesk_auth::session::SessionManager;
use ticketdesk_core::clock::Clock;
use ticketdesk_core::config::AppConfig;
use ticketdesk_core::result::AppResult;
use ticketdesk_core::traits::{IdentityProvider, RevocationStore};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Source of "now" for every expiry decision
    pub clock: Arc<dyn Clock>,
    /// Credential signer/verifier
    pub codec: Arc<CredentialCodec>,
    /// Refresh record store
    pub revocation_store: Arc<dyn RevocationStore>,
    /// Identity lookup
    pub identities: Arc<dyn IdentityProvider>,
    /// Session lifecycle manager
    pub session_manager: Arc<SessionManager>,
}

impl AppState {
    /// Wires the session services from already-built collaborators.
    pub fn new(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        revocation_store: Arc<dyn RevocationStore>,
        identities: Arc<dyn IdentityProvider>,
    ) -> AppResult<Self> {
        let codec = Arc::new(CredentialCodec::new(&config.auth, Arc::clone(&clock)));
        let session_manager = Arc::new(SessionManager::new(
            &config.auth,
            Arc::clone(&codec),
            Arc::clone(&revocation_store),
            Arc::clone(&identities),
            Arc::clone(&clock),
        )?);

        Ok(Self {
            config: Arc::new(config),
            clock,
            codec,
            revocation_store,
            identities,
            session_manager,
        })
    }
}
