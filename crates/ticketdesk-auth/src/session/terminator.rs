//! Logout.

use std::sync::Arc;

use tracing::{debug, error};

use ticketdesk_core::events::SessionEvent;
use ticketdesk_core::traits::RevocationStore;

use crate::jwt::{CredentialCodec, TokenType};

use super::hash_prefix;

/// Deletes the refresh record behind a presented token.
#[derive(Debug, Clone)]
pub struct SessionTerminator {
    codec: Arc<CredentialCodec>,
    store: Arc<dyn RevocationStore>,
}

impl SessionTerminator {
    /// Creates a terminator.
    pub fn new(codec: Arc<CredentialCodec>, store: Arc<dyn RevocationStore>) -> Self {
        Self { codec, store }
    }

    /// Best-effort logout. Never fails.
    ///
    /// The signature is verified but expiry is ignored, so an expired token
    /// still cleans up its record. Returns `true` if a record was removed.
    pub async fn logout(&self, refresh_token: &str) -> bool {
        let claims = match self.codec.verify_signature(refresh_token) {
            Ok(claims) if claims.token_type == TokenType::Refresh => claims,
            Ok(_) | Err(_) => {
                debug!("Logout with an unusable refresh token; nothing to remove");
                return false;
            }
        };
        let user_id = claims.user_id();
        let token_hash = self.codec.hash_token(refresh_token);

        let removed = match self.store.remove(user_id, &token_hash).await {
            Ok(removed) => removed,
            Err(e) => {
                error!(
                    user_id = %user_id,
                    token_hash = %hash_prefix(&token_hash),
                    error = %e,
                    "Failed to remove refresh record on logout"
                );
                false
            }
        };

        SessionEvent::Destroyed { user_id, removed }.emit();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use ticketdesk_core::clock::{Clock, ManualClock};
    use ticketdesk_core::config::AuthConfig;
    use ticketdesk_core::types::UserId;

    use crate::revocation::MemoryRevocationStore;
    use crate::session::SessionIssuer;

    fn parts(
        clock: &ManualClock,
    ) -> (SessionIssuer, SessionTerminator, Arc<dyn RevocationStore>) {
        let config = AuthConfig::default();
        let clock: Arc<dyn Clock> = Arc::new(clock.clone());
        let codec = Arc::new(CredentialCodec::new(&config, Arc::clone(&clock)));
        let store: Arc<dyn RevocationStore> = Arc::new(MemoryRevocationStore::new(clock));
        let issuer = SessionIssuer::new(&config, Arc::clone(&codec), Arc::clone(&store)).unwrap();
        let terminator = SessionTerminator::new(codec, Arc::clone(&store));
        (issuer, terminator, store)
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let clock = ManualClock::starting_now();
        let (issuer, terminator, store) = parts(&clock);
        let user = UserId::new();
        let pair = issuer.issue(user, false).await.unwrap();

        assert!(terminator.logout(&pair.refresh_token).await);
        assert!(!terminator.logout(&pair.refresh_token).await);
        assert_eq!(store.count(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_logout_with_expired_token_still_cleans_up() {
        let clock = ManualClock::starting_now();
        let (issuer, terminator, store) = parts(&clock);
        let user = UserId::new();
        let pair = issuer.issue(user, false).await.unwrap();
        clock.advance(Duration::days(2));

        assert!(terminator.logout(&pair.refresh_token).await);
        assert_eq!(store.count(user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_logout_ignores_garbage_and_other_devices() {
        let clock = ManualClock::starting_now();
        let (issuer, terminator, store) = parts(&clock);
        let user = UserId::new();
        let laptop = issuer.issue(user, false).await.unwrap();
        issuer.issue(user, false).await.unwrap();

        assert!(!terminator.logout("garbage").await);
        assert!(!terminator.logout(&laptop.access_token).await);
        assert!(terminator.logout(&laptop.refresh_token).await);
        assert_eq!(store.count(user).await.unwrap(), 1);
    }
}
