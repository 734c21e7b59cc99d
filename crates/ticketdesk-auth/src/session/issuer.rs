//! Session issuance: minting the pair and recording the refresh hash.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use ticketdesk_core::config::AuthConfig;
use ticketdesk_core::error::AppError;
use ticketdesk_core::events::SessionEvent;
use ticketdesk_core::result::AppResult;
use ticketdesk_core::traits::RevocationStore;
use ticketdesk_core::types::UserId;

use crate::jwt::{CredentialCodec, TokenType};

use super::{TokenPair, hash_prefix};

/// Mints credential pairs and records their refresh hashes.
#[derive(Debug, Clone)]
pub struct SessionIssuer {
    codec: Arc<CredentialCodec>,
    store: Arc<dyn RevocationStore>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    remember_ttl: Duration,
}

impl SessionIssuer {
    /// Creates an issuer with lifetimes taken from `config`.
    pub fn new(
        config: &AuthConfig,
        codec: Arc<CredentialCodec>,
        store: Arc<dyn RevocationStore>,
    ) -> AppResult<Self> {
        Ok(Self {
            codec,
            store,
            access_ttl: ttl("auth.access_ttl_minutes", config.access_ttl_minutes, 60)?,
            refresh_ttl: ttl("auth.refresh_ttl_hours", config.refresh_ttl_hours, 3600)?,
            remember_ttl: ttl("auth.remember_ttl_days", config.remember_ttl_days, 86_400)?,
        })
    }

    /// Lifetime of access tokens.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh lifetime picked by the remember flag.
    pub fn refresh_ttl(&self, remember: bool) -> Duration {
        if remember {
            self.remember_ttl
        } else {
            self.refresh_ttl
        }
    }

    /// Issues a fresh session for a verified identity.
    pub async fn issue(&self, user_id: UserId, remember: bool) -> AppResult<TokenPair> {
        let refresh = self
            .codec
            .issue(user_id, TokenType::Refresh, self.refresh_ttl(remember))?;
        let pair = self
            .record(user_id, refresh.token, refresh.expires_at)
            .await?;

        SessionEvent::Created {
            user_id,
            remember,
            expires_at: pair.refresh_expires_at,
        }
        .emit();

        Ok(pair)
    }

    /// Issues a pair whose refresh token expires at exactly `expires_at`.
    ///
    /// Used by rotation to carry over the remaining lifetime.
    pub async fn issue_until(
        &self,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> AppResult<TokenPair> {
        let refresh = self
            .codec
            .issue_until(user_id, TokenType::Refresh, expires_at)?;
        self.record(user_id, refresh.token, refresh.expires_at).await
    }

    async fn record(
        &self,
        user_id: UserId,
        refresh_token: String,
        refresh_expires_at: DateTime<Utc>,
    ) -> AppResult<TokenPair> {
        let access = self
            .codec
            .issue(user_id, TokenType::Access, self.access_ttl)?;
        let token_hash = self.codec.hash_token(&refresh_token);

        let pruned = self.store.prune_expired(user_id).await?;
        self.store
            .put(user_id, &token_hash, refresh_expires_at)
            .await?;

        debug!(
            user_id = %user_id,
            token_hash = %hash_prefix(&token_hash),
            pruned = pruned,
            "Refresh record stored"
        );

        Ok(TokenPair {
            access_token: access.token,
            refresh_token,
            access_expires_at: access.expires_at,
            refresh_expires_at,
        })
    }
}

fn ttl(field: &str, value: u64, unit_seconds: i64) -> AppResult<Duration> {
    i64::try_from(value)
        .ok()
        .and_then(|v| v.checked_mul(unit_seconds))
        .and_then(Duration::try_seconds)
        .ok_or_else(|| AppError::configuration(format!("{field} is out of range")))
}
