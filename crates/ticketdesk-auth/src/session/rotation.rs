//! Refresh rotation.
//!
//! A presented refresh token moves through `Received -> Decoded -> Matched ->
//! Rotated`, or exits early as a [`RotationRejection`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use ticketdesk_core::clock::Clock;
use ticketdesk_core::error::AppError;
use ticketdesk_core::events::SessionEvent;
use ticketdesk_core::result::AppResult;
use ticketdesk_core::traits::RevocationStore;

use crate::jwt::{CredentialCodec, TokenType, VerifyError};

use super::{SessionIssuer, TokenPair, hash_prefix};

/// Why a refresh token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationRejection {
    /// Signature, format, or type check failed.
    InvalidRefresh,
    /// Signature checked out but the token had already expired.
    ExpiredRefresh,
    /// No live record: never issued, already rotated, or logged out.
    UnknownOrReused,
}

impl RotationRejection {
    /// Message placed in the 401 body.
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidRefresh | Self::ExpiredRefresh => "invalid_refresh",
            Self::UnknownOrReused => "unknown_or_reused_refresh",
        }
    }
}

impl fmt::Display for RotationRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<RotationRejection> for AppError {
    fn from(rejection: RotationRejection) -> Self {
        let message = rejection.message();
        match rejection {
            RotationRejection::InvalidRefresh => AppError::invalid_signature(message),
            RotationRejection::ExpiredRefresh => AppError::expired(message),
            RotationRejection::UnknownOrReused => AppError::unknown_or_reused(message),
        }
    }
}

/// Exchanges a refresh token for a new pair, exactly once.
#[derive(Debug, Clone)]
pub struct RotationService {
    codec: Arc<CredentialCodec>,
    store: Arc<dyn RevocationStore>,
    issuer: Arc<SessionIssuer>,
    clock: Arc<dyn Clock>,
}

impl RotationService {
    /// Creates a rotation service.
    pub fn new(
        codec: Arc<CredentialCodec>,
        store: Arc<dyn RevocationStore>,
        issuer: Arc<SessionIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec,
            store,
            issuer,
            clock,
        }
    }

    /// Rotates `refresh_token` into a new pair.
    ///
    /// The new refresh token expires when the presented one's record did.
    /// Once the old record has been taken, a failure to store the new one
    /// leaves the session without a record.
    pub async fn rotate(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self
            .codec
            .verify_as(refresh_token, TokenType::Refresh)
            .map_err(|e| match e {
                VerifyError::Invalid => RotationRejection::InvalidRefresh,
                VerifyError::Expired => RotationRejection::ExpiredRefresh,
            })?;
        let user_id = claims.user_id();

        let token_hash = self.codec.hash_token(refresh_token);
        let Some(record) = self.store.take_valid(user_id, &token_hash).await? else {
            SessionEvent::ReplayRejected { user_id }.emit();
            return Err(RotationRejection::UnknownOrReused.into());
        };

        let remaining = record.expires_at - self.clock.now();
        if remaining <= chrono::Duration::zero() {
            warn!(user_id = %user_id, "Matched refresh record has no lifetime left");
            return Err(RotationRejection::UnknownOrReused.into());
        }

        debug!(
            user_id = %user_id,
            token_hash = %hash_prefix(&token_hash),
            remaining_secs = remaining.num_seconds(),
            "Refresh record matched"
        );

        let pair = self.issuer.issue_until(user_id, record.expires_at).await?;

        SessionEvent::Rotated {
            user_id,
            expires_at: pair.refresh_expires_at,
        }
        .emit();

        Ok(pair)
    }
}
