//! JWT token creation with HMAC signing.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use ticketdesk_core::clock::Clock;
use ticketdesk_core::error::AppError;
use ticketdesk_core::types::{TokenId, UserId};

use super::claims::{Claims, TokenType};

/// A freshly minted, signed credential.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS string.
    pub token: String,
    /// Expiry encoded in the token, truncated to whole seconds.
    pub expires_at: DateTime<Utc>,
}

/// Creates signed JWT credentials.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Source of `iat`.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder").finish_non_exhaustive()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from the shared secret.
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            clock,
        }
    }

    /// Mints a token for `subject` expiring `ttl` from now.
    pub fn issue(
        &self,
        subject: UserId,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<IssuedToken, AppError> {
        let expires_at = self.clock.now() + ttl;
        self.issue_until(subject, token_type, expires_at)
    }

    /// Mints a token for `subject` expiring at exactly `expires_at`.
    pub fn issue_until(
        &self,
        subject: UserId,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let claims = Claims {
            sub: subject,
            iat: self.clock.now().timestamp(),
            exp: expires_at.timestamp(),
            jti: TokenId::new(),
            token_type,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::internal(format!("Failed to encode {token_type} token: {e}"))
        })?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }
}
