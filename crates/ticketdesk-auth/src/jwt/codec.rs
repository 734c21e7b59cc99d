//! Credential codec: issuing, verifying, and hashing signed tokens.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use ticketdesk_core::clock::Clock;
use ticketdesk_core::config::AuthConfig;
use ticketdesk_core::error::AppError;
use ticketdesk_core::types::UserId;

use super::claims::{Claims, TokenType};
use super::decoder::{JwtDecoder, VerifyError};
use super::encoder::{IssuedToken, JwtEncoder};

/// Issues and verifies credentials with one shared secret, and derives the
/// salted hashes the revocation store keys on.
#[derive(Debug, Clone)]
pub struct CredentialCodec {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    hash_salt: String,
}

impl CredentialCodec {
    /// Creates a codec from auth configuration.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoder: JwtEncoder::new(secret, Arc::clone(&clock)),
            decoder: JwtDecoder::new(secret, clock, config.leeway_seconds),
            hash_salt: config.token_hash_salt.clone(),
        }
    }

    /// Mints a token expiring `ttl` from now.
    pub fn issue(
        &self,
        subject: UserId,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<IssuedToken, AppError> {
        self.encoder.issue(subject, token_type, ttl)
    }

    /// Mints a token expiring at exactly `expires_at`.
    pub fn issue_until(
        &self,
        subject: UserId,
        token_type: TokenType,
        expires_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        self.encoder.issue_until(subject, token_type, expires_at)
    }

    /// Verifies signature, then expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        self.decoder.verify(token)
    }

    /// Verifies signature, type, then expiry.
    pub fn verify_as(&self, token: &str, expected: TokenType) -> Result<Claims, VerifyError> {
        self.decoder.verify_as(token, expected)
    }

    /// Verifies signature only.
    pub fn verify_signature(&self, token: &str) -> Result<Claims, VerifyError> {
        self.decoder.verify_signature(token)
    }

    /// Salted SHA-256 of a raw token, hex encoded.
    pub fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.hash_salt.as_bytes());
        hasher.update(b":");
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
