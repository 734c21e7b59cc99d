//! JWT token verification.
//!
//! Signature and format are checked by `jsonwebtoken`; expiry is checked
//! afterwards against the injected [`Clock`], so the two failures stay
//! distinguishable.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use thiserror::Error;

use ticketdesk_core::clock::Clock;

use super::claims::{Claims, TokenType};

/// Why a credential failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Bad signature, malformed token, or wrong token type.
    #[error("invalid token")]
    Invalid,
    /// Signature is valid but the expiry has passed.
    #[error("token expired")]
    Expired,
}

/// Verifies JWT credentials.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Signature-only validation; expiry is checked by hand.
    validation: Validation,
    /// Source of "now" for expiry checks.
    clock: Arc<dyn Clock>,
    /// Tolerated clock skew in seconds.
    leeway_seconds: i64,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from the shared secret.
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
            leeway_seconds: i64::try_from(leeway_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Verifies signature first, then expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let claims = self.verify_signature(token)?;

        if claims.is_expired_at(self.clock.now(), self.leeway_seconds) {
            return Err(VerifyError::Expired);
        }

        Ok(claims)
    }

    /// Verifies the token and requires the given type.
    ///
    /// A token of the wrong type is `Invalid` even if it is also expired.
    pub fn verify_as(&self, token: &str, expected: TokenType) -> Result<Claims, VerifyError> {
        let claims = self.verify_signature(token)?;

        if claims.token_type != expected {
            return Err(VerifyError::Invalid);
        }

        if claims.is_expired_at(self.clock.now(), self.leeway_seconds) {
            return Err(VerifyError::Expired);
        }

        Ok(claims)
    }

    /// Checks signature and format only, ignoring expiry.
    pub fn verify_signature(&self, token: &str) -> Result<Claims, VerifyError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token signature or format rejected");
                VerifyError::Invalid
            })
    }
}
