//! Session lifecycle: issuance at login, refresh rotation, termination, and
//! access-credential authentication.

pub mod issuer;
pub mod manager;
pub mod rotation;
pub mod terminator;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ticketdesk_core::error::AppError;
use ticketdesk_core::traits::Identity;

pub use issuer::SessionIssuer;
pub use manager::SessionManager;
pub use rotation::{RotationRejection, RotationService};
pub use terminator::SessionTerminator;

/// An access/refresh credential pair handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer credential.
    pub access_token: String,
    /// Single-use rotation credential.
    pub refresh_token: String,
    /// Expiry of the access token.
    pub access_expires_at: DateTime<Utc>,
    /// Expiry of the refresh token and of its server-side record.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Result of a successful primary login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    /// The issued pair.
    pub tokens: TokenPair,
    /// The authenticated identity.
    pub identity: Identity,
}

/// Why a protected request could not be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Valid signature, past expiry. The only recoverable case.
    ExpiredAccess,
    /// Bad signature, wrong type, malformed, or unknown subject.
    InvalidAccess,
    /// No bearer credential on the request.
    MissingToken,
}

impl AuthFailure {
    /// Message placed in the 401 body. Clients key on these strings.
    pub fn message(&self) -> &'static str {
        match self {
            Self::ExpiredAccess => "Token expired",
            Self::InvalidAccess => "Invalid token",
            Self::MissingToken => "Missing token",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        let message = failure.message();
        match failure {
            AuthFailure::ExpiredAccess => AppError::expired(message),
            AuthFailure::InvalidAccess => AppError::invalid_signature(message),
            AuthFailure::MissingToken => AppError::missing_credential(message),
        }
    }
}

/// Shortened hash for log fields.
pub(crate) fn hash_prefix(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketdesk_core::error::ErrorKind;

    #[test]
    fn test_auth_failure_maps_to_error_kind() {
        let err: AppError = AuthFailure::ExpiredAccess.into();
        assert_eq!(err.kind, ErrorKind::ExpiredCredential);
        assert_eq!(err.message, "Token expired");

        let err: AppError = AuthFailure::MissingToken.into();
        assert_eq!(err.kind, ErrorKind::MissingCredential);
    }
}
