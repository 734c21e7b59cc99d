//! Client error types.

use thiserror::Error;

use crate::types::{ErrorBody, TOKEN_EXPIRED};

/// Errors surfaced by [`PortalClient`](crate::PortalClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Signature, format, or type check failed on the server.
    #[error("credential rejected: {message}")]
    InvalidSignature {
        /// Server message.
        message: String,
    },
    /// The access token had expired and could not be renewed in place.
    #[error("credential expired")]
    ExpiredCredential,
    /// The refresh token was never issued, already rotated, or logged out.
    #[error("refresh credential unknown or reused")]
    UnknownOrReusedRefresh,
    /// No credential is stored or none was sent.
    #[error("no credential available")]
    MissingCredential,
    /// Username or password rejected at login.
    #[error("{message}")]
    InvalidCredentials {
        /// Server message.
        message: String,
    },
    /// Renewal failed or the server refused the session; credentials were cleared.
    #[error("session terminated: {reason}")]
    SessionTerminated {
        /// Underlying cause.
        reason: String,
    },
    /// Transport failure talking to the portal.
    #[error("network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),
    /// Non-authentication error status from the portal.
    #[error("server returned {status} {code}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error code from the body.
        code: String,
        /// Message from the body.
        message: String,
    },
    /// The base URL or a path could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// The credential file could not be read or written.
    #[error("credential storage error: {0}")]
    Storage(#[from] std::io::Error),
    /// A body could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Maps a 401 body to the matching error.
    pub fn from_unauthorized(body: ErrorBody) -> Self {
        match body.message.as_str() {
            TOKEN_EXPIRED => Self::ExpiredCredential,
            "unknown_or_reused_refresh" => Self::UnknownOrReusedRefresh,
            "Missing token" => Self::MissingCredential,
            _ if body.error == "INVALID_CREDENTIALS" => Self::InvalidCredentials {
                message: body.message,
            },
            _ => Self::InvalidSignature {
                message: body.message,
            },
        }
    }

    /// Returns `true` if the caller must log in again.
    pub fn is_session_terminated(&self) -> bool {
        matches!(self, Self::SessionTerminated { .. })
    }
}

/// Why a silent renewal failed. Cloneable so every waiter gets a copy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewalFailure {
    /// The rotation endpoint refused the refresh token.
    #[error("renewal rejected: {0}")]
    Rejected(String),
    /// The rotation request never got a usable answer.
    #[error("renewal network failure: {0}")]
    Network(String),
    /// The renewal exceeded its time budget.
    #[error("renewal timed out")]
    Timeout,
    /// The renewal task was cancelled or panicked.
    #[error("renewal cancelled")]
    Cancelled,
    /// No refresh token was stored.
    #[error("no refresh token stored")]
    NoRefreshToken,
    /// The new pair could not be stored.
    #[error("failed to store renewed credentials: {0}")]
    Storage(String),
    /// The rotation endpoint hit an infrastructure fault (5xx).
    #[error("renewal server error {status} {code}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error code from the body.
        code: String,
        /// Message from the body.
        message: String,
    },
}

impl RenewalFailure {
    /// Whether this failure ends the session. Server faults leave the
    /// credentials in place so a later call can retry.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Server { .. })
    }
}

impl From<RenewalFailure> for ClientError {
    fn from(failure: RenewalFailure) -> Self {
        match failure {
            RenewalFailure::Server {
                status,
                code,
                message,
            } => Self::Server {
                status,
                code,
                message,
            },
            other => Self::SessionTerminated {
                reason: other.to_string(),
            },
        }
    }
}
