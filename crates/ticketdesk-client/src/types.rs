//! Wire types exchanged with the portal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token pair returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration.
    pub refresh_expires_at: DateTime<Utc>,
}

/// The authenticated user as the portal reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Opaque user id.
    pub id: String,
    /// Username.
    pub username: String,
    /// Display name.
    pub display_name: String,
    /// Role.
    pub role: String,
}

/// Login response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Issued credentials.
    #[serde(flatten)]
    pub tokens: TokenResponse,
    /// Authenticated user.
    pub user: UserInfo,
}

/// Error body the portal returns on failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable code.
    #[serde(default)]
    pub error: String,
    /// Message the client keys on.
    #[serde(default)]
    pub message: String,
}

/// Message the server uses for an expired access token.
pub const TOKEN_EXPIRED: &str = "Token expired";
