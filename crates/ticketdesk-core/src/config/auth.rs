//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Credential signing and lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in hours when "remember me" is off.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_hours: u64,
    /// Refresh token TTL in days when "remember me" is on.
    #[serde(default = "default_remember_ttl")]
    pub remember_ttl_days: u64,
    /// Server-wide salt mixed into refresh token hashes.
    #[serde(default = "default_hash_salt")]
    pub token_hash_salt: String,
    /// Clock skew tolerated on expiry checks, in seconds.
    #[serde(default)]
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_hours: default_refresh_ttl(),
            remember_ttl_days: default_remember_ttl(),
            token_hash_salt: default_hash_salt(),
            leeway_seconds: 0,
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    60
}

fn default_refresh_ttl() -> u64 {
    24
}

fn default_remember_ttl() -> u64 {
    7
}

fn default_hash_salt() -> String {
    "ticketdesk-refresh".to_string()
}
