//! Revocation store configuration.

use serde::{Deserialize, Serialize};

/// Revocation store backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationConfig {
    /// Backend: `"memory"` or `"redis"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis connection URL (redis backend only).
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Key prefix for all revocation keys (redis backend only).
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Interval between background prune sweeps in seconds. `0` disables the sweeper.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "ticketdesk:".to_string()
}

fn default_sweep_interval() -> u64 {
    300
}
