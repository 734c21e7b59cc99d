//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for a [`PortalClient`](crate::PortalClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Portal base URL, e.g. `http://localhost:8080`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Upper bound on one silent renewal, in seconds.
    #[serde(default = "default_renewal_timeout")]
    pub renewal_timeout_seconds: u64,
    /// Where remembered refresh tokens are persisted. `None` disables the
    /// persistent scope and "remember" degrades to the in-memory scope.
    #[serde(default)]
    pub credential_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
            renewal_timeout_seconds: default_renewal_timeout(),
            credential_file: None,
        }
    }
}

impl ClientConfig {
    /// Config pointed at `base_url` with default timeouts and no credential file.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the persistent credential file.
    pub fn with_credential_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_file = Some(path.into());
        self
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Renewal timeout as a [`Duration`].
    pub fn renewal_timeout(&self) -> Duration {
        Duration::from_secs(self.renewal_timeout_seconds)
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_renewal_timeout() -> u64 {
    10
}
