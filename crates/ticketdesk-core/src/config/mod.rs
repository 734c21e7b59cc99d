//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default, so an absent file yields a
//! working development configuration.

pub mod app;
pub mod auth;
pub mod logging;
pub mod revocation;
pub mod users;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::logging::LoggingConfig;
pub use self::revocation::RevocationConfig;
pub use self::users::SeedUser;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Credential signing and lifetime settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Revocation store settings.
    #[serde(default)]
    pub revocation: RevocationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Accounts seeded into the in-memory identity directory.
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with `config/{env}.toml` and environment
    /// variables prefixed with `TICKETDESK__` (nested keys separated by `__`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Like [`load`](Self::load) but reads the TOML files from `dir`.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TICKETDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Rejects configurations that cannot produce a working server.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.len() < 16 {
            return Err(AppError::configuration(
                "auth.jwt_secret must be at least 16 bytes",
            ));
        }
        if self.auth.access_ttl_minutes == 0 {
            return Err(AppError::configuration(
                "auth.access_ttl_minutes must be greater than zero",
            ));
        }
        if self.auth.refresh_ttl_hours == 0 || self.auth.remember_ttl_days == 0 {
            return Err(AppError::configuration(
                "refresh credential lifetimes must be greater than zero",
            ));
        }
        Ok(())
    }
}
