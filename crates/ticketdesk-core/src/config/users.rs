//! Seed accounts for the in-memory identity directory.

use serde::{Deserialize, Serialize};

use crate::traits::Role;

/// An account created at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    /// Login name.
    pub username: String,
    /// Plaintext password, hashed with Argon2id on load.
    pub password: String,
    /// Name shown in the portal. Defaults to the username.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Portal role.
    #[serde(default)]
    pub role: Role,
}
