//! In-memory identity directory.
//!
//! Stands in for the portal's user store: the session subsystem only needs
//! lookup by id and by username.

use async_trait::async_trait;
use dashmap::DashMap;

use ticketdesk_core::config::SeedUser;
use ticketdesk_core::error::AppError;
use ticketdesk_core::result::AppResult;
use ticketdesk_core::traits::{Identity, IdentityProvider, Role, StoredCredentials};
use ticketdesk_core::types::UserId;

use crate::password::PasswordHasher;

/// Identity directory backed by concurrent maps.
#[derive(Debug, Default)]
pub struct MemoryIdentityDirectory {
    by_id: DashMap<UserId, StoredCredentials>,
    by_username: DashMap<String, UserId>,
}

impl MemoryIdentityDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory populated from configuration seeds.
    pub fn from_seed(seed: &[SeedUser], hasher: &PasswordHasher) -> AppResult<Self> {
        let directory = Self::new();
        for user in seed {
            directory.register(
                &user.username,
                &user.password,
                user.display_name.as_deref(),
                user.role,
                hasher,
            )?;
        }
        tracing::info!(count = seed.len(), "Identity directory seeded");
        Ok(directory)
    }

    /// Adds an account, hashing its password. Usernames are unique.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        display_name: Option<&str>,
        role: Role,
        hasher: &PasswordHasher,
    ) -> AppResult<Identity> {
        if username.trim().is_empty() {
            return Err(AppError::validation("Username must not be empty"));
        }
        if self.by_username.contains_key(username) {
            return Err(AppError::validation(format!(
                "Username '{username}' is already registered"
            )));
        }

        let identity = Identity {
            id: UserId::new(),
            username: username.to_string(),
            display_name: display_name.unwrap_or(username).to_string(),
            role,
        };
        let password_hash = hasher.hash_password(password)?;

        self.by_username.insert(username.to_string(), identity.id);
        self.by_id.insert(
            identity.id,
            StoredCredentials {
                identity: identity.clone(),
                password_hash,
            },
        );

        Ok(identity)
    }

    /// Removes an account. Outstanding access tokens for it stop resolving.
    pub fn remove(&self, id: UserId) -> bool {
        match self.by_id.remove(&id) {
            Some((_, creds)) => {
                self.by_username.remove(&creds.identity.username);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityDirectory {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<Identity>> {
        Ok(self.by_id.get(&id).map(|c| c.identity.clone()))
    }

    async fn find_credentials(&self, username: &str) -> AppResult<Option<StoredCredentials>> {
        let Some(id) = self.by_username.get(username).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.by_id.get(&id).map(|c| c.clone()))
    }
}
