//! Identity lookup consumed from the surrounding portal.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::UserId;

/// Portal role, used downstream for authorization decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Submits and votes on tickets.
    #[default]
    Reporter,
    /// Triages and resolves tickets.
    Agent,
    /// Manages the portal.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reporter => write!(f, "reporter"),
            Self::Agent => write!(f, "agent"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// A verified identity attached to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable subject id.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Name shown in the portal.
    pub display_name: String,
    /// Portal role.
    pub role: Role,
}

/// An identity together with its stored password hash.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// The identity the credentials belong to.
    pub identity: Identity,
    /// Argon2id PHC string.
    pub password_hash: String,
}

/// Lookup of identities owned by the surrounding system.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Resolves an identity by subject id.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<Identity>>;

    /// Resolves login credentials by username.
    async fn find_credentials(&self, username: &str) -> AppResult<Option<StoredCredentials>>;
}
