//! Session-related domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Events related to refresh-credential sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A user logged in and a refresh record was created.
    Created {
        /// The user ID.
        user_id: UserId,
        /// Whether the long "remember" window was chosen.
        remember: bool,
        /// Expiry of the new refresh record.
        expires_at: DateTime<Utc>,
    },
    /// A refresh credential was rotated into a new pair.
    Rotated {
        /// The user ID.
        user_id: UserId,
        /// Expiry carried over to the new record.
        expires_at: DateTime<Utc>,
    },
    /// A refresh record was removed on logout.
    Destroyed {
        /// The user ID.
        user_id: UserId,
        /// Whether a record was actually removed.
        removed: bool,
    },
    /// A refresh credential with no live record was presented.
    ReplayRejected {
        /// The user ID claimed by the token.
        user_id: UserId,
    },
}

impl SessionEvent {
    /// Records the event.
    pub fn emit(&self) {
        match self {
            Self::Created {
                user_id,
                remember,
                expires_at,
            } => tracing::info!(
                target: "ticketdesk::session",
                user_id = %user_id,
                remember = remember,
                expires_at = %expires_at,
                "Session created"
            ),
            Self::Rotated {
                user_id,
                expires_at,
            } => tracing::info!(
                target: "ticketdesk::session",
                user_id = %user_id,
                expires_at = %expires_at,
                "Refresh credential rotated"
            ),
            Self::Destroyed { user_id, removed } => tracing::info!(
                target: "ticketdesk::session",
                user_id = %user_id,
                removed = removed,
                "Session destroyed"
            ),
            Self::ReplayRejected { user_id } => tracing::warn!(
                target: "ticketdesk::session",
                user_id = %user_id,
                "Unknown or reused refresh credential presented"
            ),
        }
    }
}
