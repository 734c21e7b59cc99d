//! Session notifications broadcast by the client.

use chrono::{DateTime, Utc};

/// Emitted on the client's broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A silent renewal stored a new pair.
    Renewed {
        /// Expiry of the new access token.
        access_expires_at: DateTime<Utc>,
    },
    /// Stored credentials were discarded; the user must log in again.
    Terminated {
        /// Why the session ended.
        reason: String,
    },
}
