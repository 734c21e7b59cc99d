//! Revocation store trait for outstanding refresh credentials.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::UserId;

/// Server-side record of one outstanding refresh credential.
///
/// `expires_at` is stamped by the issuer from the credential it hashes and
/// is the only expiry the store trusts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRecord {
    /// Salted SHA-256 of the raw refresh token, hex encoded.
    pub token_hash: String,
    /// Expiry instant copied from the credential at issuance.
    pub expires_at: DateTime<Utc>,
}

impl RefreshRecord {
    /// Creates a new record.
    pub fn new(token_hash: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token_hash: token_hash.into(),
            expires_at,
        }
    }

    /// Returns `true` while the record's stored expiry is in the future.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Per-identity collection of [`RefreshRecord`]s.
///
/// Implementations must make [`take_valid`](Self::take_valid) a
/// compare-and-delete: among concurrent callers presenting the same hash at
/// most one receives the record.
#[async_trait]
pub trait RevocationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Inserts a record for `user_id`.
    async fn put(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Returns the record only if present and its stored expiry is in the future.
    async fn find_valid(&self, user_id: UserId, token_hash: &str)
    -> AppResult<Option<RefreshRecord>>;

    /// Deletes one record. Returns `true` if a record was removed.
    async fn remove(&self, user_id: UserId, token_hash: &str) -> AppResult<bool>;

    /// Atomically removes and returns the record if present and unexpired.
    ///
    /// An expired record that is found is removed as well, but `None` is
    /// returned.
    async fn take_valid(&self, user_id: UserId, token_hash: &str)
    -> AppResult<Option<RefreshRecord>>;

    /// Drops every record of `user_id` whose stored expiry has passed.
    async fn prune_expired(&self, user_id: UserId) -> AppResult<usize>;

    /// Drops expired records across all identities.
    async fn prune_all(&self) -> AppResult<usize>;

    /// Number of records currently held for `user_id`, expired or not.
    async fn count(&self, user_id: UserId) -> AppResult<usize>;

    /// Check that the store backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_record_liveness_uses_stored_expiry() {
        let now = Utc::now();
        let record = RefreshRecord::new("abc", now + Duration::seconds(10));
        assert!(record.is_live_at(now));
        assert!(!record.is_live_at(now + Duration::seconds(10)));
    }
}
