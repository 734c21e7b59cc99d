//! In-process revocation store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use ticketdesk_core::clock::Clock;
use ticketdesk_core::result::AppResult;
use ticketdesk_core::traits::{RefreshRecord, RevocationStore};
use ticketdesk_core::types::UserId;

/// Revocation store keeping every identity's records in a [`DashMap`] shard.
///
/// Each identity's record list is mutated under its shard lock, which is what
/// makes [`take_valid`](RevocationStore::take_valid) a compare-and-delete.
#[derive(Debug)]
pub struct MemoryRevocationStore {
    records: DashMap<UserId, Vec<RefreshRecord>>,
    clock: Arc<dyn Clock>,
}

impl MemoryRevocationStore {
    /// Creates an empty store.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }

    /// Removes the identity's entry if its record list has become empty.
    fn drop_if_empty(&self, user_id: UserId) {
        self.records.remove_if(&user_id, |_, list| list.is_empty());
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn put(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.records
            .entry(user_id)
            .or_default()
            .push(RefreshRecord::new(token_hash, expires_at));
        Ok(())
    }

    async fn find_valid(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> AppResult<Option<RefreshRecord>> {
        let now = self.clock.now();
        Ok(self.records.get(&user_id).and_then(|list| {
            list.iter()
                .find(|r| r.token_hash == token_hash && r.is_live_at(now))
                .cloned()
        }))
    }

    async fn remove(&self, user_id: UserId, token_hash: &str) -> AppResult<bool> {
        let removed = match self.records.get_mut(&user_id) {
            Some(mut list) => {
                let before = list.len();
                list.retain(|r| r.token_hash != token_hash);
                list.len() < before
            }
            None => false,
        };
        self.drop_if_empty(user_id);
        Ok(removed)
    }

    async fn take_valid(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> AppResult<Option<RefreshRecord>> {
        let now = self.clock.now();
        let taken = match self.records.get_mut(&user_id) {
            Some(mut list) => list
                .iter()
                .position(|r| r.token_hash == token_hash)
                .map(|idx| list.swap_remove(idx)),
            None => None,
        };
        self.drop_if_empty(user_id);

        match taken {
            Some(record) if record.is_live_at(now) => Ok(Some(record)),
            Some(_) => {
                debug!(user_id = %user_id, "Discarded expired refresh record on use");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn prune_expired(&self, user_id: UserId) -> AppResult<usize> {
        let now = self.clock.now();
        let pruned = match self.records.get_mut(&user_id) {
            Some(mut list) => {
                let before = list.len();
                list.retain(|r| r.is_live_at(now));
                before - list.len()
            }
            None => 0,
        };
        self.drop_if_empty(user_id);
        Ok(pruned)
    }

    async fn prune_all(&self) -> AppResult<usize> {
        let now = self.clock.now();
        let mut pruned = 0;
        self.records.retain(|_, list| {
            let before = list.len();
            list.retain(|r| r.is_live_at(now));
            pruned += before - list.len();
            !list.is_empty()
        });
        Ok(pruned)
    }

    async fn count(&self, user_id: UserId) -> AppResult<usize> {
        Ok(self.records.get(&user_id).map_or(0, |list| list.len()))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
