//! Periodic pruning of expired refresh records.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use ticketdesk_core::result::AppResult;
use ticketdesk_core::traits::RevocationStore;

/// Background task that prunes expired records from a [`RevocationStore`].
///
/// Expired records are already rejected at use time; sweeping only bounds
/// the store's growth from sessions that are abandoned without logout.
#[derive(Debug, Clone)]
pub struct RevocationSweeper {
    store: Arc<dyn RevocationStore>,
    interval: Duration,
}

impl RevocationSweeper {
    /// Creates a sweeper running every `interval`.
    pub fn new(store: Arc<dyn RevocationStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Runs a single sweep. Returns the number of records pruned.
    pub async fn run_once(&self) -> AppResult<usize> {
        let pruned = self.store.prune_all().await?;
        if pruned > 0 {
            info!(pruned = pruned, "Pruned expired refresh records");
        }
        Ok(pruned)
    }

    /// Sweeps until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Revocation sweeper started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!(error = %e, "Revocation sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Revocation sweeper stopped");
    }
}
