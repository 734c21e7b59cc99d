//! Revocation store backends and the background sweeper.
//!
//! The backend is selected at runtime from `revocation.provider`:
//!
//! - **memory**: per-process map, lost on restart
//! - **redis**: shared store behind the `redis-store` feature

pub mod memory;
#[cfg(feature = "redis-store")]
pub mod redis;
pub mod sweeper;

use std::sync::Arc;

use tracing::info;

use ticketdesk_core::clock::Clock;
use ticketdesk_core::config::RevocationConfig;
use ticketdesk_core::error::AppError;
use ticketdesk_core::result::AppResult;
use ticketdesk_core::traits::RevocationStore;

pub use memory::MemoryRevocationStore;
pub use sweeper::RevocationSweeper;

/// Builds the configured revocation store.
pub async fn build_store(
    config: &RevocationConfig,
    clock: Arc<dyn Clock>,
) -> AppResult<Arc<dyn RevocationStore>> {
    let store: Arc<dyn RevocationStore> = match config.provider.as_str() {
        "memory" => {
            info!("Initializing in-memory revocation store");
            Arc::new(MemoryRevocationStore::new(clock))
        }
        #[cfg(feature = "redis-store")]
        "redis" => {
            info!("Initializing Redis revocation store");
            Arc::new(redis::RedisRevocationStore::connect(config, clock).await?)
        }
        other => {
            return Err(AppError::configuration(format!(
                "Unknown revocation provider: '{other}'. Supported: memory, redis"
            )));
        }
    };

    Ok(store)
}
