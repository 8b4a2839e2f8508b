//! Periodic housekeeping of refresh token records
//!
//! Mirrors the two sweep passes the store needs to stay small: expired
//! records that were never revoked are marked revoked, and revoked records
//! are deleted. Runs once on demand or as a tokio background task.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::errors::StoreError;
use crate::repositories::TokenStore;

/// Configuration for the token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            enabled: true,
        }
    }
}

/// Summary of one cleanup cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    /// Expired records flipped to revoked
    pub expired_revoked: usize,
    /// Revoked records deleted
    pub revoked_deleted: usize,
}

/// Service for sweeping stale refresh token records
pub struct TokenCleanupService<S: TokenStore + 'static> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: TokenCleanupConfig,
}

impl<S: TokenStore> TokenCleanupService<S> {
    /// Create a new cleanup service
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: TokenCleanupConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Run a single cleanup cycle
    ///
    /// Expired-but-active records are revoked first so that the deletion
    /// pass picks them up on the following cycle at the latest.
    pub async fn run_cleanup(&self) -> Result<CleanupOutcome, StoreError> {
        if !self.config.enabled {
            return Ok(CleanupOutcome::default());
        }

        let expired_revoked = self.store.revoke_expired(self.clock.now()).await?;
        let revoked_deleted = self.store.delete_revoked().await?;

        info!(expired_revoked, revoked_deleted, "Token cleanup completed");

        Ok(CleanupOutcome {
            expired_revoked,
            revoked_deleted,
        })
    }

    /// Start the cleanup service as a background task
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Token cleanup service is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_cleanup().await {
                    error!(error = %e, "Token cleanup cycle failed");
                }
            }
        });
    }
}
