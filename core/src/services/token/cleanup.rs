//! Periodic cleanup of expired and invalidated refresh token records
//!
//! Cleanup runs on its own interval, independent of request traffic, and
//! only ever touches rows already excluded from active use: records past
//! their expiry, and invalidated records older than the audit grace
//! period. It holds no lock that could stall rotation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::TokenRepository;

/// Configuration for the cleanup service
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// How long invalidated records are kept for audit before deletion
    /// (in days)
    pub grace_period_days: i64,
    /// Whether the background task runs at all
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            grace_period_days: 7,   // Keep invalidated records for 7 days
            enabled: true,
        }
    }
}

/// Summary of one cleanup cycle
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    /// Total records removed this cycle
    pub removed_count: usize,
    /// Records removed because they were past `expires_at`
    pub expired_count: usize,
    /// Invalidated records removed after the audit grace period
    pub invalidated_count: usize,
}

/// Service for cleaning up stale refresh token records
pub struct CleanupService<R> {
    repository: Arc<R>,
    config: CleanupConfig,
}

impl<R: TokenRepository + 'static> CleanupService<R> {
    /// Create a new cleanup service
    pub fn new(repository: Arc<R>, config: CleanupConfig) -> Self {
        Self { repository, config }
    }

    /// Run a single cleanup cycle
    ///
    /// Deletes records past their expiry, then invalidated records created
    /// before the grace-period cutoff. An active record inside its TTL is
    /// never removed, regardless of age.
    ///
    /// # Returns
    /// * `Ok(CleanupReport)` - Counts of removed records
    /// * `Err(DomainError)` - If a delete fails
    pub async fn run_cleanup(&self) -> Result<CleanupReport, DomainError> {
        let now = Utc::now();

        let expired_count = self.repository.delete_expired(now).await?;

        let cutoff = now - Duration::days(self.config.grace_period_days);
        let invalidated_count = self.repository.delete_invalidated_before(cutoff).await?;

        let report = CleanupReport {
            removed_count: expired_count + invalidated_count,
            expired_count,
            invalidated_count,
        };

        info!(
            expired = report.expired_count,
            invalidated = report.invalidated_count,
            "token cleanup cycle completed"
        );

        Ok(report)
    }

    /// Start the cleanup service as a background task
    ///
    /// Spawns a tokio task that runs [`run_cleanup`](Self::run_cleanup) on
    /// a fixed interval. The returned handle stops the task; dropping the
    /// handle stops it as well.
    pub fn start(self: Arc<Self>) -> CleanupHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            if !self.config.enabled {
                warn!("token cleanup service is disabled");
                return;
            }

            info!(
                interval_seconds = self.config.interval_seconds,
                "token cleanup service started"
            );

            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(self.config.interval_seconds));

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_cleanup().await {
                            error!("token cleanup cycle failed: {}", e);
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        info!("token cleanup service stopping");
                        break;
                    }
                }
            }
        });

        CleanupHandle {
            shutdown: shutdown_tx,
            handle,
        }
    }
}

/// Shutdown hook for the background cleanup task
pub struct CleanupHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CleanupHandle {
    /// Signal the cleanup task to stop and wait for it to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }

    /// Whether the background task has already finished
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
