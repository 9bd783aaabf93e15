use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::config::CollectorConfig;
use crate::db::HistoryStore;
use crate::external::LiveDataProvider;
use crate::services::ingest;

/// Sleeping goes through this seam so retry timing is testable without real
/// waits.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Background collection loop: one cycle immediately on start, then one per
/// configured interval, until the shutdown channel flips. Cancellation is
/// cooperative; an in-flight fetch finishes but is not retried afterwards.
pub struct PeriodicCollector {
    store: Arc<dyn HistoryStore>,
    provider: Arc<dyn LiveDataProvider>,
    config: CollectorConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl PeriodicCollector {
    pub fn new(
        store: Arc<dyn HistoryStore>,
        provider: Arc<dyn LiveDataProvider>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Collector started: {} parks every {:?}",
            self.config.park_ids.len(),
            self.config.interval
        );

        loop {
            tokio::select! {
                // First tick fires immediately.
                _ = ticker.tick() => {
                    self.run_cycle(&shutdown).await;
                }
                _ = shutdown.changed() => {
                    info!("Collector stopped");
                    return;
                }
            }
        }
    }

    /// One collection cycle with bounded retry. A retried cycle re-collects
    /// every park; the dedup rule makes re-collecting already-stored parks a
    /// no-op, so only the failed ones produce new rows.
    async fn run_cycle(&self, shutdown: &watch::Receiver<bool>) {
        let retry = self.config.retry;

        for attempt in 1..=retry.max_attempts {
            let report = ingest::collect_parks(
                self.store.as_ref(),
                self.provider.as_ref(),
                &self.config.park_ids,
            )
            .await;

            if report.success() {
                info!(
                    "Collection cycle done: {} inserted, {} skipped",
                    report.inserted, report.skipped
                );
                self.cleanup().await;
                return;
            }

            if *shutdown.borrow() {
                info!("Shutdown observed mid-cycle, not retrying");
                return;
            }

            if attempt < retry.max_attempts {
                warn!(
                    "Attempt {}/{} had {} park failures ({}), retrying in {:?}",
                    attempt,
                    retry.max_attempts,
                    report.error_count,
                    report.last_error.as_deref().unwrap_or("unknown"),
                    retry.delay
                );
                self.sleeper.sleep(retry.delay).await;
                // The delay is long; the flag may have flipped while we slept.
                if *shutdown.borrow() {
                    info!("Shutdown observed during retry delay, not retrying");
                    return;
                }
            } else {
                error!(
                    "Giving up after {} attempts ({})",
                    retry.max_attempts,
                    report.last_error.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    async fn cleanup(&self) {
        let Some(max_age) = self.config.max_record_age else {
            return;
        };
        let cutoff = Utc::now()
            - chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::hours(24));
        match self.store.delete_older_than(cutoff).await {
            Ok(0) => {}
            Ok(n) => info!("Swept {} history rows older than {:?}", n, max_age),
            Err(e) => warn!("Cleanup sweep failed: {}", e),
        }
    }
}
