//! Refresh Scheduler
//!
//! Drives the two ingestion cadences: a cheap version probe and a full
//! dataset refresh. Both fire once immediately at startup. Refresh passes
//! never overlap; a busy gate means the cycle is skipped, not queued. A
//! failed pass leaves the previous generation serving and the
//! refresh-needed flag set, so the next cycle retries.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::builder::build_generation;
use crate::config::EndpointsConfig;
use crate::fetch::{fetch_endpoint_sets, PublicationSource};
use crate::store::DatasetStore;
use crate::version::VersionTracker;
use crate::Result;

/// Periodic version probe and dataset refresh
pub struct RefreshScheduler {
    source: Arc<dyn PublicationSource>,
    tracker: VersionTracker,
    store: Arc<DatasetStore>,

    version_check_interval: Duration,
    refresh_interval: Duration,

    /// Sticky until a refresh succeeds end to end
    refresh_needed: AtomicBool,
    /// Held for the duration of one refresh pass
    refresh_gate: tokio::sync::Mutex<()>,

    // Metrics
    version_checks: AtomicU64,
    refreshes: AtomicU64,
    failures: AtomicU64,
}

impl RefreshScheduler {
    /// Create a scheduler; the first refresh cycle always loads
    pub fn new(
        source: Arc<dyn PublicationSource>,
        store: Arc<DatasetStore>,
        config: &EndpointsConfig,
    ) -> Self {
        Self {
            source,
            tracker: VersionTracker::new(),
            store,
            version_check_interval: config.version_check_interval(),
            refresh_interval: config.refresh_interval(),
            refresh_needed: AtomicBool::new(true),
            refresh_gate: tokio::sync::Mutex::new(()),
            version_checks: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Start both background loops
    ///
    /// Interval timers tick immediately, so the version probe and the
    /// first refresh run at startup rather than one period later.
    pub fn spawn(self: Arc<Self>) -> (JoinHandle<()>, JoinHandle<()>) {
        let version_handle = tokio::spawn({
            let scheduler = Arc::clone(&self);
            async move {
                let mut ticker = interval(scheduler.version_check_interval);
                loop {
                    ticker.tick().await;
                    scheduler.run_version_check().await;
                }
            }
        });

        let refresh_handle = tokio::spawn(async move {
            let mut ticker = interval(self.refresh_interval);
            loop {
                ticker.tick().await;
                self.run_refresh_cycle().await;
            }
        });

        (version_handle, refresh_handle)
    }

    /// One version-probe tick
    pub async fn run_version_check(&self) {
        self.version_checks.fetch_add(1, Ordering::Relaxed);

        if self.tracker.check(self.source.as_ref()).await {
            let version = self.tracker.last_seen().unwrap_or_default();
            tracing::info!(version = %version, "Publication version changed, refresh scheduled");
            self.refresh_needed.store(true, Ordering::Release);
        }
    }

    /// One refresh tick
    ///
    /// Skips when another pass holds the gate, and when the dataset is
    /// already current.
    pub async fn run_refresh_cycle(&self) {
        let _gate = match self.refresh_gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!("Refresh already in progress, skipping cycle");
                return;
            }
        };

        if !self.refresh_needed.load(Ordering::Acquire) && self.store.has_committed() {
            let stats = self.store.read().stats();
            tracing::debug!(
                records = stats.records,
                areas = stats.areas,
                "Dataset current, refresh not needed"
            );
            return;
        }

        if let Err(e) = self.refresh().await {
            self.failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, "Refresh failed, keeping previous generation");
        }
    }

    /// Fetch, build and publish one generation
    async fn refresh(&self) -> Result<()> {
        // Stamp generations with a version even when the probe loop has
        // not run yet; a failed probe here leaves the stamp empty and the
        // next successful probe corrects it.
        if self.tracker.last_seen().is_none() {
            self.tracker.check(self.source.as_ref()).await;
        }

        let sets = fetch_endpoint_sets(self.source.as_ref()).await?;
        let version = self.tracker.last_seen().unwrap_or_default();
        let generation = build_generation(&version, Utc::now(), sets)?;
        let stats = generation.stats();

        self.store.swap(generation);
        self.refresh_needed.store(false, Ordering::Release);
        self.refreshes.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            version = %version,
            records = stats.records,
            areas = stats.areas,
            host_patterns = stats.host_patterns,
            ip_networks = stats.ip_networks,
            "Published new dataset generation"
        );
        Ok(())
    }

    /// True when the next cycle will refresh
    pub fn refresh_needed(&self) -> bool {
        self.refresh_needed.load(Ordering::Acquire)
    }

    /// Get scheduler statistics
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            version_checks: self.version_checks.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            refresh_needed: self.refresh_needed(),
            generations_published: self.store.swap_count(),
        }
    }
}

/// Scheduler statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchedulerStats {
    pub version_checks: u64,
    pub refreshes: u64,
    pub failures: u64,
    pub refresh_needed: bool,
    pub generations_published: u64,
}
