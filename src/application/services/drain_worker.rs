use crate::application::ports::connectivity::ConnectivityMonitor;
use crate::application::ports::remote_store::{RemoteError, RemoteStore};
use crate::application::ports::sync_queue::SyncQueue;
use crate::application::services::schema_drift::SchemaDriftAdapter;
use crate::domain::entities::QueueItem;
use crate::domain::value_objects::{EntityId, EntityKind, QueueAction};
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct DrainConfig {
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
    pub request_timeout: Duration,
    pub interval: Duration,
}

impl DrainConfig {
    pub fn from_sync_config(sync: &SyncConfig, request_timeout_secs: u64) -> Self {
        Self {
            max_retries: sync.max_retries,
            backoff_base: Duration::from_secs(sync.backoff_base_secs),
            backoff_cap: Duration::from_secs(sync.backoff_cap_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
            interval: Duration::from_secs(sync.sync_interval),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub applied: u32,
    pub deferred: u32,
    pub retried: u32,
    pub quarantined: u32,
}

/// Replays queued mutations once connectivity is available. A single pass
/// walks the queue oldest-first; a failure blocks every later item for the
/// same record (strict per-entity order) but never items for other records.
pub struct QueueDrainWorker {
    queue: Arc<dyn SyncQueue>,
    remote: Arc<dyn RemoteStore>,
    drift: Arc<SchemaDriftAdapter>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    config: DrainConfig,
    draining: AtomicBool,
}

impl QueueDrainWorker {
    pub fn new(
        queue: Arc<dyn SyncQueue>,
        remote: Arc<dyn RemoteStore>,
        drift: Arc<SchemaDriftAdapter>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        config: DrainConfig,
    ) -> Self {
        Self {
            queue,
            remote,
            drift,
            connectivity,
            config,
            draining: AtomicBool::new(false),
        }
    }

    /// Runs one drain pass. No-ops while offline, and while another pass is
    /// active: two workers must never race to replay the same item.
    pub async fn drain_once(&self) -> Result<DrainReport, AppError> {
        if !self.connectivity.is_online() {
            return Ok(DrainReport::default());
        }
        if self.draining.swap(true, Ordering::SeqCst) {
            debug!("Drain pass already running; skipping");
            return Ok(DrainReport::default());
        }

        let result = self.drain_pass().await;
        self.draining.store(false, Ordering::SeqCst);
        result
    }

    async fn drain_pass(&self) -> Result<DrainReport, AppError> {
        let items = self.queue.peek_all().await?;
        if items.is_empty() {
            return Ok(DrainReport::default());
        }

        let now = Utc::now();
        let mut report = DrainReport::default();
        let mut blocked: HashSet<(EntityKind, String)> = HashSet::new();

        for item in items {
            let key = item.ordering_key();

            if let Some(key) = &key {
                if blocked.contains(key) {
                    // An older mutation for this record has not been applied
                    // yet; applying this one would reorder them.
                    report.deferred += 1;
                    continue;
                }
            }

            if !self.is_due(&item, now) {
                if let Some(key) = key {
                    blocked.insert(key);
                }
                report.deferred += 1;
                continue;
            }

            let outcome = timeout(self.config.request_timeout, self.apply(&item)).await;
            match outcome {
                Ok(Ok(())) => {
                    self.queue.dequeue(&item.id).await?;
                    report.applied += 1;
                }
                Ok(Err(err)) => {
                    self.note_failure(&item, &err.to_string(), &mut report).await?;
                    if let Some(key) = key {
                        blocked.insert(key);
                    }
                }
                Err(_) => {
                    self.note_failure(&item, "remote call timed out", &mut report)
                        .await?;
                    if let Some(key) = key {
                        blocked.insert(key);
                    }
                }
            }
        }

        if report != DrainReport::default() {
            info!(
                applied = report.applied,
                deferred = report.deferred,
                retried = report.retried,
                quarantined = report.quarantined,
                "Drain pass finished"
            );
        }
        Ok(report)
    }

    async fn apply(&self, item: &QueueItem) -> Result<(), RemoteError> {
        let table = item.entity_kind.table_name();
        match item.action {
            // Creates and updates are the same idempotent upsert keyed on the
            // client-generated id, so replaying after a crash between remote
            // success and dequeue cannot duplicate a row.
            QueueAction::Create | QueueAction::Update => {
                self.drift.upsert(table, item.payload.clone()).await
            }
            QueueAction::Delete => {
                let id = item
                    .entity_id()
                    .ok_or_else(|| RemoteError::Rejected("delete payload missing id".into()))?;
                let id = EntityId::new(id.to_string())
                    .map_err(RemoteError::Rejected)?;
                self.remote.delete(table, &id).await
            }
        }
    }

    async fn note_failure(
        &self,
        item: &QueueItem,
        reason: &str,
        report: &mut DrainReport,
    ) -> Result<(), AppError> {
        let attempts = item.retry_count + 1;
        if attempts >= self.config.max_retries {
            error!(
                queue_id = %item.id,
                entity = %item.entity_kind,
                attempts,
                reason,
                "Queue item exhausted its retries and was quarantined"
            );
            self.queue.mark_as_failed(&item.id).await?;
            report.quarantined += 1;
        } else {
            warn!(
                queue_id = %item.id,
                entity = %item.entity_kind,
                attempts,
                reason,
                "Queue item replay failed; will retry"
            );
            self.queue.update_retry_count(&item.id, attempts).await?;
            report.retried += 1;
        }
        Ok(())
    }

    /// Exponential backoff with a small jitter, computed from the last
    /// attempt time so the queue table itself carries the schedule.
    fn is_due(&self, item: &QueueItem, now: DateTime<Utc>) -> bool {
        if item.retry_count == 0 {
            return true;
        }
        let exp = item.retry_count.saturating_sub(1).min(16);
        let delay = self
            .config
            .backoff_base
            .saturating_mul(1u32 << exp)
            .min(self.config.backoff_cap);
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..250));
        match chrono::Duration::from_std(delay + jitter) {
            Ok(delay) => item.updated_at + delay <= now,
            Err(_) => true,
        }
    }

    /// Background loop: drains on a timer while online and immediately on the
    /// offline-to-online transition.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let mut online_rx = self.connectivity.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = online_rx.changed() => {
                        if changed.is_err() {
                            // Connectivity source dropped; stop the loop.
                            break;
                        }
                        if !*online_rx.borrow() {
                            continue;
                        }
                        info!("Connectivity restored; draining sync queue");
                    }
                }

                if let Err(err) = self.drain_once().await {
                    error!(%err, "Drain pass failed");
                }
            }
        })
    }
}
