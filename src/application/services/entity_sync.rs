use crate::application::ports::connectivity::ConnectivityMonitor;
use crate::application::ports::local_store::LocalRepository;
use crate::application::ports::remote_store::RemoteStore;
use crate::application::ports::sync_queue::SyncQueue;
use crate::application::services::schema_drift::SchemaDriftAdapter;
use crate::domain::entities::{QueueItemDraft, SyncRecord};
use crate::domain::value_objects::{Actor, EntityId, QueueAction, RemotePayload};
use crate::shared::error::AppError;
use chrono::Utc;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, warn};

/// Generic dual-write core shared by every entity service.
///
/// Mutations write the local store synchronously (fatal on failure), then
/// attempt the remote write once; any remote failure degrades to a durable
/// queue item and the operation still succeeds. Callers cannot tell "offline"
/// from "remote down".
pub struct EntitySyncService<R: SyncRecord> {
    local: Arc<dyn LocalRepository<R>>,
    remote: Arc<dyn RemoteStore>,
    drift: Arc<SchemaDriftAdapter>,
    queue: Arc<dyn SyncQueue>,
    connectivity: Arc<dyn ConnectivityMonitor>,
}

impl<R: SyncRecord> EntitySyncService<R> {
    pub fn new(
        local: Arc<dyn LocalRepository<R>>,
        remote: Arc<dyn RemoteStore>,
        drift: Arc<SchemaDriftAdapter>,
        queue: Arc<dyn SyncQueue>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Self {
        Self {
            local,
            remote,
            drift,
            queue,
            connectivity,
        }
    }

    fn table() -> &'static str {
        R::KIND.table_name()
    }

    fn authorize(actor: &Actor, record: &R) -> Result<(), AppError> {
        if record.created_by() == actor.user_id || actor.is_elevated() {
            Ok(())
        } else {
            Err(AppError::Unauthorized(format!(
                "Actor {} may not modify {} {}",
                actor.user_id,
                R::KIND,
                record.id()
            )))
        }
    }

    /// Local write first, then best-effort remote. The record is returned as
    /// created regardless of the remote outcome.
    pub async fn add(&self, record: R) -> Result<R, AppError> {
        self.local.upsert(&record).await?;
        self.push_remote(QueueAction::Create, &record).await?;
        Ok(record)
    }

    /// Fetch-authorize-apply-persist. `apply` receives the current local
    /// record; validation errors abort before any write.
    pub async fn update_with<F>(&self, id: &EntityId, actor: &Actor, apply: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut R) -> Result<(), AppError>,
    {
        let mut record = self.require(id).await?;
        Self::authorize(actor, &record)?;
        apply(&mut record)?;
        record.touch(actor, Utc::now());
        self.local.upsert(&record).await?;
        self.push_remote(QueueAction::Update, &record).await?;
        Ok(record)
    }

    /// Point read. Online, the requested row is refreshed from the remote
    /// first; a remote-confirmed deletion removes the local copy unless a
    /// pending queue item still protects it. Soft-deleted records read as
    /// absent.
    pub async fn get(&self, id: &EntityId) -> Result<Option<R>, AppError> {
        if self.connectivity.is_online() {
            self.refresh_one(id).await?;
        }
        Ok(self
            .local
            .get(id)
            .await?
            .filter(|record| record.deleted_at().is_none()))
    }

    /// Merged read: authoritative remote state plus local-only records whose
    /// create has not yet synced.
    pub async fn list(&self) -> Result<Vec<R>, AppError> {
        self.refresh_all().await?;
        self.local.list_active().await
    }

    /// Tombstoned records, for the restore window.
    pub async fn list_deleted(&self) -> Result<Vec<R>, AppError> {
        self.refresh_all().await?;
        self.local.list_deleted().await
    }

    pub async fn soft_delete(&self, id: &EntityId, actor: &Actor) -> Result<(), AppError> {
        let mut record = self.require(id).await?;
        Self::authorize(actor, &record)?;
        if record.deleted_at().is_some() {
            return Ok(());
        }
        record.set_deleted_at(Some(Utc::now()));
        record.touch(actor, Utc::now());
        self.local.upsert(&record).await?;
        self.push_remote(QueueAction::Update, &record).await?;
        Ok(())
    }

    pub async fn restore(&self, id: &EntityId, actor: &Actor) -> Result<R, AppError> {
        let mut record = self.require(id).await?;
        Self::authorize(actor, &record)?;
        if record.deleted_at().is_none() {
            return Ok(record);
        }
        record.set_deleted_at(None);
        record.touch(actor, Utc::now());
        self.local.upsert(&record).await?;
        self.push_remote(QueueAction::Update, &record).await?;
        Ok(record)
    }

    pub async fn hard_delete(&self, id: &EntityId, actor: &Actor) -> Result<(), AppError> {
        self.load_authorized(id, actor).await?;
        self.hard_delete_unchecked(id).await
    }

    /// Fetches the local record and runs the creator-or-elevated check.
    /// Entity services use this before cascading work of their own.
    pub(crate) async fn load_authorized(&self, id: &EntityId, actor: &Actor) -> Result<R, AppError> {
        let record = self.require(id).await?;
        Self::authorize(actor, &record)?;
        Ok(record)
    }

    /// Cascade path: the owning record's authorization already happened.
    /// Local removal always precedes the remote attempt, so a crash in
    /// between leaves no dangling local row.
    pub(crate) async fn hard_delete_unchecked(&self, id: &EntityId) -> Result<(), AppError> {
        self.local.remove(id).await?;
        self.push_remote_delete(id).await;
        Ok(())
    }

    /// Records whose document field equals `value`, from the local store
    /// only. Used for dependent lookups during cascades.
    pub async fn list_local_by_field(&self, field: &str, value: &str) -> Result<Vec<R>, AppError> {
        self.local.list_by_field(field, value).await
    }

    async fn require(&self, id: &EntityId) -> Result<R, AppError> {
        self.local
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", R::KIND, id)))
    }

    /// Single attempt-then-enqueue path for creates and updates. A queue
    /// persistence failure is logged but never aborts the caller: the local
    /// write has already succeeded.
    async fn push_remote(&self, action: QueueAction, record: &R) -> Result<(), AppError> {
        let payload = record.remote_payload()?;

        if self.connectivity.is_online() {
            match self.drift.upsert(Self::table(), payload.clone()).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(
                        table = Self::table(),
                        id = %record.id(),
                        %err,
                        "Remote write failed; queueing for replay"
                    );
                }
            }
        }

        self.enqueue(QueueItemDraft::new(action, R::KIND, payload))
            .await;
        Ok(())
    }

    async fn push_remote_delete(&self, id: &EntityId) {
        if self.connectivity.is_online() {
            match self.drift.delete(Self::table(), id).await {
                Ok(()) => return,
                Err(err) => {
                    warn!(
                        table = Self::table(),
                        id = %id,
                        %err,
                        "Remote delete failed; queueing for replay"
                    );
                }
            }
        }

        match RemotePayload::new(json!({ "id": id.as_str() })) {
            Ok(payload) => {
                self.enqueue(QueueItemDraft::new(QueueAction::Delete, R::KIND, payload))
                    .await;
            }
            Err(err) => error!(table = Self::table(), %id, %err, "Could not build delete payload"),
        }
    }

    async fn enqueue(&self, draft: QueueItemDraft) {
        if let Err(err) = self.queue.enqueue(draft).await {
            // Surfacing this would fail an operation whose local write
            // already succeeded; log loudly instead.
            error!(
                table = Self::table(),
                %err,
                "Failed to persist queue item; mutation will not replay"
            );
        }
    }

    async fn refresh_one(&self, id: &EntityId) -> Result<(), AppError> {
        match self.remote.select_by_id(Self::table(), id).await {
            Ok(Some(row)) => {
                // A pending queue item means the local copy is ahead of the
                // remote row; the drain reconciles them, not the read path.
                let pending = self.queue.pending_entity_ids(R::KIND).await?;
                if pending.contains(id.as_str()) {
                    return Ok(());
                }
                match R::from_payload(&row) {
                    Ok(record) => {
                        if self.remote_is_newer(&record).await? {
                            self.local.upsert(&record).await?;
                        }
                    }
                    Err(err) => warn!(
                        table = Self::table(),
                        %id,
                        %err,
                        "Skipping unparseable remote row during refresh"
                    ),
                }
            }
            Ok(None) => {
                let pending = self.queue.pending_entity_ids(R::KIND).await?;
                if !pending.contains(id.as_str()) && self.local.get(id).await?.is_some() {
                    // Absent remotely with nothing queued: remote-confirmed
                    // deletion.
                    self.local.remove(id).await?;
                }
            }
            Err(err) => {
                warn!(table = Self::table(), %id, %err, "Remote read failed; serving local copy");
            }
        }
        Ok(())
    }

    /// A remote row replaces the local copy only when it is strictly newer.
    /// The remote copy of our own latest write can be narrower than the
    /// local one (schema drift strips columns); taking it back would erase
    /// those fields from the only store that still has them.
    async fn remote_is_newer(&self, record: &R) -> Result<bool, AppError> {
        Ok(match self.local.get(record.id()).await? {
            Some(local) => record.meta().updated_at > local.meta().updated_at,
            None => true,
        })
    }

    async fn refresh_all(&self) -> Result<(), AppError> {
        if !self.connectivity.is_online() {
            return Ok(());
        }

        let rows = match self.remote.select_all(Self::table()).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(table = Self::table(), %err, "Remote fetch failed; serving local state");
                return Ok(());
            }
        };

        let pending = self.queue.pending_entity_ids(R::KIND).await?;
        let mut remote_ids: HashSet<String> = HashSet::with_capacity(rows.len());
        for row in rows {
            match R::from_payload(&row) {
                Ok(record) => {
                    remote_ids.insert(record.id().to_string());
                    // Queued mutations mean local state is ahead of this row;
                    // stale remote versions must not clobber it, and a row
                    // whose delete is queued must not come back.
                    if pending.contains(record.id().as_str()) {
                        continue;
                    }
                    if self.remote_is_newer(&record).await? {
                        self.local.upsert(&record).await?;
                    }
                }
                Err(err) => warn!(
                    table = Self::table(),
                    %err,
                    "Skipping unparseable remote row during refresh"
                ),
            }
        }

        for id in self.local.all_ids().await? {
            if !remote_ids.contains(id.as_str()) && !pending.contains(id.as_str()) {
                self.local.remove(&id).await?;
            }
        }

        Ok(())
    }
}
