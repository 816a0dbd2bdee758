use crate::domain::entities::{QueueItem, QueueItemDraft};
use crate::domain::value_objects::{EntityKind, QueueItemId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::HashSet;

/// Durable, ordered log of mutations not yet confirmed against the remote
/// store. Implementations must survive process restart.
#[async_trait]
pub trait SyncQueue: Send + Sync {
    async fn enqueue(&self, draft: QueueItemDraft) -> Result<QueueItemId, AppError>;

    /// Pending items, oldest first. Rows whose payload or kind cannot be
    /// parsed are skipped and logged rather than failing the whole read.
    async fn peek_all(&self) -> Result<Vec<QueueItem>, AppError>;

    async fn update_retry_count(&self, id: &QueueItemId, count: u32) -> Result<(), AppError>;

    /// Quarantines an item after replay exhaustion. Failed items stay in the
    /// table for manual inspection but leave the drain worker's working set.
    async fn mark_as_failed(&self, id: &QueueItemId) -> Result<(), AppError>;

    async fn dequeue(&self, id: &QueueItemId) -> Result<(), AppError>;

    /// Administrative full reset; never used during normal operation.
    async fn clear(&self) -> Result<(), AppError>;

    /// Record ids referenced by pending items of the given kind. The read-side
    /// merge uses this to keep local-only records out of the prune set.
    async fn pending_entity_ids(&self, kind: EntityKind) -> Result<HashSet<String>, AppError>;
}
