use super::rows::{timestamp_to_datetime, SyncQueueRow};
use crate::application::ports::sync_queue::SyncQueue;
use crate::domain::entities::{QueueItem, QueueItemDraft};
use crate::domain::value_objects::{
    EntityKind, QueueAction, QueueItemId, QueueStatus, RemotePayload,
};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use std::collections::HashSet;
use tracing::warn;

/// SQLite-backed sync queue over the `sync_queue` table.
pub struct SqliteSyncQueue {
    pool: Pool<Sqlite>,
}

impl SqliteSyncQueue {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn row_to_item(row: SyncQueueRow) -> Result<QueueItem, String> {
        Ok(QueueItem {
            id: QueueItemId::new(row.id)?,
            action: QueueAction::parse(&row.action)?,
            entity_kind: EntityKind::parse(&row.entity)?,
            payload: RemotePayload::from_json_str(&row.data)?,
            retry_count: u32::try_from(row.retry_count.max(0)).unwrap_or(u32::MAX),
            status: QueueStatus::from(row.status.as_str()),
            created_at: timestamp_to_datetime(row.created_at),
            updated_at: timestamp_to_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl SyncQueue for SqliteSyncQueue {
    async fn enqueue(&self, draft: QueueItemDraft) -> Result<QueueItemId, AppError> {
        let id = QueueItemId::generate();
        let data = serde_json::to_string(&draft.payload.as_json())?;
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO sync_queue (id, action, entity, data, created_at, updated_at, retry_count, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5, 0, 'pending')
            "#,
        )
        .bind(id.as_str())
        .bind(draft.action.as_str())
        .bind(draft.entity_kind.as_str())
        .bind(&data)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn peek_all(&self) -> Result<Vec<QueueItem>, AppError> {
        let rows = sqlx::query_as::<_, SyncQueueRow>(
            r#"
            SELECT * FROM sync_queue
            WHERE status = 'pending'
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        // One corrupt row must never block the whole queue.
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let row_id = row.id.clone();
            match Self::row_to_item(row) {
                Ok(item) => items.push(item),
                Err(err) => {
                    warn!(queue_id = %row_id, %err, "Skipping unreadable queue row");
                }
            }
        }
        Ok(items)
    }

    async fn update_retry_count(&self, id: &QueueItemId, count: u32) -> Result<(), AppError> {
        sqlx::query("UPDATE sync_queue SET retry_count = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(i64::from(count))
            .bind(Utc::now().timestamp())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_as_failed(&self, id: &QueueItemId) -> Result<(), AppError> {
        sqlx::query("UPDATE sync_queue SET status = 'failed', updated_at = ?1 WHERE id = ?2")
            .bind(Utc::now().timestamp())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn dequeue(&self, id: &QueueItemId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sync_queue WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sync_queue")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn pending_entity_ids(&self, kind: EntityKind) -> Result<HashSet<String>, AppError> {
        let rows: Vec<(Option<String>,)> = sqlx::query_as(
            r#"
            SELECT json_extract(data, '$.id')
            FROM sync_queue
            WHERE status = 'pending' AND entity = ?1
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().flat_map(|(id,)| id).collect())
    }
}
