use super::rows::EntityRow;
use crate::application::ports::local_store::LocalRepository;
use crate::domain::entities::SyncRecord;
use crate::domain::value_objects::EntityId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};
use std::marker::PhantomData;
use tracing::warn;

/// Generic SQLite store for one entity table. The full record lives in the
/// serialized `data` document; the meta columns exist for filtering so the
/// engine never needs to know entity-specific fields.
pub struct SqliteEntityStore<R: SyncRecord> {
    pool: Pool<Sqlite>,
    _record: PhantomData<R>,
}

impl<R: SyncRecord> SqliteEntityStore<R> {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    fn table() -> &'static str {
        R::KIND.table_name()
    }

    fn parse(row: EntityRow) -> Result<R, AppError> {
        serde_json::from_str(&row.data)
            .map_err(|e| AppError::DeserializationError(format!("{}: {e}", row.id)))
    }

    fn parse_all(rows: Vec<EntityRow>) -> Vec<R> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let row_id = row.id.clone();
            match Self::parse(row) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(table = Self::table(), id = %row_id, %err, "Skipping unreadable row");
                }
            }
        }
        records
    }

    async fn fetch_where(&self, clause: &str) -> Result<Vec<R>, AppError> {
        let sql = format!("SELECT * FROM {} {} ORDER BY created_at ASC", Self::table(), clause);
        let rows = sqlx::query_as::<_, EntityRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(Self::parse_all(rows))
    }

    /// Field names reach the SQL text, so only plain identifiers pass.
    fn validate_field(field: &str) -> Result<(), AppError> {
        let valid = !field.is_empty()
            && field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(AppError::ValidationError(format!(
                "Invalid field name: {field}"
            )))
        }
    }
}

#[async_trait]
impl<R: SyncRecord> LocalRepository<R> for SqliteEntityStore<R> {
    async fn upsert(&self, record: &R) -> Result<(), AppError> {
        let data = serde_json::to_string(record)?;
        let meta = record.meta();
        let sql = format!(
            r#"
            INSERT INTO {} (id, data, created_by, created_at, updated_at, deleted_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                data = excluded.data,
                created_by = excluded.created_by,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                deleted_at = excluded.deleted_at
            "#,
            Self::table()
        );

        sqlx::query(&sql)
            .bind(meta.id.as_str())
            .bind(&data)
            .bind(&meta.created_by)
            .bind(meta.created_at.timestamp())
            .bind(meta.updated_at.timestamp())
            .bind(meta.deleted_at.map(|at| at.timestamp()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, id: &EntityId) -> Result<Option<R>, AppError> {
        let sql = format!("SELECT * FROM {} WHERE id = ?1", Self::table());
        let row = sqlx::query_as::<_, EntityRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::parse).transpose()
    }

    async fn list_active(&self) -> Result<Vec<R>, AppError> {
        self.fetch_where("WHERE deleted_at IS NULL").await
    }

    async fn list_deleted(&self) -> Result<Vec<R>, AppError> {
        self.fetch_where("WHERE deleted_at IS NOT NULL").await
    }

    async fn list_all(&self) -> Result<Vec<R>, AppError> {
        self.fetch_where("").await
    }

    async fn list_by_field(&self, field: &str, value: &str) -> Result<Vec<R>, AppError> {
        Self::validate_field(field)?;
        let sql = format!(
            "SELECT * FROM {} WHERE json_extract(data, '$.{}') = ?1 ORDER BY created_at ASC",
            Self::table(),
            field
        );
        let rows = sqlx::query_as::<_, EntityRow>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        Ok(Self::parse_all(rows))
    }

    async fn remove(&self, id: &EntityId) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", Self::table());
        sqlx::query(&sql)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn all_ids(&self) -> Result<Vec<EntityId>, AppError> {
        let sql = format!("SELECT id FROM {}", Self::table());
        let rows: Vec<(String,)> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|(id,)| EntityId::new(id).map_err(AppError::ValidationError))
            .collect()
    }
}
