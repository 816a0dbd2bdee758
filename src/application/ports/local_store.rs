use crate::domain::entities::SyncRecord;
use crate::domain::value_objects::EntityId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// CRUD over the local working copy of one entity kind. The engine depends
/// only on this contract, not on any specific storage engine.
#[async_trait]
pub trait LocalRepository<R: SyncRecord>: Send + Sync {
    async fn upsert(&self, record: &R) -> Result<(), AppError>;

    async fn get(&self, id: &EntityId) -> Result<Option<R>, AppError>;

    /// Records without a tombstone.
    async fn list_active(&self) -> Result<Vec<R>, AppError>;

    /// Tombstoned records only, for the restore window.
    async fn list_deleted(&self) -> Result<Vec<R>, AppError>;

    async fn list_all(&self) -> Result<Vec<R>, AppError>;

    /// Records whose serialized document has `field` equal to `value`;
    /// used for dependent lookups such as tasks of a booking.
    async fn list_by_field(&self, field: &str, value: &str) -> Result<Vec<R>, AppError>;

    async fn remove(&self, id: &EntityId) -> Result<(), AppError>;

    async fn all_ids(&self) -> Result<Vec<EntityId>, AppError>;
}
