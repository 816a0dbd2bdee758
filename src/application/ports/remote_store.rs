use crate::domain::value_objects::{EntityId, RemotePayload};
use async_trait::async_trait;
use thiserror::Error;

/// Failure classes of the remote boundary. `UnknownColumn` must stay
/// distinguishable from the rest; the schema drift adapter depends on it.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("Remote schema is missing column: {0}")]
    UnknownColumn(String),
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
    #[error("Remote store rejected request: {0}")]
    Rejected(String),
}

/// Row-oriented remote API keyed by entity table name. `upsert` must be
/// idempotent on the row id so that replaying a queued mutation after a crash
/// never produces a duplicate.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn upsert(&self, table: &str, row: &RemotePayload) -> Result<(), RemoteError>;

    async fn delete(&self, table: &str, id: &EntityId) -> Result<(), RemoteError>;

    async fn select_all(&self, table: &str) -> Result<Vec<RemotePayload>, RemoteError>;

    async fn select_by_id(
        &self,
        table: &str,
        id: &EntityId,
    ) -> Result<Option<RemotePayload>, RemoteError>;
}
