use crate::domain::value_objects::{Actor, EntityId, EntityKind, RemotePayload};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Meta fields shared by every synced record. Serialized flattened into the
/// record document, so the remote row carries them as ordinary columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    pub id: EntityId,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RecordMeta {
    pub fn new(actor: &Actor, now: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::generate(),
            created_by: actor.user_id.clone(),
            updated_by: actor.user_id.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// A record the sync engine can dual-write. The serialized form of the record
/// is exactly the remote row shape, so payload round-trips are lossless.
pub trait SyncRecord:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    const KIND: EntityKind;

    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn id(&self) -> &EntityId {
        &self.meta().id
    }

    fn created_by(&self) -> &str {
        &self.meta().created_by
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.meta().deleted_at
    }

    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>) {
        self.meta_mut().deleted_at = at;
    }

    fn touch(&mut self, actor: &Actor, at: DateTime<Utc>) {
        let meta = self.meta_mut();
        meta.updated_by = actor.user_id.clone();
        meta.updated_at = at;
    }

    fn remote_payload(&self) -> Result<RemotePayload, AppError> {
        let value = serde_json::to_value(self)
            .map_err(|e| AppError::SerializationError(e.to_string()))?;
        RemotePayload::new(value).map_err(AppError::SerializationError)
    }

    fn from_payload(payload: &RemotePayload) -> Result<Self, AppError> {
        serde_json::from_value(payload.as_json())
            .map_err(|e| AppError::DeserializationError(e.to_string()))
    }
}
