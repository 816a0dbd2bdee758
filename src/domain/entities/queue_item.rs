use crate::domain::value_objects::{
    EntityKind, QueueAction, QueueItemId, QueueStatus, RemotePayload,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pending mutation awaiting remote application. FIFO order is defined by
/// `created_at`; per-entity-id order must never be violated during replay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueItem {
    pub id: QueueItemId,
    pub action: QueueAction,
    pub entity_kind: EntityKind,
    pub payload: RemotePayload,
    pub retry_count: u32,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueueItem {
    /// The record id this mutation targets, read from the payload document.
    pub fn entity_id(&self) -> Option<&str> {
        self.payload.entity_id()
    }

    /// Key used to keep mutations for the same record strictly ordered.
    pub fn ordering_key(&self) -> Option<(EntityKind, String)> {
        self.entity_id()
            .map(|id| (self.entity_kind, id.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct QueueItemDraft {
    pub action: QueueAction,
    pub entity_kind: EntityKind,
    pub payload: RemotePayload,
}

impl QueueItemDraft {
    pub fn new(action: QueueAction, entity_kind: EntityKind, payload: RemotePayload) -> Self {
        Self {
            action,
            entity_kind,
            payload,
        }
    }
}
