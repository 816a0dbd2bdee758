use super::record::{RecordMeta, SyncRecord};
use crate::domain::value_objects::EntityKind;
use serde::{Deserialize, Serialize};

/// Append-only audit entry. The service layer exposes no update or
/// soft-delete surface for these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub action: String,
    pub subject_kind: String,
    pub subject_id: String,
    pub detail: Option<String>,
}

impl SyncRecord for ActivityLog {
    const KIND: EntityKind = EntityKind::ActivityLog;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}
