use super::record::{RecordMeta, SyncRecord};
use crate::domain::value_objects::EntityKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
}

impl SyncRecord for User {
    const KIND: EntityKind = EntityKind::User;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}
