use super::record::{RecordMeta, SyncRecord};
use crate::domain::value_objects::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub user_id: String,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl Attendance {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }
}

impl SyncRecord for Attendance {
    const KIND: EntityKind = EntityKind::Attendance;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}
