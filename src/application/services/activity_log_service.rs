use crate::application::services::entity_sync::EntitySyncService;
use crate::domain::entities::record::RecordMeta;
use crate::domain::entities::ActivityLog;
use crate::domain::value_objects::{Actor, EntityId};
use crate::shared::error::AppError;
use chrono::Utc;

/// Append-only audit trail. Entries are never updated or soft-deleted;
/// hard delete exists only for retention cleanup by elevated actors.
pub struct ActivityLogService {
    core: EntitySyncService<ActivityLog>,
}

impl ActivityLogService {
    pub fn new(core: EntitySyncService<ActivityLog>) -> Self {
        Self { core }
    }

    pub async fn record(
        &self,
        action: String,
        subject_kind: String,
        subject_id: String,
        detail: Option<String>,
        actor: &Actor,
    ) -> Result<ActivityLog, AppError> {
        if action.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Activity action is required".to_string(),
            ));
        }

        let entry = ActivityLog {
            meta: RecordMeta::new(actor, Utc::now()),
            action,
            subject_kind,
            subject_id,
            detail,
        };
        self.core.add(entry).await
    }

    pub async fn list(&self) -> Result<Vec<ActivityLog>, AppError> {
        self.core.list().await
    }

    pub async fn list_for_subject(&self, subject_id: &str) -> Result<Vec<ActivityLog>, AppError> {
        self.core.list_local_by_field("subjectId", subject_id).await
    }

    pub async fn hard_delete(&self, id: &EntityId, actor: &Actor) -> Result<(), AppError> {
        if !actor.is_elevated() {
            return Err(AppError::Unauthorized(
                "Only managers may purge activity logs".to_string(),
            ));
        }
        self.core.hard_delete(id, actor).await
    }
}
