use crate::application::services::entity_sync::EntitySyncService;
use crate::domain::entities::record::RecordMeta;
use crate::domain::entities::Attendance;
use crate::domain::value_objects::{Actor, EntityId};
use crate::shared::error::AppError;
use chrono::Utc;

pub struct AttendanceService {
    core: EntitySyncService<Attendance>,
}

impl AttendanceService {
    pub fn new(core: EntitySyncService<Attendance>) -> Self {
        Self { core }
    }

    /// Opens an attendance entry at the current time.
    pub async fn clock_in(
        &self,
        user_id: String,
        note: Option<String>,
        actor: &Actor,
    ) -> Result<Attendance, AppError> {
        if user_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Attendance needs a user".to_string(),
            ));
        }

        let entry = Attendance {
            meta: RecordMeta::new(actor, Utc::now()),
            user_id,
            clock_in: Utc::now(),
            clock_out: None,
            note,
        };
        self.core.add(entry).await
    }

    pub async fn clock_out(&self, id: &EntityId, actor: &Actor) -> Result<Attendance, AppError> {
        let now = Utc::now();
        self.core
            .update_with(id, actor, |entry| {
                if entry.clock_out.is_some() {
                    return Err(AppError::ValidationError(
                        "Attendance entry is already closed".to_string(),
                    ));
                }
                if now <= entry.clock_in {
                    return Err(AppError::ValidationError(
                        "Clock-out must come after clock-in".to_string(),
                    ));
                }
                entry.clock_out = Some(now);
                Ok(())
            })
            .await
    }

    pub async fn amend_note(
        &self,
        id: &EntityId,
        note: Option<String>,
        actor: &Actor,
    ) -> Result<Attendance, AppError> {
        self.core
            .update_with(id, actor, |entry| {
                entry.note = note;
                Ok(())
            })
            .await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Option<Attendance>, AppError> {
        self.core.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<Attendance>, AppError> {
        self.core.list().await
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Attendance>, AppError> {
        self.core.list_local_by_field("userId", user_id).await
    }

    pub async fn list_deleted(&self) -> Result<Vec<Attendance>, AppError> {
        self.core.list_deleted().await
    }

    pub async fn soft_delete(&self, id: &EntityId, actor: &Actor) -> Result<(), AppError> {
        self.core.soft_delete(id, actor).await
    }

    pub async fn restore(&self, id: &EntityId, actor: &Actor) -> Result<Attendance, AppError> {
        self.core.restore(id, actor).await
    }

    pub async fn hard_delete(&self, id: &EntityId, actor: &Actor) -> Result<(), AppError> {
        self.core.hard_delete(id, actor).await
    }
}
