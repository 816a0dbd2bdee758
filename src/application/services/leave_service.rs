use crate::application::services::entity_sync::EntitySyncService;
use crate::domain::entities::record::RecordMeta;
use crate::domain::entities::{LeaveRequest, LeaveStatus};
use crate::domain::value_objects::{Actor, EntityId};
use crate::shared::error::AppError;
use chrono::{NaiveDate, Utc};

#[derive(Debug, Clone)]
pub struct LeaveDraft {
    pub user_id: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub reason: Option<String>,
}

pub struct LeaveService {
    core: EntitySyncService<LeaveRequest>,
}

impl LeaveService {
    pub fn new(core: EntitySyncService<LeaveRequest>) -> Self {
        Self { core }
    }

    pub async fn add(&self, draft: LeaveDraft, actor: &Actor) -> Result<LeaveRequest, AppError> {
        if draft.user_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Leave request needs a user".to_string(),
            ));
        }
        if draft.ends_on < draft.starts_on {
            return Err(AppError::ValidationError(
                "Leave cannot end before it starts".to_string(),
            ));
        }

        let request = LeaveRequest {
            meta: RecordMeta::new(actor, Utc::now()),
            user_id: draft.user_id,
            starts_on: draft.starts_on,
            ends_on: draft.ends_on,
            reason: draft.reason,
            status: LeaveStatus::Pending,
        };
        self.core.add(request).await
    }

    pub async fn approve(&self, id: &EntityId, actor: &Actor) -> Result<LeaveRequest, AppError> {
        self.decide(id, LeaveStatus::Approved, actor).await
    }

    pub async fn reject(&self, id: &EntityId, actor: &Actor) -> Result<LeaveRequest, AppError> {
        self.decide(id, LeaveStatus::Rejected, actor).await
    }

    /// Deciding a request is a managerial act: the creator-or-elevated rule
    /// is not enough here, staff must not approve their own leave.
    async fn decide(
        &self,
        id: &EntityId,
        decision: LeaveStatus,
        actor: &Actor,
    ) -> Result<LeaveRequest, AppError> {
        if !actor.is_elevated() {
            return Err(AppError::Unauthorized(
                "Only managers may decide leave requests".to_string(),
            ));
        }
        self.core
            .update_with(id, actor, |request| {
                if request.status.is_decided() {
                    return Err(AppError::ValidationError(format!(
                        "Leave request is already {}",
                        request.status
                    )));
                }
                request.status = decision;
                Ok(())
            })
            .await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Option<LeaveRequest>, AppError> {
        self.core.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<LeaveRequest>, AppError> {
        self.core.list().await
    }

    pub async fn list_deleted(&self) -> Result<Vec<LeaveRequest>, AppError> {
        self.core.list_deleted().await
    }

    pub async fn soft_delete(&self, id: &EntityId, actor: &Actor) -> Result<(), AppError> {
        self.core.soft_delete(id, actor).await
    }

    pub async fn restore(&self, id: &EntityId, actor: &Actor) -> Result<LeaveRequest, AppError> {
        self.core.restore(id, actor).await
    }

    pub async fn hard_delete(&self, id: &EntityId, actor: &Actor) -> Result<(), AppError> {
        self.core.hard_delete(id, actor).await
    }
}
