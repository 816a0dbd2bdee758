use crate::application::services::entity_sync::EntitySyncService;
use crate::domain::entities::record::RecordMeta;
use crate::domain::entities::User;
use crate::domain::value_objects::{Actor, EntityId};
use crate::shared::error::AppError;
use chrono::Utc;

#[derive(Debug, Clone)]
pub struct UserDraft {
    pub display_name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

pub struct UserService {
    core: EntitySyncService<User>,
}

impl UserService {
    pub fn new(core: EntitySyncService<User>) -> Self {
        Self { core }
    }

    fn validate_display_name(name: &str) -> Result<(), AppError> {
        if name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Display name is required".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_email(email: &str) -> Result<(), AppError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::ValidationError(format!(
                "Invalid email address: {email}"
            )));
        }
        Ok(())
    }

    pub async fn add(&self, draft: UserDraft, actor: &Actor) -> Result<User, AppError> {
        Self::validate_display_name(&draft.display_name)?;
        Self::validate_email(&draft.email)?;

        let user = User {
            meta: RecordMeta::new(actor, Utc::now()),
            display_name: draft.display_name.trim().to_string(),
            email: draft.email.trim().to_string(),
            role: draft.role,
            active: true,
        };
        self.core.add(user).await
    }

    pub async fn update(
        &self,
        id: &EntityId,
        changes: UserChanges,
        actor: &Actor,
    ) -> Result<User, AppError> {
        if let Some(name) = &changes.display_name {
            Self::validate_display_name(name)?;
        }
        if let Some(email) = &changes.email {
            Self::validate_email(email)?;
        }
        self.core
            .update_with(id, actor, |user| {
                if let Some(name) = changes.display_name {
                    user.display_name = name.trim().to_string();
                }
                if let Some(email) = changes.email {
                    user.email = email.trim().to_string();
                }
                if let Some(role) = changes.role {
                    user.role = role;
                }
                Ok(())
            })
            .await
    }

    /// Deactivation keeps the record (and its history) but marks the account
    /// unusable; only elevated actors may do it.
    pub async fn deactivate(&self, id: &EntityId, actor: &Actor) -> Result<User, AppError> {
        if !actor.is_elevated() {
            return Err(AppError::Unauthorized(
                "Only managers may deactivate users".to_string(),
            ));
        }
        self.core
            .update_with(id, actor, |user| {
                user.active = false;
                Ok(())
            })
            .await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Option<User>, AppError> {
        self.core.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.core.list().await
    }

    pub async fn list_deleted(&self) -> Result<Vec<User>, AppError> {
        self.core.list_deleted().await
    }

    pub async fn soft_delete(&self, id: &EntityId, actor: &Actor) -> Result<(), AppError> {
        self.core.soft_delete(id, actor).await
    }

    pub async fn restore(&self, id: &EntityId, actor: &Actor) -> Result<User, AppError> {
        self.core.restore(id, actor).await
    }

    pub async fn hard_delete(&self, id: &EntityId, actor: &Actor) -> Result<(), AppError> {
        self.core.hard_delete(id, actor).await
    }
}
