use crate::application::services::entity_sync::EntitySyncService;
use crate::domain::entities::record::RecordMeta;
use crate::domain::entities::{Booking, BookingReminder, BookingStatus, BookingTask, SyncRecord};
use crate::domain::value_objects::{Actor, EntityId};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BookingChanges {
    pub title: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Bookings plus their dependent tasks and reminders. Hard-deleting a
/// booking cascades to the dependents, local side first.
pub struct BookingService {
    core: EntitySyncService<Booking>,
    tasks: EntitySyncService<BookingTask>,
    reminders: EntitySyncService<BookingReminder>,
}

impl BookingService {
    pub fn new(
        core: EntitySyncService<Booking>,
        tasks: EntitySyncService<BookingTask>,
        reminders: EntitySyncService<BookingReminder>,
    ) -> Self {
        Self {
            core,
            tasks,
            reminders,
        }
    }

    fn validate_title(title: &str) -> Result<(), AppError> {
        if title.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Booking title is required".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_window(
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if ends_at <= starts_at {
            return Err(AppError::ValidationError(
                "Booking must end after it starts".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn add(&self, draft: BookingDraft, actor: &Actor) -> Result<Booking, AppError> {
        Self::validate_title(&draft.title)?;
        Self::validate_window(draft.starts_at, draft.ends_at)?;

        let booking = Booking {
            meta: RecordMeta::new(actor, Utc::now()),
            title: draft.title.trim().to_string(),
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            notes: draft.notes,
            status: BookingStatus::Requested,
        };
        self.core.add(booking).await
    }

    pub async fn update(
        &self,
        id: &EntityId,
        changes: BookingChanges,
        actor: &Actor,
    ) -> Result<Booking, AppError> {
        if let Some(title) = &changes.title {
            Self::validate_title(title)?;
        }
        self.core
            .update_with(id, actor, |booking| {
                if let Some(title) = changes.title {
                    booking.title = title.trim().to_string();
                }
                if let Some(starts_at) = changes.starts_at {
                    booking.starts_at = starts_at;
                }
                if let Some(ends_at) = changes.ends_at {
                    booking.ends_at = ends_at;
                }
                if let Some(notes) = changes.notes {
                    booking.notes = Some(notes);
                }
                Self::validate_window(booking.starts_at, booking.ends_at)
            })
            .await
    }

    pub async fn confirm(&self, id: &EntityId, actor: &Actor) -> Result<Booking, AppError> {
        self.transition(id, BookingStatus::Confirmed, actor).await
    }

    pub async fn cancel(&self, id: &EntityId, actor: &Actor) -> Result<Booking, AppError> {
        self.transition(id, BookingStatus::Cancelled, actor).await
    }

    async fn transition(
        &self,
        id: &EntityId,
        next: BookingStatus,
        actor: &Actor,
    ) -> Result<Booking, AppError> {
        self.core
            .update_with(id, actor, |booking| {
                if !booking.status.can_transition_to(next) {
                    return Err(AppError::ValidationError(format!(
                        "Booking cannot move from {} to {}",
                        booking.status, next
                    )));
                }
                booking.status = next;
                Ok(())
            })
            .await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Option<Booking>, AppError> {
        self.core.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<Booking>, AppError> {
        self.core.list().await
    }

    pub async fn list_deleted(&self) -> Result<Vec<Booking>, AppError> {
        self.core.list_deleted().await
    }

    pub async fn soft_delete(&self, id: &EntityId, actor: &Actor) -> Result<(), AppError> {
        self.core.soft_delete(id, actor).await
    }

    pub async fn restore(&self, id: &EntityId, actor: &Actor) -> Result<Booking, AppError> {
        self.core.restore(id, actor).await
    }

    /// Removes the booking everywhere, cascading to its tasks and reminders.
    /// Dependents are removed locally (and queued or written remotely) before
    /// the booking row itself, so an interruption never leaves a dangling
    /// dependent behind.
    pub async fn hard_delete(&self, id: &EntityId, actor: &Actor) -> Result<(), AppError> {
        self.core.load_authorized(id, actor).await?;

        for task in self.tasks.list_local_by_field("bookingId", id.as_str()).await? {
            self.tasks.hard_delete_unchecked(task.id()).await?;
        }
        for reminder in self
            .reminders
            .list_local_by_field("bookingId", id.as_str())
            .await?
        {
            self.reminders.hard_delete_unchecked(reminder.id()).await?;
        }

        self.core.hard_delete_unchecked(id).await
    }

    pub async fn add_task(
        &self,
        booking_id: &EntityId,
        label: String,
        actor: &Actor,
    ) -> Result<BookingTask, AppError> {
        if label.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Task label is required".to_string(),
            ));
        }
        self.require_booking(booking_id).await?;

        let task = BookingTask {
            meta: RecordMeta::new(actor, Utc::now()),
            booking_id: booking_id.to_string(),
            label: label.trim().to_string(),
            done: false,
        };
        self.tasks.add(task).await
    }

    pub async fn complete_task(
        &self,
        task_id: &EntityId,
        actor: &Actor,
    ) -> Result<BookingTask, AppError> {
        self.tasks
            .update_with(task_id, actor, |task| {
                task.done = true;
                Ok(())
            })
            .await
    }

    pub async fn tasks_for(&self, booking_id: &EntityId) -> Result<Vec<BookingTask>, AppError> {
        self.tasks
            .list_local_by_field("bookingId", booking_id.as_str())
            .await
    }

    pub async fn add_reminder(
        &self,
        booking_id: &EntityId,
        remind_at: DateTime<Utc>,
        note: Option<String>,
        actor: &Actor,
    ) -> Result<BookingReminder, AppError> {
        self.require_booking(booking_id).await?;

        let reminder = BookingReminder {
            meta: RecordMeta::new(actor, Utc::now()),
            booking_id: booking_id.to_string(),
            remind_at,
            note,
        };
        self.reminders.add(reminder).await
    }

    pub async fn reminders_for(
        &self,
        booking_id: &EntityId,
    ) -> Result<Vec<BookingReminder>, AppError> {
        self.reminders
            .list_local_by_field("bookingId", booking_id.as_str())
            .await
    }

    async fn require_booking(&self, id: &EntityId) -> Result<(), AppError> {
        match self.core.get(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Booking {id} not found"))),
        }
    }
}
