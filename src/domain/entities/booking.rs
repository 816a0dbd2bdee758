use super::record::{RecordMeta, SyncRecord};
use crate::domain::value_objects::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: BookingStatus,
}

impl SyncRecord for Booking {
    const KIND: EntityKind = EntityKind::Booking;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Requested,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Cancelled is terminal; a booking can only be confirmed once.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Requested, BookingStatus::Confirmed)
                | (BookingStatus::Requested, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Requested => "requested",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Checklist item attached to a booking; removed when the booking is
/// hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingTask {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub booking_id: String,
    pub label: String,
    pub done: bool,
}

impl SyncRecord for BookingTask {
    const KIND: EntityKind = EntityKind::BookingTask;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReminder {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub booking_id: String,
    pub remind_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl SyncRecord for BookingReminder {
    const KIND: EntityKind = EntityKind::BookingReminder;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_terminal() {
        assert!(BookingStatus::Requested.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Requested));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));
    }
}
