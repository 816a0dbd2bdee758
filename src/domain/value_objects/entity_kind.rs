use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of entity kinds the sync engine knows how to replay.
/// The string form doubles as the remote table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Booking,
    BookingTask,
    BookingReminder,
    User,
    Leave,
    Attendance,
    ActivityLog,
}

impl EntityKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Booking => "bookings",
            EntityKind::BookingTask => "booking_tasks",
            EntityKind::BookingReminder => "booking_reminders",
            EntityKind::User => "users",
            EntityKind::Leave => "leave_requests",
            EntityKind::Attendance => "attendance",
            EntityKind::ActivityLog => "activity_logs",
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.table_name()
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "bookings" => Ok(EntityKind::Booking),
            "booking_tasks" => Ok(EntityKind::BookingTask),
            "booking_reminders" => Ok(EntityKind::BookingReminder),
            "users" => Ok(EntityKind::User),
            "leave_requests" => Ok(EntityKind::Leave),
            "attendance" => Ok(EntityKind::Attendance),
            "activity_logs" => Ok(EntityKind::ActivityLog),
            other => Err(format!("Unknown entity kind: {other}")),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
