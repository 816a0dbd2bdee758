pub mod activity_log;
pub mod attendance;
pub mod booking;
pub mod leave_request;
pub mod queue_item;
pub mod record;
pub mod user;

pub use activity_log::ActivityLog;
pub use attendance::Attendance;
pub use booking::{Booking, BookingReminder, BookingStatus, BookingTask};
pub use leave_request::{LeaveRequest, LeaveStatus};
pub use queue_item::{QueueItem, QueueItemDraft};
pub use record::{RecordMeta, SyncRecord};
pub use user::User;
