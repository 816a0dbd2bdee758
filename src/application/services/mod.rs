pub mod activity_log_service;
pub mod attendance_service;
pub mod booking_service;
pub mod drain_worker;
pub mod entity_sync;
pub mod leave_service;
pub mod schema_drift;
pub mod user_service;

pub use activity_log_service::ActivityLogService;
pub use attendance_service::AttendanceService;
pub use booking_service::{BookingChanges, BookingDraft, BookingService};
pub use drain_worker::{DrainConfig, DrainReport, QueueDrainWorker};
pub use entity_sync::EntitySyncService;
pub use leave_service::{LeaveDraft, LeaveService};
pub use schema_drift::SchemaDriftAdapter;
pub use user_service::{UserChanges, UserDraft, UserService};
