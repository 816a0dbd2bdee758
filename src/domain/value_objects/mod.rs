pub mod actor;
pub mod entity_id;
pub mod entity_kind;
pub mod payload;
pub mod queue_action;
pub mod queue_item_id;
pub mod queue_status;

pub use actor::{Actor, ActorRole};
pub use entity_id::EntityId;
pub use entity_kind::EntityKind;
pub use payload::RemotePayload;
pub use queue_action::QueueAction;
pub use queue_item_id::QueueItemId;
pub use queue_status::QueueStatus;
