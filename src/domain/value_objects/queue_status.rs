use serde::{Deserialize, Serialize};

/// `Failed` is terminal until an operator requeues the item manually; it
/// keeps an unrecoverable mutation from blocking the queue head forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    Pending,
    Failed,
    Unknown(String),
}

impl QueueStatus {
    pub fn as_str(&self) -> &str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Failed => "failed",
            QueueStatus::Unknown(value) => value.as_str(),
        }
    }
}

impl From<&str> for QueueStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => QueueStatus::Pending,
            "failed" => QueueStatus::Failed,
            other => QueueStatus::Unknown(other.to_string()),
        }
    }
}
