use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the caller performing a mutation. Passed explicitly into
/// every entity-service call; the engine never consults ambient user state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn staff(user_id: impl Into<String>) -> Self {
        Self::new(user_id, ActorRole::Staff)
    }

    pub fn manager(user_id: impl Into<String>) -> Self {
        Self::new(user_id, ActorRole::Manager)
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, ActorRole::Admin)
    }

    pub fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Staff,
    Manager,
    Admin,
}

impl ActorRole {
    pub fn is_elevated(&self) -> bool {
        matches!(self, ActorRole::Manager | ActorRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Staff => "staff",
            ActorRole::Manager => "manager",
            ActorRole::Admin => "admin",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
