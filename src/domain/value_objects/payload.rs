use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// The remote-shaped form of a mutation: a structured document whose fields
/// can be removed one at a time. The schema drift adapter operates on this
/// rather than on any concrete entity type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemotePayload(Map<String, Value>);

impl RemotePayload {
    pub fn new(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err("Remote payload must be a JSON object".to_string()),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    /// The record id carried by the payload, if present. Every payload the
    /// entity services produce carries one; its absence marks a corrupt item.
    pub fn entity_id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.0.len()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Removes a field; returns false when it was not present.
    pub fn remove_field(&mut self, name: &str) -> bool {
        self.0.remove(name).is_some()
    }

    /// Removes every listed field, returning the names actually dropped.
    pub fn strip_fields(&mut self, names: &HashSet<String>) -> Vec<String> {
        let mut dropped = Vec::new();
        for name in names {
            if self.0.remove(name).is_some() {
                dropped.push(name.clone());
            }
        }
        dropped
    }

    pub fn as_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<RemotePayload> for Value {
    fn from(payload: RemotePayload) -> Self {
        Value::Object(payload.0)
    }
}
