//! Request bodies and the shaping rules applied before they are sent.
//!
//! The Cachet server rejects some fields its own responses contain. The rules
//! here strip them so that an entity fetched from the API can be submitted
//! back unchanged:
//!
//! - components: `tags` is never sent.
//! - incidents: `component_id` is sent only together with `component_status`.
//! - incident updates: `created_at` is never sent.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::models::{json_kind, Entity};

/// A JSON object to be sent as a POST or PUT body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Non-null value of `key`.
    fn present(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    pub(crate) fn without_tags(mut self) -> Self {
        self.0.remove("tags");
        self
    }

    pub(crate) fn without_orphan_component_id(mut self) -> Self {
        if !self.present("component_status") {
            self.0.remove("component_id");
        }
        self
    }

    pub(crate) fn without_created_at(mut self) -> Self {
        self.0.remove("created_at");
        self
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<T: Entity> From<&T> for Payload {
    fn from(entity: &T) -> Self {
        Self(entity.to_plain_map())
    }
}

impl TryFrom<Value> for Payload {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ValidationError::NotAnObject {
                entity: "payload",
                found: json_kind(&other),
            }),
        }
    }
}

/// Body for component create and update.
pub(crate) fn component_body(payload: Payload) -> Payload {
    payload.without_tags()
}

pub(crate) fn incident_create_body(payload: Payload) -> Payload {
    payload.without_orphan_component_id()
}

pub(crate) fn incident_update_body(payload: Payload) -> Payload {
    payload.without_orphan_component_id().without_created_at()
}
