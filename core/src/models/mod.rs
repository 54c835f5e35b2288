//! Typed, self-validating representations of the API's resources.
//!
//! # Design
//! Each entity is a plain record with public fields. Enumerated domains are
//! enums, so typed assignment cannot produce an invalid value. Raw input
//! (a JSON map from a caller or a response payload) goes through the entity's
//! field schema in `from_map` / `set`, which names the offending field on
//! failure. No entity performs I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;

pub mod schema;

mod component;
mod component_group;
mod incident;
mod metric;
mod metric_point;
mod subscriber;

pub use component::{Component, ComponentStatus};
pub use component_group::{ComponentGroup, GroupCollapse};
pub use incident::{Incident, IncidentStatus};
pub use metric::{Metric, MetricCalcType};
pub use metric_point::MetricPoint;
pub use subscriber::Subscriber;

use schema::Field;

/// Integer-coded enum that (de)serializes as its code.
macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        $name:ident for $field:literal {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code,)+
        }

        impl $name {
            pub const CODES: &'static [i64] = &[$($code),+];

            pub fn code(self) -> i64 {
                self as i64
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> i64 {
                value as i64
            }
        }

        impl TryFrom<i64> for $name {
            type Error = crate::error::ValidationError;

            fn try_from(code: i64) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    other => Err(crate::error::ValidationError::Invalid {
                        field: $field,
                        value: other.to_string(),
                        reason: "is outside the allowed set of values",
                    }),
                }
            }
        }
    };
}

pub(crate) use int_enum;

/// Behavior shared by every resource type.
pub trait Entity: Serialize + DeserializeOwned {
    /// Human-readable resource name used in error messages.
    const NAME: &'static str;
    /// Field schema checked by `from_map` and `set`.
    const FIELDS: &'static [Field];

    fn id(&self) -> Option<u64>;

    /// Build from a raw map, validating every known field.
    fn from_map(map: Map<String, Value>) -> Result<Self, ValidationError> {
        let normalized = schema::normalize(Self::FIELDS, map)?;
        serde_json::from_value(Value::Object(normalized)).map_err(|e| ValidationError::Shape {
            entity: Self::NAME,
            reason: e.to_string(),
        })
    }

    fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(ValidationError::NotAnObject {
                entity: Self::NAME,
                found: json_kind(&other),
            }),
        }
    }

    /// Current field values, unset fields omitted.
    fn to_plain_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Assign one field from a raw value. `null` clears an optional field.
    /// On failure `self` is left unchanged.
    fn set(&mut self, field: &str, value: Value) -> Result<(), ValidationError> {
        let rule = schema::lookup(Self::FIELDS, field)
            .ok_or_else(|| ValidationError::UnknownField(field.to_owned()))?;
        let mut map = self.to_plain_map();
        if value.is_null() {
            map.remove(rule.name);
        } else {
            map.insert(rule.name.to_owned(), schema::check(rule, value)?);
        }
        *self = Self::from_map(map)?;
        Ok(())
    }
}

/// Either a bare id or an entity that carries its own id.
#[derive(Debug)]
pub enum IdOrEntity<'a, T> {
    Id(u64),
    Entity(&'a T),
}

impl<T> Clone for IdOrEntity<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for IdOrEntity<'_, T> {}

impl<T: Entity> IdOrEntity<'_, T> {
    /// Resolve to the id the request path needs.
    /// Both forms must yield a positive id.
    pub fn id(&self) -> Result<u64, ValidationError> {
        let id = match self {
            Self::Id(id) => *id,
            Self::Entity(entity) => entity.id().ok_or(ValidationError::Missing { field: "id" })?,
        };
        if id == 0 {
            return Err(ValidationError::Invalid {
                field: "id",
                value: "0".to_owned(),
                reason: "must be a positive integer",
            });
        }
        Ok(id)
    }

    pub fn entity(&self) -> Option<&T> {
        match self {
            Self::Id(_) => None,
            Self::Entity(entity) => Some(*entity),
        }
    }
}

impl<T> From<u64> for IdOrEntity<'_, T> {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl<'a, T> From<&'a T> for IdOrEntity<'a, T> {
    fn from(entity: &'a T) -> Self {
        Self::Entity(entity)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
