//! Declarative per-entity field schemas.
//!
//! Every entity lists its fields with a `Constraint`. `normalize` checks a raw
//! JSON map against that list and rewrites each value into its canonical JSON
//! type, so that deserializing into the typed struct afterwards cannot fail on
//! a value the schema accepted.

use serde_json::{Map, Number, Value};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Positive integer.
    Id,
    /// Any integer.
    Integer,
    /// Integer that is zero or greater.
    NonNegative,
    /// Integer from a closed set.
    OneOf(&'static [i64]),
    /// `true`/`false`, `0`/`1`, or their string forms.
    Flag,
    Number,
    Text,
    NonEmptyText,
    /// Passed through untouched.
    Any,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub constraint: Constraint,
    pub required: bool,
}

impl Field {
    pub const fn optional(name: &'static str, constraint: Constraint) -> Self {
        Self {
            name,
            constraint,
            required: false,
        }
    }

    pub const fn required(name: &'static str, constraint: Constraint) -> Self {
        Self {
            name,
            constraint,
            required: true,
        }
    }
}

pub fn lookup(fields: &'static [Field], name: &str) -> Option<&'static Field> {
    fields.iter().find(|f| f.name == name)
}

/// Validate `raw` against `fields`. Unknown keys and `null` values are dropped.
pub fn normalize(
    fields: &'static [Field],
    mut raw: Map<String, Value>,
) -> Result<Map<String, Value>, ValidationError> {
    let mut out = Map::new();
    for field in fields {
        match raw.remove(field.name) {
            None | Some(Value::Null) if field.required => {
                return Err(ValidationError::Missing { field: field.name });
            }
            None | Some(Value::Null) => {}
            Some(value) => {
                out.insert(field.name.to_owned(), check(field, value)?);
            }
        }
    }
    Ok(out)
}

/// Check the known fields of an outgoing body without rewriting it. With
/// `complete` set, required fields must be present and non-null.
pub fn validate(
    fields: &'static [Field],
    body: &Map<String, Value>,
    complete: bool,
) -> Result<(), ValidationError> {
    for field in fields {
        match body.get(field.name) {
            None | Some(Value::Null) if complete && field.required => {
                return Err(ValidationError::Missing { field: field.name });
            }
            None | Some(Value::Null) => {}
            Some(value) => {
                check(field, value.clone())?;
            }
        }
    }
    Ok(())
}

/// Check one value and return its canonical form.
pub fn check(field: &Field, value: Value) -> Result<Value, ValidationError> {
    let canonical = match field.constraint {
        Constraint::Any => Some(value.clone()),
        Constraint::Id => as_integer(&value).filter(|n| *n > 0).map(Value::from),
        Constraint::Integer => as_integer(&value).map(Value::from),
        Constraint::NonNegative => as_integer(&value).filter(|n| *n >= 0).map(Value::from),
        Constraint::OneOf(domain) => as_integer(&value)
            .filter(|n| domain.contains(n))
            .map(Value::from),
        Constraint::Flag => as_flag(&value).map(Value::Bool),
        Constraint::Number => as_number(&value).and_then(Number::from_f64).map(Value::Number),
        Constraint::Text => match &value {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            _ => None,
        },
        Constraint::NonEmptyText => value
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .map(|s| Value::String(s.to_owned())),
    };

    canonical.ok_or_else(|| {
        let reason = match field.constraint {
            Constraint::Id => "must be a positive integer",
            Constraint::Integer => "must be an integer",
            Constraint::NonNegative => "must be a non-negative integer",
            Constraint::OneOf(_) => "is outside the allowed set of values",
            Constraint::Flag => "must be a boolean or 0/1",
            Constraint::Number => "must be a number",
            Constraint::Text => "must be a string",
            Constraint::NonEmptyText => "must be a non-empty string",
            Constraint::Any => "is not accepted",
        };
        ValidationError::Invalid {
            field: field.name,
            value: value.to_string(),
            reason,
        }
    })
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const FIELDS: &[Field] = &[
        Field::optional("id", Constraint::Id),
        Field::required("name", Constraint::NonEmptyText),
        Field::optional("status", Constraint::OneOf(&[1, 2, 3, 4])),
        Field::optional("enabled", Constraint::Flag),
        Field::optional("value", Constraint::Number),
    ];

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn canonicalizes_loose_input() {
        let out = normalize(
            FIELDS,
            map(json!({"id": "7", "name": "API", "status": 2, "enabled": "1", "value": "1.5"})),
        )
        .unwrap();
        assert_eq!(Value::Object(out), json!({"id": 7, "name": "API", "status": 2, "enabled": true, "value": 1.5}));
    }

    #[test]
    fn drops_nulls_and_unknown_keys() {
        let out = normalize(FIELDS, map(json!({"name": "API", "status": null, "extra": 1}))).unwrap();
        assert_eq!(Value::Object(out), json!({"name": "API"}));
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let err = normalize(FIELDS, map(json!({"id": "abc", "name": "API"}))).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "id", ref value, .. } if value == "\"abc\""));
    }

    #[test]
    fn zero_id_is_rejected() {
        let err = normalize(FIELDS, map(json!({"id": 0, "name": "API"}))).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "id", .. }));
    }

    #[test]
    fn out_of_domain_value_is_rejected() {
        let err = normalize(FIELDS, map(json!({"name": "API", "status": 5}))).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "status", .. }));
    }

    #[test]
    fn missing_or_blank_required_field_is_rejected() {
        let err = normalize(FIELDS, map(json!({"status": 1}))).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "name" });

        let err = normalize(FIELDS, map(json!({"name": "  "}))).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "name", .. }));
    }

    #[test]
    fn ids_beyond_i64_are_rejected_not_clamped() {
        let err = normalize(FIELDS, map(json!({"id": u64::MAX, "name": "API"}))).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "id", .. }));

        let err = normalize(FIELDS, map(json!({"id": 1.0e19, "name": "API"}))).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "id", .. }));

        let out = normalize(FIELDS, map(json!({"id": 12.0, "name": "API"}))).unwrap();
        assert_eq!(out["id"], json!(12));
    }

    #[test]
    fn validate_checks_without_rewriting() {
        let body = map(json!({"name": "API", "status": null, "extra": [1]}));
        assert_eq!(validate(FIELDS, &body, true), Ok(()));

        let partial = map(json!({"status": 2}));
        assert_eq!(validate(FIELDS, &partial, false), Ok(()));
        assert_eq!(
            validate(FIELDS, &partial, true),
            Err(ValidationError::Missing { field: "name" })
        );

        let blank = map(json!({"name": ""}));
        assert!(matches!(
            validate(FIELDS, &blank, false),
            Err(ValidationError::Invalid { field: "name", .. })
        ));
    }

    #[test]
    fn flag_rejects_other_integers() {
        let err = normalize(FIELDS, map(json!({"name": "API", "enabled": 2}))).unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "enabled", .. }));
    }
}
