//! Literal parsing for default tags and environment-variable values.
//!
//! Responsibilities:
//! - Parse a short literal (a declared default or an env-var value) into a
//!   value compatible with a field's declared kind, using the lenient YAML
//!   engine so structured literals ("- a\n- b", "x: 1") work.
//! - Apply the permissive boolean rule for env overrides of bool fields.
//!
//! Invariants:
//! - String fields take literals verbatim; no YAML interpretation.
//! - Integer fields reject fractional numbers; float fields normalize
//!   integer literals to floats.
//! - The boolean env rule never fails: "", "0", "f", and "false"
//!   (case-insensitive) are false, anything else is true.

use serde_json::{Number, Value};
use thiserror::Error;

use crate::schema::FieldKind;

/// A literal that could not be turned into a field's kind.
#[derive(Error, Debug)]
pub enum LiteralError {
    #[error("invalid YAML literal: {0}")]
    Syntax(String),

    #[error("value does not fit a {expected} field")]
    Kind { expected: &'static str },
}

/// Parse `raw` into a value compatible with `kind`.
pub(crate) fn parse_literal(raw: &str, kind: &FieldKind) -> Result<Value, LiteralError> {
    if matches!(kind, FieldKind::String) {
        return Ok(Value::String(raw.to_owned()));
    }
    let mut value: Value =
        serde_yaml::from_str(raw).map_err(|e| LiteralError::Syntax(e.to_string()))?;
    coerce(&mut value, kind)?;
    Ok(value)
}

/// The boolean interpretation applied to env overrides of bool fields.
pub(crate) fn parse_env_bool(raw: &str) -> bool {
    !matches!(raw.to_lowercase().as_str(), "" | "0" | "f" | "false")
}

/// Check `value` against `kind`, normalizing numbers in place. Nulls pass
/// for any kind (a null literal leaves the field blank). Unknown keys in
/// struct literals are tolerated; they vanish at hydration.
fn coerce(value: &mut Value, kind: &FieldKind) -> Result<(), LiteralError> {
    if value.is_null() {
        return Ok(());
    }
    match kind {
        FieldKind::Bool => match value {
            Value::Bool(_) => Ok(()),
            _ => Err(kind_error(kind)),
        },
        FieldKind::String => match value {
            Value::String(_) => Ok(()),
            _ => Err(kind_error(kind)),
        },
        FieldKind::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(()),
            _ => Err(kind_error(kind)),
        },
        FieldKind::Float => match value {
            Value::Number(n) => {
                let as_float = n.as_f64().ok_or_else(|| kind_error(kind))?;
                if let Some(normalized) = Number::from_f64(as_float) {
                    *n = normalized;
                }
                Ok(())
            }
            _ => Err(kind_error(kind)),
        },
        FieldKind::Scalar => Ok(()),
        FieldKind::Struct(schema) | FieldKind::OptionalStruct(schema) => match value {
            Value::Object(map) => {
                for (key, entry) in map.iter_mut() {
                    if let Some(field) = schema.field_named(key) {
                        coerce(entry, field.kind())?;
                    }
                }
                Ok(())
            }
            _ => Err(kind_error(kind)),
        },
        FieldKind::Slice(inner) => match value {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    coerce(item, inner)?;
                }
                Ok(())
            }
            _ => Err(kind_error(kind)),
        },
    }
}

fn kind_error(kind: &FieldKind) -> LiteralError {
    LiteralError::Kind {
        expected: kind.describe(),
    }
}
