//! Format decoding for resolved configuration files.
//!
//! Responsibilities:
//! - Select a decoder by extension: `.yaml`/`.yml` -> YAML, `.json` ->
//!   JSON, anything else tries lenient JSON first and falls back to YAML
//!   only when JSON fails syntactically.
//! - Enforce strict unknown-key rejection against the schema when
//!   requested, uniformly across formats.
//!
//! Does NOT handle:
//! - Merging decoded trees into the target (see `mod.rs`; decoding returns
//!   the file's own tree).
//!
//! Invariants:
//! - An unknown-key failure is fatal immediately: for extensionless files
//!   it is NOT downgraded into a YAML retry, because the file did decode.
//! - An empty document decodes to an empty mapping.

use std::path::Path;

use serde_json::Value;

use super::error::LoadError;
use crate::schema::{FieldKind, StructSchema};

/// Decode one file's bytes into its own value tree, applying the strict
/// unknown-key check when `strict` is set.
pub(crate) fn decode_file(
    path: &Path,
    data: &[u8],
    schema: &StructSchema,
    strict: bool,
) -> Result<Value, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let value = match extension.as_deref() {
        Some("yaml") | Some("yml") => decode_yaml(path, data)?,
        Some("json") => decode_json(path, data)?,
        _ => match decode_json(path, data) {
            Ok(value) => value,
            Err(_) => decode_yaml(path, data).map_err(|_| LoadError::Decode {
                path: path.to_path_buf(),
                message: "content is neither valid JSON nor valid YAML".to_string(),
            })?,
        },
    };

    if strict {
        check_unknown_keys(path, &value, schema, "")?;
    }
    Ok(value)
}

fn decode_yaml(path: &Path, data: &[u8]) -> Result<Value, LoadError> {
    let value: Value = serde_yaml::from_slice(data).map_err(|e| LoadError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    require_mapping(path, value)
}

fn decode_json(path: &Path, data: &[u8]) -> Result<Value, LoadError> {
    let value: Value = serde_json::from_slice(data).map_err(|e| LoadError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    require_mapping(path, value)
}

fn require_mapping(path: &Path, value: Value) -> Result<Value, LoadError> {
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(serde_json::Map::new())),
        _ => Err(LoadError::Decode {
            path: path.to_path_buf(),
            message: "expected a mapping at the top level".to_string(),
        }),
    }
}

/// Walk the decoded tree against the schema and fail on the first key that
/// has no corresponding field.
fn check_unknown_keys(
    path: &Path,
    value: &Value,
    schema: &StructSchema,
    prefix: &str,
) -> Result<(), LoadError> {
    let Value::Object(map) = value else {
        return Ok(());
    };
    for (key, entry) in map {
        let qualified = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let Some(field) = schema.field_named(key) else {
            return Err(LoadError::UnknownKey {
                path: path.to_path_buf(),
                key: qualified,
            });
        };
        match field.kind() {
            FieldKind::Struct(nested) | FieldKind::OptionalStruct(nested) => {
                check_unknown_keys(path, entry, nested, &qualified)?;
            }
            FieldKind::Slice(inner) => {
                if let (Some(nested), Value::Array(items)) = (inner.struct_schema(), entry) {
                    for (index, item) in items.iter().enumerate() {
                        check_unknown_keys(path, item, nested, &format!("{qualified}[{index}]"))?;
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}
