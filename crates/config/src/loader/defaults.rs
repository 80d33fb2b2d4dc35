//! Default injection: fill blank fields from declared default literals.
//!
//! Responsibilities:
//! - Allocate null optional structs so defaults can populate nested
//!   structures the files never mentioned.
//! - Recurse into nested structs and existing slice elements, then assign
//!   each field's default literal if the field is still blank.
//! - Normalize explicit nulls to the kind's blank value so downstream
//!   stages see the same zero semantics for "absent" and "null".
//!
//! Does NOT handle:
//! - Environment overrides (see `bind.rs`; binding runs after injection).
//! - Maps or other scalar-kinded values beyond the struct/slice cases.
//!
//! Invariants:
//! - Recursion precedes the blank-check-and-assign for the field itself.
//! - An allocated optional struct counts as non-blank, so a default on the
//!   optional field itself never fires after allocation.
//! - Fails only when a default literal cannot be parsed into its field's
//!   kind.

use serde_json::{Map, Value};

use super::error::LoadError;
use crate::literal::parse_literal;
use crate::schema::{FieldKind, StructSchema};

/// Inject defaults into `map`, which holds the merged file layers for
/// `schema`'s struct.
pub(crate) fn inject(map: &mut Map<String, Value>, schema: &StructSchema) -> Result<(), LoadError> {
    inject_struct(map, schema, "")
}

fn inject_struct(
    map: &mut Map<String, Value>,
    schema: &StructSchema,
    path: &str,
) -> Result<(), LoadError> {
    for field in schema.fields() {
        let field_path = qualify(path, field.name());
        let slot = map.entry(field.name().to_string()).or_insert(Value::Null);

        match field.kind() {
            FieldKind::OptionalStruct(nested) => {
                if slot.is_null() {
                    *slot = nested.blank_value();
                }
                if let Value::Object(nested_map) = slot {
                    inject_struct(nested_map, nested, &field_path)?;
                }
            }
            FieldKind::Struct(nested) => {
                // Only nulls are normalized; a mistyped value stays put so
                // hydration rejects it instead of losing the file content.
                if slot.is_null() {
                    *slot = nested.blank_value();
                }
                if let Value::Object(nested_map) = slot {
                    inject_struct(nested_map, nested, &field_path)?;
                }
            }
            FieldKind::Slice(inner) => {
                if slot.is_null() {
                    *slot = Value::Array(Vec::new());
                }
                if let (Value::Array(items), Some(nested)) = (&mut *slot, inner.struct_schema()) {
                    for (index, item) in items.iter_mut().enumerate() {
                        if let Value::Object(item_map) = item {
                            inject_struct(item_map, nested, &format!("{field_path}[{index}]"))?;
                        }
                    }
                }
            }
            kind => {
                if slot.is_null() {
                    *slot = kind.blank_value();
                }
            }
        }

        if let Some(literal) = field.default_literal()
            && field.kind().is_blank(slot)
        {
            *slot = parse_literal(literal, field.kind()).map_err(|source| {
                LoadError::DefaultParse {
                    field: field_path.clone(),
                    source,
                }
            })?;
        }
    }
    Ok(())
}

fn qualify(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}
