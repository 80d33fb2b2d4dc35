//! Environment-variable binding over the configuration tree.
//!
//! Responsibilities:
//! - For every field, derive candidate variable names from the prefix path
//!   (declared case first, upper case second) or take the explicit `env`
//!   name, and apply the first non-empty value found.
//! - Enforce required-field constraints after the override attempt.
//! - Descend into nested structs and slice elements, growing empty
//!   struct-shaped slices from contiguously-indexed variables.
//!
//! Does NOT handle:
//! - Default injection (already done; see `defaults.rs`).
//! - Reading process environment directly; all reads go through the
//!   injected `EnvSource`.
//!
//! Invariants:
//! - Candidate scanning stops at the first name with a non-empty value.
//! - The required check runs before descent, so a blank required struct
//!   field fails even when its children could have bound.
//! - Slice growth stops at the first index whose bound element is entirely
//!   blank; indices must be contiguous from 0.
//! - The walk aborts on the first error from any field, including errors
//!   propagated out of recursive descent.

use serde_json::{Map, Value};
use tracing::trace;

use super::error::LoadError;
use crate::literal::{parse_env_bool, parse_literal};
use crate::schema::{FieldKind, FieldSchema, StructSchema};
use crate::source::EnvSource;
use crate::value::deep_merge;

pub(crate) struct EnvBinder<'a> {
    env: &'a dyn EnvSource,
    verbose: bool,
}

impl<'a> EnvBinder<'a> {
    pub(crate) fn new(env: &'a dyn EnvSource, verbose: bool) -> Self {
        Self { env, verbose }
    }

    /// Bind `map` (the tree for `schema`'s struct) using `prefixes` as the
    /// accumulated env-name segments.
    pub(crate) fn bind(
        &self,
        map: &mut Map<String, Value>,
        schema: &StructSchema,
        prefixes: &[String],
    ) -> Result<(), LoadError> {
        self.bind_struct(map, schema, prefixes, "")
    }

    fn bind_struct(
        &self,
        map: &mut Map<String, Value>,
        schema: &StructSchema,
        prefixes: &[String],
        path: &str,
    ) -> Result<(), LoadError> {
        for field in schema.fields() {
            let field_path = qualify(path, field.name());
            let slot = map.entry(field.name().to_string()).or_insert(Value::Null);

            self.apply_override(slot, field, prefixes, &field_path)?;

            if field.is_required() && field.kind().is_blank(slot) {
                return Err(LoadError::RequiredField { field: field_path });
            }

            match field.kind() {
                FieldKind::Struct(nested) => {
                    if let Value::Object(nested_map) = slot {
                        let nested_prefixes = extend_prefixes(prefixes, field);
                        self.bind_struct(nested_map, nested, &nested_prefixes, &field_path)?;
                    }
                }
                FieldKind::OptionalStruct(nested) => {
                    // Unallocated optional structs are skipped entirely,
                    // like a nil pointer: no descent, no required checks
                    // on their fields.
                    if let Value::Object(nested_map) = slot {
                        let nested_prefixes = extend_prefixes(prefixes, field);
                        self.bind_struct(nested_map, nested, &nested_prefixes, &field_path)?;
                    }
                }
                FieldKind::Slice(inner) => {
                    if let Some(nested) = inner.struct_schema() {
                        self.bind_slice(slot, field, nested, prefixes, &field_path)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Try the field's candidate variable names and assign the first
    /// non-empty value found.
    fn apply_override(
        &self,
        slot: &mut Value,
        field: &FieldSchema,
        prefixes: &[String],
        field_path: &str,
    ) -> Result<(), LoadError> {
        let candidates = candidate_names(field, prefixes);
        if self.verbose {
            trace!(field = field_path, candidates = ?candidates, "looking for env override");
        }

        for candidate in &candidates {
            let Some(raw) = self.env.var(candidate) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            if self.verbose {
                trace!(field = field_path, var = %candidate, "applying env override");
            }

            let value = match field.kind() {
                FieldKind::Bool => Value::Bool(parse_env_bool(&raw)),
                FieldKind::String => Value::String(raw.clone()),
                kind => parse_literal(&raw, kind).map_err(|source| LoadError::EnvParse {
                    var: candidate.clone(),
                    field: field_path.to_string(),
                    source,
                })?,
            };
            // Struct-shaped literals overlay the existing value; scalars
            // and sequences replace it.
            deep_merge(slot, value);
            break;
        }
        Ok(())
    }

    fn bind_slice(
        &self,
        slot: &mut Value,
        field: &FieldSchema,
        element: &StructSchema,
        prefixes: &[String],
        field_path: &str,
    ) -> Result<(), LoadError> {
        let Value::Array(items) = slot else {
            return Ok(());
        };
        let slice_prefixes = extend_prefixes(prefixes, field);

        if !items.is_empty() {
            // Elements populated by files are bound in place; the slice
            // never grows past them.
            for (index, item) in items.iter_mut().enumerate() {
                if let Value::Object(item_map) = item {
                    let mut element_prefixes = slice_prefixes.clone();
                    element_prefixes.push(index.to_string());
                    self.bind_struct(
                        item_map,
                        element,
                        &element_prefixes,
                        &format!("{field_path}[{index}]"),
                    )?;
                }
            }
            return Ok(());
        }

        // Growth: bind fresh zero-value elements at successive indices
        // until one comes back entirely blank.
        let mut index = 0usize;
        loop {
            let mut candidate = element.blank_value();
            let Value::Object(candidate_map) = &mut candidate else {
                return Ok(());
            };
            let mut element_prefixes = slice_prefixes.clone();
            element_prefixes.push(index.to_string());
            self.bind_struct(
                candidate_map,
                element,
                &element_prefixes,
                &format!("{field_path}[{index}]"),
            )?;

            if element.is_blank_value(&candidate) {
                return Ok(());
            }
            items.push(candidate);
            index += 1;
        }
    }
}

/// Candidate variable names for a field: the explicit `env` name alone, or
/// the joined prefix path in declared case followed by its upper-cased
/// form. Declared case is tried first; preserve this order.
fn candidate_names(field: &FieldSchema, prefixes: &[String]) -> Vec<String> {
    if let Some(explicit) = field.env_name() {
        return vec![explicit.to_string()];
    }
    let mut segments: Vec<&str> = prefixes.iter().map(String::as_str).collect();
    segments.push(field.name());
    let joined = segments.join("_");
    let upper = joined.to_uppercase();
    if upper == joined {
        vec![joined]
    } else {
        vec![joined, upper]
    }
}

/// Extend the prefix path with the field's own segment, unless the field
/// is an anonymous embedding that opted out of prefixing.
fn extend_prefixes(prefixes: &[String], field: &FieldSchema) -> Vec<String> {
    let mut extended = prefixes.to_vec();
    if !field.is_anonymous() {
        extended.push(field.name().to_string());
    }
    extended
}

fn qualify(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, StructSchema};
    use crate::source::MapEnv;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn prefixes() -> Vec<String> {
        vec!["Strata".to_string()]
    }

    #[test]
    fn declared_case_candidate_wins_over_uppercase() {
        let schema =
            StructSchema::new("Config").field(FieldSchema::new("app_name", FieldKind::String));
        let env = MapEnv::new()
            .set("Strata_app_name", "declared")
            .set("STRATA_APP_NAME", "upper");
        let mut map = as_map(json!({"app_name": ""}));

        EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap();
        assert_eq!(map["app_name"], json!("declared"));
    }

    #[test]
    fn uppercase_candidate_is_tried_second() {
        let schema =
            StructSchema::new("Config").field(FieldSchema::new("app_name", FieldKind::String));
        let env = MapEnv::new().set("STRATA_APP_NAME", "upper");
        let mut map = as_map(json!({"app_name": "from-file"}));

        EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap();
        assert_eq!(map["app_name"], json!("upper"));
    }

    #[test]
    fn empty_env_values_are_skipped() {
        let schema =
            StructSchema::new("Config").field(FieldSchema::new("app_name", FieldKind::String));
        let env = MapEnv::new().set("STRATA_APP_NAME", "");
        let mut map = as_map(json!({"app_name": "kept"}));

        EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap();
        assert_eq!(map["app_name"], json!("kept"));
    }

    #[test]
    fn explicit_env_name_is_the_only_candidate() {
        let schema = StructSchema::new("Config")
            .field(FieldSchema::new("password", FieldKind::String).env("DB_PASSWORD"));
        let env = MapEnv::new()
            .set("DB_PASSWORD", "secret")
            .set("STRATA_PASSWORD", "ignored");
        let mut map = as_map(json!({"password": ""}));

        EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap();
        assert_eq!(map["password"], json!("secret"));
    }

    #[test]
    fn bool_fields_use_the_permissive_rule() {
        let schema = StructSchema::new("Config")
            .field(FieldSchema::new("a", FieldKind::Bool))
            .field(FieldSchema::new("b", FieldKind::Bool))
            .field(FieldSchema::new("c", FieldKind::Bool));
        let env = MapEnv::new()
            .set("STRATA_A", "1")
            .set("STRATA_B", "False")
            .set("STRATA_C", "anything");
        let mut map = as_map(json!({"a": false, "b": true, "c": false}));

        EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap();
        assert_eq!(
            Value::Object(map),
            json!({"a": true, "b": false, "c": true})
        );
    }

    #[test]
    fn string_fields_take_values_verbatim() {
        let schema =
            StructSchema::new("Config").field(FieldSchema::new("motd", FieldKind::String));
        let env = MapEnv::new().set("STRATA_MOTD", "Line one\nLine two\nLine three");
        let mut map = as_map(json!({"motd": ""}));

        EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap();
        assert_eq!(map["motd"], json!("Line one\nLine two\nLine three"));
    }

    #[test]
    fn numeric_parse_failures_name_the_variable() {
        let schema =
            StructSchema::new("Config").field(FieldSchema::new("port", FieldKind::Integer));
        let env = MapEnv::new().set("STRATA_PORT", "eighty-eighty");
        let mut map = as_map(json!({"port": 0}));

        let err = EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap_err();
        let LoadError::EnvParse { var, field, .. } = err else {
            panic!("expected an env parse error");
        };
        assert_eq!(var, "STRATA_PORT");
        assert_eq!(field, "port");
    }

    #[test]
    fn required_blank_field_aborts_with_its_path() {
        let inner = StructSchema::new("Db")
            .field(FieldSchema::new("password", FieldKind::String).required());
        let schema =
            StructSchema::new("Config").field(FieldSchema::new("db", FieldKind::Struct(inner)));
        let env = MapEnv::new();
        let mut map = as_map(json!({"db": {"password": ""}}));

        let err = EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap_err();
        assert!(matches!(err, LoadError::RequiredField { field } if field == "db.password"));
    }

    #[test]
    fn required_is_satisfied_by_an_env_override() {
        let schema = StructSchema::new("Config")
            .field(FieldSchema::new("password", FieldKind::String).required());
        let env = MapEnv::new().set("STRATA_PASSWORD", "from-env");
        let mut map = as_map(json!({"password": ""}));

        EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap();
        assert_eq!(map["password"], json!("from-env"));
    }

    #[test]
    fn nested_structs_extend_the_prefix_path() {
        let address = StructSchema::new("Address")
            .field(FieldSchema::new("street_name", FieldKind::String))
            .field(FieldSchema::new("city", FieldKind::String));
        let schema = StructSchema::new("Config")
            .field(FieldSchema::new("home_address", FieldKind::Struct(address)));
        let env = MapEnv::new().set("STRATA_HOME_ADDRESS_STREET_NAME", "abc");
        let mut map = as_map(json!({"home_address": {"street_name": "", "city": ""}}));

        EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap();
        assert_eq!(map["home_address"]["street_name"], json!("abc"));
    }

    #[test]
    fn anonymous_embedding_keeps_the_parent_prefix() {
        let meta = StructSchema::new("Meta")
            .field(FieldSchema::new("description", FieldKind::String));
        let schema = StructSchema::new("Config")
            .field(FieldSchema::new("meta", FieldKind::Struct(meta)).anonymous());
        let env = MapEnv::new().set("STRATA_DESCRIPTION", "environment description");
        let mut map = as_map(json!({"meta": {"description": ""}}));

        EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap();
        assert_eq!(map["meta"]["description"], json!("environment description"));
    }

    #[test]
    fn unallocated_optional_struct_is_skipped() {
        let inner = StructSchema::new("Db")
            .field(FieldSchema::new("password", FieldKind::String).required());
        let schema = StructSchema::new("Config")
            .field(FieldSchema::new("db", FieldKind::OptionalStruct(inner)));
        let env = MapEnv::new();
        let mut map = as_map(json!({"db": null}));

        // No descent into a null optional struct, so its required field
        // is not enforced.
        EnvBinder::new(&env, false)
            .bind(&mut map, &schema, &prefixes())
            .unwrap();
        assert_eq!(map["db"], Value::Null);
    }
}
