//! Schema descriptors for configuration structs.
//!
//! Responsibilities:
//! - Describe each field of a target struct: name, kind, and tag metadata
//!   (explicit env-var name, required flag, default literal, anonymous
//!   embedding).
//! - Provide blank-value synthesis and blank-value checks per kind, which
//!   drive default injection, required-field enforcement, and slice growth.
//! - Reject structurally malformed tag combinations before any binding runs.
//!
//! Does NOT handle:
//! - Parsing default literals (see `literal.rs`; bad literals surface while
//!   defaults are injected, not here).
//! - Walking configuration trees (see `loader/`).
//!
//! Invariants:
//! - Field order in a schema is declaration order and determines walk order.
//! - A field's blank value is the zero value of its declared kind; an
//!   optional struct is blank only while it is null (unallocated).

use serde_json::{Map, Value};
use thiserror::Error;

/// Types that describe their own configuration schema.
///
/// Implementations list every serde-visible field in declaration order.
/// The schema is consulted for file decoding (strict unknown-key checks),
/// default injection, and environment-variable binding.
pub trait Schematic {
    fn schema() -> StructSchema;
}

/// Structural problems in a schema, detected before loading starts.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("duplicate field `{field}` in {type_name}")]
    DuplicateField {
        type_name: &'static str,
        field: &'static str,
    },

    #[error("field `{field}` in {type_name} has an empty env name")]
    EmptyEnvName {
        type_name: &'static str,
        field: &'static str,
    },

    #[error("field `{field}` in {type_name} is anonymous but not struct-shaped")]
    AnonymousNonStruct {
        type_name: &'static str,
        field: &'static str,
    },
}

/// Schema for one struct-shaped configuration value.
#[derive(Debug, Clone)]
pub struct StructSchema {
    type_name: &'static str,
    fields: Vec<FieldSchema>,
}

impl StructSchema {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
        }
    }

    /// Append a field. Declaration order is walk order.
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field_named(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check the schema (recursively) for malformed tag combinations.
    ///
    /// Runs once per load, before any file or environment access.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    type_name: self.type_name,
                    field: field.name,
                });
            }
            if field.env == Some("") {
                return Err(SchemaError::EmptyEnvName {
                    type_name: self.type_name,
                    field: field.name,
                });
            }
            if field.anonymous && field.kind.struct_schema().is_none() {
                return Err(SchemaError::AnonymousNonStruct {
                    type_name: self.type_name,
                    field: field.name,
                });
            }
            if let Some(nested) = field.kind.struct_schema() {
                nested.validate()?;
            }
            if let FieldKind::Slice(inner) = &field.kind
                && let Some(nested) = inner.struct_schema()
            {
                nested.validate()?;
            }
        }
        Ok(())
    }

    /// The zero instance of this struct as a value tree: every declared
    /// field present and blank.
    pub fn blank_value(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len());
        for field in &self.fields {
            map.insert(field.name.to_string(), field.kind.blank_value());
        }
        Value::Object(map)
    }

    /// Whether a value tree equals the zero instance of this struct.
    ///
    /// Keys not declared in the schema are ignored, mirroring the fact
    /// that they do not exist on the typed value.
    pub fn is_blank_value(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Object(map) => self
                .fields
                .iter()
                .all(|f| f.kind.is_blank(map.get(f.name).unwrap_or(&Value::Null))),
            _ => false,
        }
    }
}

/// Declared kind of a configuration field.
///
/// `Scalar` covers everything without dedicated handling (maps, free-form
/// values); such fields are parsed as generic YAML literals and are blank
/// only while null.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Bool,
    String,
    Integer,
    Float,
    Scalar,
    /// Inline struct field; blank when every declared field is blank.
    Struct(StructSchema),
    /// `Option<T>` struct field, the pointer-to-struct analogue: blank only
    /// while null, allocated by default injection.
    OptionalStruct(StructSchema),
    Slice(Box<FieldKind>),
}

impl FieldKind {
    /// The zero value for this kind.
    pub fn blank_value(&self) -> Value {
        match self {
            FieldKind::Bool => Value::Bool(false),
            FieldKind::String => Value::String(String::new()),
            FieldKind::Integer => Value::from(0),
            FieldKind::Float => Value::from(0.0),
            FieldKind::Scalar | FieldKind::OptionalStruct(_) => Value::Null,
            FieldKind::Struct(schema) => schema.blank_value(),
            FieldKind::Slice(_) => Value::Array(Vec::new()),
        }
    }

    /// Whether `value` equals the zero value for this kind.
    ///
    /// Numeric blankness is value-based, so `0` and `0.0` are both blank
    /// for integer and float fields alike.
    pub fn is_blank(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            FieldKind::Bool => value == &Value::Bool(false),
            FieldKind::String => value.as_str() == Some(""),
            FieldKind::Integer | FieldKind::Float => value.as_f64() == Some(0.0),
            FieldKind::Scalar => false,
            FieldKind::Struct(schema) => schema.is_blank_value(value),
            // A non-null optional struct is allocated, hence not blank,
            // even when all of its fields are.
            FieldKind::OptionalStruct(_) => false,
            FieldKind::Slice(_) => value.as_array().is_some_and(|a| a.is_empty()),
        }
    }

    /// The nested struct schema for struct-shaped kinds.
    pub fn struct_schema(&self) -> Option<&StructSchema> {
        match self {
            FieldKind::Struct(schema) | FieldKind::OptionalStruct(schema) => Some(schema),
            _ => None,
        }
    }

    /// Short kind name for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Scalar => "scalar",
            FieldKind::Struct(_) => "struct",
            FieldKind::OptionalStruct(_) => "optional struct",
            FieldKind::Slice(_) => "slice",
        }
    }
}

/// Schema for one field: declared name plus tag metadata.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: &'static str,
    kind: FieldKind,
    env: Option<&'static str>,
    required: bool,
    default: Option<&'static str>,
    anonymous: bool,
}

impl FieldSchema {
    /// A plain field with no tag metadata. `name` must match the field's
    /// serde name, since it doubles as the tree key and the env segment.
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            env: None,
            required: false,
            default: None,
            anonymous: false,
        }
    }

    /// Bind this field to a single explicit environment variable instead
    /// of the derived prefix-path candidates.
    pub fn env(mut self, name: &'static str) -> Self {
        self.env = Some(name);
        self
    }

    /// Fail the load when this field is still blank after files, defaults,
    /// and environment overrides.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Literal assigned when the field is blank after file loading.
    /// Parsed as a YAML literal, except for string fields which take the
    /// literal verbatim.
    pub fn default_value(mut self, literal: &'static str) -> Self {
        self.default = Some(literal);
        self
    }

    /// Suppress this field's segment in derived environment-variable
    /// names, for embedded structs whose fields should read as the
    /// parent's own. Only valid on struct-shaped fields.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn env_name(&self) -> Option<&'static str> {
        self.env
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_literal(&self) -> Option<&'static str> {
        self.default
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }
}
