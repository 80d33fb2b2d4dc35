//! Shared fixtures for the loader tests: a realistic application
//! configuration with nested structs, an optional struct, slices, defaults,
//! required fields, and an anonymous embedding.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::loader::{Loader, Options};
use crate::schema::{FieldKind, FieldSchema, Schematic, StructSchema};
use crate::source::{EmbeddedSource, MapEnv};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    pub app_name: String,
    pub hosts: Vec<String>,
    pub db: Option<Database>,
    pub contacts: Vec<Contact>,
    pub meta: Meta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Database {
    pub name: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub ssl: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Meta {
    pub description: String,
}

impl Schematic for AppConfig {
    fn schema() -> StructSchema {
        StructSchema::new("AppConfig")
            .field(FieldSchema::new("app_name", FieldKind::String).default_value("strata"))
            .field(FieldSchema::new(
                "hosts",
                FieldKind::Slice(Box::new(FieldKind::String)),
            ))
            .field(FieldSchema::new(
                "db",
                FieldKind::OptionalStruct(Database::schema()),
            ))
            .field(FieldSchema::new(
                "contacts",
                FieldKind::Slice(Box::new(FieldKind::Struct(Contact::schema()))),
            ))
            .field(FieldSchema::new("meta", FieldKind::Struct(Meta::schema())).anonymous())
    }
}

impl Schematic for Database {
    fn schema() -> StructSchema {
        StructSchema::new("Database")
            .field(FieldSchema::new("name", FieldKind::String))
            .field(FieldSchema::new("user", FieldKind::String).default_value("root"))
            .field(
                FieldSchema::new("password", FieldKind::String)
                    .required()
                    .env("DB_PASSWORD"),
            )
            .field(FieldSchema::new("port", FieldKind::Integer).default_value("3306"))
            .field(FieldSchema::new("ssl", FieldKind::Bool).default_value("true"))
    }
}

impl Schematic for Contact {
    fn schema() -> StructSchema {
        StructSchema::new("Contact")
            .field(FieldSchema::new("name", FieldKind::String).default_value("sumo"))
            .field(FieldSchema::new("email", FieldKind::String).required())
    }
}

impl Schematic for Meta {
    fn schema() -> StructSchema {
        StructSchema::new("Meta").field(FieldSchema::new("description", FieldKind::String))
    }
}

/// A fully-populated configuration, the way a production file would spell
/// it out.
pub fn populated() -> AppConfig {
    AppConfig {
        app_name: "config-demo".to_string(),
        hosts: vec![
            "http://example.org".to_string(),
            "http://dev.example.org".to_string(),
        ],
        db: Some(Database {
            name: "demo".to_string(),
            user: "demo-user".to_string(),
            password: "demo-password".to_string(),
            port: 3306,
            ssl: true,
        }),
        contacts: vec![Contact {
            name: "Maja".to_string(),
            email: "maja@example.org".to_string(),
        }],
        meta: Meta {
            description: "demo configuration".to_string(),
        },
    }
}

pub fn to_yaml(config: &AppConfig) -> Vec<u8> {
    serde_yaml::to_string(config).unwrap().into_bytes()
}

pub fn to_json(config: &AppConfig) -> Vec<u8> {
    serde_json::to_vec(config).unwrap()
}

/// A loader wired to hermetic sources.
pub fn loader(options: Options, env: MapEnv, files: EmbeddedSource) -> Loader {
    Loader::new(options)
        .with_env_source(env)
        .with_file_source(files)
}
