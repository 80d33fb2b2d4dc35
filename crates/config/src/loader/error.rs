//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define error variants for every stage of the load pipeline: file
//!   reads, decoding, strict unknown-key rejection, default injection,
//!   environment binding, hydration, and validation.
//! - Carry enough context (paths, field paths, variable names) to point at
//!   the offending source without re-running the load.
//!
//! Invariants:
//! - The pipeline is fail-fast: the first fatal error aborts the remaining
//!   stages and is returned unchanged.
//! - File-resolution misses are NOT errors; they are logged notices and
//!   downstream stages simply see fewer files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::literal::LiteralError;
use crate::schema::SchemaError;
use crate::validate::Violations;

/// Errors that can occur during a configuration load.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The schema descriptor itself is malformed; nothing was loaded.
    #[error("invalid configuration schema for {type_name}: {source}")]
    Schema {
        type_name: &'static str,
        #[source]
        source: SchemaError,
    },

    /// The target value could not be serialized into an overlay tree.
    #[error("failed to snapshot {type_name} for overlay: {message}")]
    Snapshot {
        type_name: &'static str,
        message: String,
    },

    /// A resolved file could not be read.
    #[error("failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file's content could not be decoded in any accepted format.
    #[error("failed to decode configuration file {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Strict mode found a key with no corresponding schema field.
    /// Fatal even when a lenient decode of the same file would succeed.
    #[error("unknown key `{key}` in configuration file {path}")]
    UnknownKey { path: PathBuf, key: String },

    /// A declared default literal does not fit its field's kind.
    #[error("invalid default for field `{field}`: {source}")]
    DefaultParse {
        field: String,
        #[source]
        source: LiteralError,
    },

    /// An environment variable's value does not fit its field's kind.
    #[error("invalid value in {var} for field `{field}`: {source}")]
    EnvParse {
        var: String,
        field: String,
        #[source]
        source: LiteralError,
    },

    /// A required field is still blank after files, defaults, and
    /// environment overrides.
    #[error("{field} is required, but blank")]
    RequiredField { field: String },

    /// The fully-bound tree does not deserialize into the target type.
    #[error("configuration does not fit {type_name}")]
    Hydrate {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The bound value failed its validation rules.
    #[error("configuration validation failed: {0}")]
    Validation(Violations),
}
