//! Layered configuration loading for statically-typed settings structs.
//!
//! This crate assembles one typed configuration value from several layered
//! sources with a fixed precedence order: base files, environment-suffixed
//! overlay files, shell environment variables, and declared default
//! literals, followed by a validation pass.
//!
//! The walk over the target value is driven by a [`StructSchema`]
//! descriptor (see the [`Schematic`] trait) rather than runtime
//! reflection, so field ordering, tag semantics, and blank-value rules are
//! explicit data the engine operates on.

pub mod schema;
pub mod source;

mod literal;
mod loader;
mod validate;
mod value;

pub use literal::LiteralError;
pub use loader::{FileOrigin, LoadError, Loader, Options, ResolvedFile, environment, load};
pub use schema::{FieldKind, FieldSchema, SchemaError, Schematic, StructSchema};
pub use source::{DirSource, EmbeddedSource, EnvSource, FileSource, MapEnv, ProcessEnv};
pub use validate::{Violation, Violations};

// Re-exported so targets can derive validation rules without depending on
// the validator crate directly.
pub use validator::Validate;
