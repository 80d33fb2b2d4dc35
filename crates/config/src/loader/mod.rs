//! Configuration loading pipeline.
//!
//! Responsibilities:
//! - Drive the full load: resolve files, decode and overlay them, inject
//!   defaults, bind environment overrides, hydrate the target, validate.
//! - Resolve the runtime environment and env-var prefix, including their
//!   `STRATA_*` control variables.
//! - Enforce the `DOTENV_DISABLED` gate before any `.env` loading.
//!
//! Does NOT handle:
//! - Per-stage mechanics (see `resolve.rs`, `decode.rs`, `defaults.rs`,
//!   `bind.rs`).
//!
//! Invariants / Assumptions:
//! - Stage order is fixed: resolve, load, defaults, env, validate; later
//!   stages never run after a fatal error.
//! - `debug`/`verbose`/`silent` affect diagnostics only, never the bound
//!   result.
//! - A load either completes or returns an error; the caller's typed
//!   value is only written on success.

mod bind;
mod decode;
mod defaults;
mod error;
mod resolve;

#[cfg(test)]
mod tests;

pub use error::LoadError;
pub use resolve::{FileOrigin, ResolvedFile};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use validator::Validate;

use crate::schema::{Schematic, StructSchema};
use crate::source::{DirSource, EnvSource, FileSource, ProcessEnv};
use crate::{validate, value};

/// Environment variable naming the runtime environment.
pub const ENV_VAR: &str = "STRATA_ENV";
/// Environment variable overriding the env-var name prefix.
pub const ENV_PREFIX_VAR: &str = "STRATA_ENV_PREFIX";
/// Default env-var name prefix, in declared case.
pub const DEFAULT_ENV_PREFIX: &str = "Strata";
/// Sentinel prefix value that disables prefixing entirely.
pub const NO_PREFIX: &str = "-";

const DEBUG_MODE_VAR: &str = "STRATA_DEBUG_MODE";
const VERBOSE_MODE_VAR: &str = "STRATA_VERBOSE_MODE";
const SILENT_MODE_VAR: &str = "STRATA_SILENT_MODE";

/// Loader settings. Flags left unset here can still be forced through the
/// corresponding `STRATA_*_MODE` control variables.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Runtime environment name; inferred when empty (see
    /// [`Loader::environment`]).
    pub environment: Option<String>,
    /// Env-var name prefix; [`NO_PREFIX`] disables prefixing.
    pub env_prefix: Option<String>,
    /// Log per-stage progress.
    pub debug: bool,
    /// Log per-field binding attempts.
    pub verbose: bool,
    /// Suppress file-resolution notices.
    pub silent: bool,
    /// Reject file keys that match no schema field.
    pub error_on_unmatched_keys: bool,
}

/// Loads layered configuration into typed values.
///
/// Construction is cheap; a `Loader` can be reused across loads. File and
/// environment access go through injected sources, defaulting to the real
/// filesystem and process environment.
pub struct Loader {
    options: Options,
    env: Box<dyn EnvSource>,
    files: Box<dyn FileSource>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Loader {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            env: Box::new(ProcessEnv),
            files: Box::new(DirSource::new()),
        }
    }

    /// Replace the environment source (deterministic tests).
    pub fn with_env_source(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Replace the file source (embedded archives, rooted directories).
    pub fn with_file_source(mut self, files: impl FileSource + 'static) -> Self {
        self.files = Box::new(files);
        self
    }

    /// Load environment variables from a `.env` file if present.
    ///
    /// If the `DOTENV_DISABLED` variable is set to "true" or "1", the
    /// `.env` file is not loaded (useful for testing).
    pub fn load_dotenv(self) -> Self {
        let disabled = matches!(
            self.env.var("DOTENV_DISABLED").as_deref(),
            Some("true") | Some("1")
        );
        if !disabled {
            dotenvy::dotenv().ok();
        }
        self
    }

    /// The effective runtime environment: the explicit option, else
    /// [`ENV_VAR`], else `"test"` when the program name looks like a test
    /// binary, else `"development"`.
    pub fn environment(&self) -> String {
        if let Some(environment) = &self.options.environment
            && !environment.is_empty()
        {
            return environment.clone();
        }
        if let Some(environment) = self.env.var(ENV_VAR)
            && !environment.is_empty()
        {
            return environment;
        }
        if let Some(name) = self.env.program_name()
            && looks_like_test_binary(&name)
        {
            return "test".to_string();
        }
        "development".to_string()
    }

    /// The effective env-var prefix: the explicit option, else
    /// [`ENV_PREFIX_VAR`], else [`DEFAULT_ENV_PREFIX`].
    pub fn env_prefix(&self) -> String {
        if let Some(prefix) = &self.options.env_prefix
            && !prefix.is_empty()
        {
            return prefix.clone();
        }
        if let Some(prefix) = self.env.var(ENV_PREFIX_VAR)
            && !prefix.is_empty()
        {
            return prefix;
        }
        DEFAULT_ENV_PREFIX.to_string()
    }

    pub fn debug(&self) -> bool {
        self.flag(self.options.debug, DEBUG_MODE_VAR)
    }

    pub fn verbose(&self) -> bool {
        self.flag(self.options.verbose, VERBOSE_MODE_VAR)
    }

    pub fn silent(&self) -> bool {
        self.flag(self.options.silent, SILENT_MODE_VAR)
    }

    fn flag(&self, option: bool, var: &str) -> bool {
        option || self.env.var(var).is_some_and(|v| !v.is_empty())
    }

    /// Load configuration into `target` from the requested base files.
    ///
    /// `target`'s current contents are the bottom layer: files overlay it,
    /// defaults fill what is still blank, environment variables override,
    /// and validation runs last. On error the target is left untouched.
    pub fn load<T>(&self, target: &mut T, files: &[&str]) -> Result<(), LoadError>
    where
        T: Schematic + Serialize + DeserializeOwned + Validate,
    {
        let schema = T::schema();
        schema.validate().map_err(|source| LoadError::Schema {
            type_name: schema.type_name(),
            source,
        })?;

        let debug_enabled = self.debug() || self.verbose();
        let environment = self.environment();
        if debug_enabled {
            debug!(%environment, "loading configuration");
        }

        // Snapshot the target so pre-populated fields participate in the
        // overlay instead of being reset.
        let snapshot = serde_json::to_value(&*target).map_err(|e| LoadError::Snapshot {
            type_name: schema.type_name(),
            message: e.to_string(),
        })?;
        let mut tree = match snapshot {
            Value::Object(map) => map,
            other => {
                return Err(LoadError::Snapshot {
                    type_name: schema.type_name(),
                    message: format!("expected a struct-shaped target, got {other}"),
                });
            }
        };

        let outcome = self.overlay(&mut tree, &schema, files, &environment, debug_enabled);
        // The dump also covers failed attempts, showing the tree as it
        // stood when the stage aborted.
        if debug_enabled {
            let assembled = Value::Object(tree.clone());
            match &outcome {
                Ok(()) => debug!(configuration = %assembled, "configuration after binding"),
                Err(error) => {
                    debug!(configuration = %assembled, %error, "configuration load failed");
                }
            }
        }
        outcome?;

        *target =
            serde_json::from_value(Value::Object(tree)).map_err(|source| LoadError::Hydrate {
                type_name: schema.type_name(),
                source,
            })?;

        validate::check(target)
    }

    /// Overlay the resolved files onto `tree`, inject defaults, and bind
    /// environment overrides.
    fn overlay(
        &self,
        tree: &mut Map<String, Value>,
        schema: &StructSchema,
        files: &[&str],
        environment: &str,
        debug_enabled: bool,
    ) -> Result<(), LoadError> {
        for resolved in resolve::resolve(files, environment, self.files.as_ref(), self.silent()) {
            if debug_enabled {
                debug!(path = %resolved.path.display(), origin = ?resolved.origin, "loading file");
            }
            let data = self
                .files
                .read(&resolved.path)
                .map_err(|source| LoadError::Read {
                    path: resolved.path.clone(),
                    source,
                })?;
            let layer = decode::decode_file(
                &resolved.path,
                &data,
                schema,
                self.options.error_on_unmatched_keys,
            )?;
            let mut merged = Value::Object(std::mem::take(tree));
            value::deep_merge(&mut merged, layer);
            let Value::Object(map) = merged else {
                unreachable!("deep_merge preserves the mapping shape");
            };
            *tree = map;
        }

        defaults::inject(tree, schema)?;

        let prefix = self.env_prefix();
        let prefixes: Vec<String> = if prefix == NO_PREFIX {
            Vec::new()
        } else {
            vec![prefix]
        };
        bind::EnvBinder::new(self.env.as_ref(), self.verbose()).bind(tree, schema, &prefixes)
    }
}

/// Load configuration with a default [`Loader`].
pub fn load<T>(target: &mut T, files: &[&str]) -> Result<(), LoadError>
where
    T: Schematic + Serialize + DeserializeOwned + Validate,
{
    Loader::default().load(target, files)
}

/// The runtime environment a default [`Loader`] would use.
pub fn environment() -> String {
    Loader::default().environment()
}

/// Mirrors the original test-binary pattern: a name containing `_test` or
/// ending in `.test`.
fn looks_like_test_binary(name: &str) -> bool {
    name.contains("_test") || name.ends_with(".test")
}
