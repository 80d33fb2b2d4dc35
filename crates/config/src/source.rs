//! Environment and file access capabilities.
//!
//! Responsibilities:
//! - Abstract process-environment reads behind [`EnvSource`] so binding is
//!   deterministic and parallel-safe under test.
//! - Abstract raw file access behind [`FileSource`], with a plain
//!   filesystem implementation and an embedded in-memory archive.
//!
//! Does NOT handle:
//! - Deciding which files apply for an environment (see `loader/resolve.rs`).
//! - Decoding file contents (see `loader/decode.rs`).
//!
//! Invariants:
//! - Sources are read-only; the engine never writes to the environment or
//!   to any file.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};

/// Read-only access to environment variables and the program's identity.
pub trait EnvSource: Send + Sync {
    /// The variable's value, or `None` when unset. Callers treat empty
    /// values as unset.
    fn var(&self, key: &str) -> Option<String>;

    /// The running program's name (argv[0]); used to infer the `test`
    /// runtime environment.
    fn program_name(&self) -> Option<String> {
        None
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn program_name(&self) -> Option<String> {
        std::env::args().next()
    }
}

/// A fixed set of environment variables, for hermetic tests.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
    program_name: Option<String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = Some(name.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn program_name(&self) -> Option<String> {
        self.program_name.clone()
    }
}

/// Read-only access to raw configuration bytes by logical path.
pub trait FileSource: Send + Sync {
    /// Whether `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// The file's raw bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Plain filesystem access, optionally rooted at a directory.
#[derive(Debug, Clone, Default)]
pub struct DirSource {
    root: Option<PathBuf>,
}

impl DirSource {
    /// Resolve paths relative to the current working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve paths relative to `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => path.to_path_buf(),
        }
    }
}

impl FileSource for DirSource {
    fn is_file(&self, path: &Path) -> bool {
        self.full_path(path).is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(self.full_path(path))
    }
}

/// An in-memory archive of configuration files, typically populated from
/// `include_bytes!` entries so configuration ships inside the binary.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedSource {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl EmbeddedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.add(path, bytes);
        self
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }
}

impl FileSource for EmbeddedSource {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no embedded file {}", path.display()),
            )
        })
    }
}
