//! File resolution: which concrete files apply for a load.
//!
//! Responsibilities:
//! - For each requested base name, in request order, find the base file,
//!   its environment-suffixed overlay, and the `.example` fallback.
//! - Emit non-fatal notices for misses and example fallbacks.
//!
//! Does NOT handle:
//! - Reading or decoding file contents (see `decode.rs`).
//!
//! Invariants:
//! - Output preserves request order; within one request the base file
//!   precedes the environment-suffixed file.
//! - One request yields zero, one, or two files; the example fallback is
//!   only used when neither base nor environment file exists, so it never
//!   coexists with them.
//! - Resolution never fails; an empty result is legitimate.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::source::FileSource;

/// Why a resolved file was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOrigin {
    /// The requested file itself.
    Base,
    /// The `<base>.<environment>.<ext>` overlay.
    Environment,
    /// The `<base>.example.<ext>` fallback.
    Example,
}

/// One concrete file selected for loading.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub origin: FileOrigin,
}

/// Insert `suffix` immediately before the file's extension, or append it
/// when there is none: `db.yml` -> `db.production.yml`, `db` ->
/// `db.production`.
pub(crate) fn with_suffix(file: &str, suffix: &str) -> PathBuf {
    match Path::new(file).extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let stem = &file[..file.len() - ext.len() - 1];
            PathBuf::from(format!("{stem}.{suffix}.{ext}"))
        }
        None => PathBuf::from(format!("{file}.{suffix}")),
    }
}

/// Compute the ordered list of concrete files for the requested names.
pub(crate) fn resolve(
    files: &[&str],
    environment: &str,
    source: &dyn FileSource,
    silent: bool,
) -> Vec<ResolvedFile> {
    let mut resolved = Vec::new();

    for file in files {
        let mut found = false;

        let base = Path::new(file);
        if source.is_file(base) {
            found = true;
            debug!(path = %base.display(), "using configuration file");
            resolved.push(ResolvedFile {
                path: base.to_path_buf(),
                origin: FileOrigin::Base,
            });
        }

        let with_env = with_suffix(file, environment);
        if source.is_file(&with_env) {
            found = true;
            debug!(path = %with_env.display(), environment, "using environment overlay");
            resolved.push(ResolvedFile {
                path: with_env,
                origin: FileOrigin::Environment,
            });
        }

        if !found {
            let example = with_suffix(file, "example");
            if source.is_file(&example) {
                if !silent {
                    warn!(
                        requested = file,
                        example = %example.display(),
                        "configuration not found, using example file"
                    );
                }
                resolved.push(ResolvedFile {
                    path: example,
                    origin: FileOrigin::Example,
                });
            } else if !silent {
                warn!(requested = file, "configuration not found");
            }
        }
    }

    resolved
}
