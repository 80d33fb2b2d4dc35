//! End-to-end tests for the configuration loading pipeline.
//!
//! Responsibilities:
//! - Test full loads through `Loader::load`: files, overlays, defaults,
//!   environment overrides, strict mode, and validation.
//! - Test environment and prefix resolution, including control variables.
//!
//! Does NOT handle:
//! - Per-stage mechanics (tested in each stage's own module).
//!
//! Invariants:
//! - Tests touching the process environment use `serial_test` plus
//!   `global_test_lock()`; everything else runs on injected sources and
//!   stays parallel-safe.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::sync::Mutex;

pub mod fixtures;

/// Returns the global test lock for process-environment isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}
