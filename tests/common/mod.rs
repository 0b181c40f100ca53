// tests/common/mod.rs

//! Shared utilities for integration tests.

use anyhow::Result;
use std::path::Path;
use tempfile::TempDir;

/// Create a temporary test directory.
pub fn test_dir() -> Result<TempDir> {
    tempfile::tempdir().map_err(|e| anyhow::anyhow!("Failed to create temp dir: {}", e))
}

/// Path to a stash file inside `dir`.
pub fn stash_path(dir: &Path) -> String {
    dir.join("stash.json").to_string_lossy().into_owned()
}
