//! Test support utilities for syncrets integration tests.
//!
//! Provides isolated test environments, a fake Vault server and helper
//! commands.

#![allow(dead_code)]

pub mod vault;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use vault::FakeVault;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own working directory and home directory. Child
/// processes use `.current_dir()`, so tests can run in parallel.
pub struct Test {
    /// Working directory holding `syncrets.toml` and outputs
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        Self { dir, home }
    }

    /// Create a test environment whose `syncrets.toml` holds `config`.
    pub fn with_config(config: &str) -> Self {
        let t = Self::new();
        t.write("syncrets.toml", config);
        t
    }

    /// Write a file relative to the working directory.
    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.path(name), contents).expect("failed to write test file");
    }

    /// Read a file relative to the working directory.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).expect("failed to read test file")
    }

    /// Absolute path of `name` in the working directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Config table for a vault alias using token auth with a cache file.
pub fn token_alias(alias: &str, url: &str) -> String {
    format!(
        "[vault.{alias}]\nurl = \"{url}\"\n\n[vault.{alias}.auth]\nmethod = \"token\"\n\n[vault.{alias}.token]\nfile = \"{alias}-token\"\n\n"
    )
}
