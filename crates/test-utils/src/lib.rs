//! Shared test utilities for stdsync crates.
//!
//! This crate provides an in-memory remote, sample documents and environment
//! helpers used across the stdsync workspace.

mod fake;

pub use fake::{Call, FakeRemote};

use std::path::{Path, PathBuf};

use stdsync_model::TargetConfig;

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = stdsync_test_utils::set_env_var("CODACY_PROVIDER", Some("gl"));
/// // CODACY_PROVIDER is "gl" until _guard drops
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// The single-tool document used by the `acme`/`baseline` scenario.
pub const ACME_BASELINE_CONFIG: &str = r#"{
  "languages": ["python"],
  "tools": [
    {
      "uuid": "t1",
      "isEnabled": true,
      "patterns": [
        {"patternDefinition": {"id": "p1"}, "enabled": true, "parameters": {}}
      ]
    }
  ]
}"#;

/// A richer document: a parameterised pattern, a disabled tool with patterns
/// that must never be pushed, and a pattern the remote does not know.
pub const MIXED_CONFIG: &str = r#"{
  "languages": ["python", "javascript"],
  "tools": [
    {
      "uuid": "pylint",
      "isEnabled": true,
      "patterns": [
        {"patternDefinition": {"id": "line-too-long"}, "parameters": {"max-line-length": 120}},
        {"patternDefinition": {"id": "unused-import"}, "enabled": false},
        {"patternDefinition": {"id": "retired-rule"}}
      ]
    },
    {
      "uuid": "eslint",
      "isEnabled": false,
      "patterns": [
        {"patternDefinition": {"id": "no-console"}}
      ]
    },
    {
      "uuid": "bandit",
      "patterns": [
        {"patternDefinition": {"id": "B101"}}
      ]
    }
  ]
}"#;

/// Remote catalog matching [`MIXED_CONFIG`], minus `retired-rule`.
pub fn mixed_remote() -> FakeRemote {
    FakeRemote::new()
        .with_catalog_tool("pylint", &["line-too-long", "unused-import", "missing-docstring"])
        .with_catalog_tool("eslint", &["no-console", "eqeqeq"])
        .with_catalog_tool("bandit", &["B101", "B602"])
}

pub fn acme_target() -> TargetConfig {
    TargetConfig::parse(ACME_BASELINE_CONFIG).expect("sample config parses")
}

pub fn mixed_target() -> TargetConfig {
    TargetConfig::parse(MIXED_CONFIG).expect("sample config parses")
}

/// Temporary working directory for document files.
///
/// The tempdir is automatically cleaned up when this struct is dropped.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
}

impl TestFixture {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            tempdir: tempfile::tempdir()?,
        })
    }

    /// Path of `name` inside the fixture directory; nothing is created.
    pub fn path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.tempdir.path().join(name)
    }

    /// Writes `content` to `name` and returns its path.
    pub fn write(&self, name: &str, content: &str) -> std::io::Result<PathBuf> {
        let path = self.path(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    pub fn read_json(&self, name: &str) -> std::io::Result<serde_json::Value> {
        let text = std::fs::read_to_string(self.path(name))?;
        serde_json::from_str(&text).map_err(std::io::Error::other)
    }
}
