//! Sandbox configuration
//!
//! The configuration is built once at startup (from the environment, CLI flags,
//! or by hand) and handed to [`crate::Sandbox::open`]. Once the sandbox is open
//! the root is frozen.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_SANDBOX_DIR: &str = "SANDBOX_DIR";
pub const ENV_MAX_READ_BYTES: &str = "FSAGENT_MAX_READ_BYTES";
pub const ENV_MAX_BATCH_ITEMS: &str = "FSAGENT_MAX_BATCH_ITEMS";

/// Settings consumed when opening a sandbox
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SandboxConfig {
    /// Directory all operations are confined to
    pub root: PathBuf,
    /// Default byte limit for `read_file` when the caller passes none
    pub max_read_bytes: u64,
    /// Upper bound on the number of indices a sequence operation may cover
    pub max_batch_items: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("test_folder"),
            max_read_bytes: 200_000,
            max_batch_items: 10_000,
        }
    }
}

impl SandboxConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load settings from the process environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_SANDBOX_DIR).filter(|d| !d.trim().is_empty()) {
            config.root = PathBuf::from(dir.trim());
        }
        if let Some(raw) = lookup(ENV_MAX_READ_BYTES) {
            config.max_read_bytes = parse_number(ENV_MAX_READ_BYTES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_BATCH_ITEMS) {
            config.max_batch_items = parse_number(ENV_MAX_BATCH_ITEMS, &raw)?;
        }

        Ok(config)
    }

    pub fn with_max_read_bytes(mut self, limit: u64) -> Self {
        self.max_read_bytes = limit;
        self
    }

    pub fn with_max_batch_items(mut self, limit: usize) -> Self {
        self.max_batch_items = limit;
        self
    }

    /// Root with a leading `~` expanded to the home directory
    pub fn expanded_root(&self) -> PathBuf {
        expand_home(&self.root)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidArguments(format!("{} must be a non-negative integer, got {:?}", key, raw)))
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
