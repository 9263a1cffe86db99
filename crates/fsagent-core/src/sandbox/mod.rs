//! File system sandbox
//!
//! This module provides:
//! - Path containment for the sandbox root
//! - Single-file and single-folder operations behind that check
//! - Directory listings

mod filesystem;
mod folders;
mod guard;
mod listing;

pub use filesystem::FileOps;
pub use folders::FolderOps;
pub use guard::SandboxGuard;
pub use listing::Listing;

pub(crate) use filesystem::io_error;

use crate::config::SandboxConfig;
use crate::error::{Result, SandboxError};
use std::fs;
use tracing::info;

/// An opened sandbox: the frozen root plus the limits it was opened with
#[derive(Debug, Clone)]
pub struct Sandbox {
    guard: SandboxGuard,
    config: SandboxConfig,
}

impl Sandbox {
    /// Create the root folder if needed and freeze it
    pub fn open(config: SandboxConfig) -> Result<Self> {
        let root = config.expanded_root();
        fs::create_dir_all(&root).map_err(|e| SandboxError::os(&root, e))?;

        let guard = SandboxGuard::new(&root)?;
        info!("Sandbox root: {:?}", guard.root());

        Ok(Self { guard, config })
    }

    pub fn guard(&self) -> &SandboxGuard {
        &self.guard
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }
}
