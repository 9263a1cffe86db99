//! Path containment for the sandbox root

use crate::error::{Result, SandboxError};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Symlink hops followed before a path is rejected as a loop
const MAX_LINK_HOPS: u32 = 40;

/// Resolves caller-supplied paths and rejects anything that lands outside the root.
///
/// Resolution walks the path one component at a time starting from the root
/// (or from `/` for absolute input). `.` is dropped, `..` pops the already
/// resolved parent, and every existing symlink is replaced by its target before
/// the walk continues, so the containment check always sees the real location.
/// Components that do not exist yet are appended as-is.
#[derive(Debug, Clone)]
pub struct SandboxGuard {
    root: PathBuf,
}

impl SandboxGuard {
    /// Create a guard for an existing directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|e| SandboxError::os(root, e))?;

        if !canonical.is_dir() {
            return Err(SandboxError::WrongType(format!(
                "sandbox root {:?} is not a directory",
                canonical
            ))
            .into());
        }

        Ok(Self { root: canonical })
    }

    /// Canonical sandbox root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `raw` to an absolute path inside the sandbox
    pub fn resolve(&self, raw: impl AsRef<Path>) -> Result<PathBuf> {
        let raw = raw.as_ref();
        let resolved = Self::walk(self.root.clone(), raw, 0)?;

        if self.contains(&resolved) {
            Ok(resolved)
        } else {
            warn!("Rejected path outside sandbox: {:?} -> {:?}", raw, resolved);
            Err(SandboxError::PathEscape {
                path: raw.to_string_lossy().to_string(),
                root: self.root.clone(),
            }
            .into())
        }
    }

    /// Whether an already resolved path is the root or below it
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// Whether a resolved path is the sandbox root itself
    pub fn is_root(&self, path: &Path) -> bool {
        path == self.root
    }

    /// Render a resolved path relative to the root for user-facing messages
    pub fn display(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => path.to_string_lossy().to_string(),
        }
    }

    fn walk(mut resolved: PathBuf, path: &Path, hops: u32) -> Result<PathBuf> {
        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    resolved.push(component.as_os_str());
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => {
                    let candidate = resolved.join(name);
                    let is_link = fs::symlink_metadata(&candidate)
                        .map(|meta| meta.file_type().is_symlink())
                        .unwrap_or(false);

                    if !is_link {
                        resolved = candidate;
                        continue;
                    }

                    if hops >= MAX_LINK_HOPS {
                        return Err(SandboxError::InvalidPath(format!(
                            "too many levels of symbolic links at {:?}",
                            candidate
                        ))
                        .into());
                    }

                    let target = fs::read_link(&candidate)
                        .map_err(|e| SandboxError::os(&candidate, e))?;
                    // Relative targets are relative to the link's own folder, which is `resolved`
                    resolved = Self::walk(resolved, &target, hops + 1)?;
                }
            }
        }

        Ok(resolved)
    }
}
