//! Pattern-matched bulk delete

use crate::error::{Error, Result, SandboxError};
use crate::sandbox::{io_error, SandboxGuard};
use crate::types::{BatchReport, ItemOutcome};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SEPARATORS: &[char] = &['/', '\\'];

pub struct GlobDeleter;

impl GlobDeleter {
    /// Delete every file matching `pattern`, relative to the sandbox root.
    ///
    /// Matched folders are reported as skipped, never removed. A matched
    /// symlink is removed itself; its target is left alone. Failures are
    /// recorded and the batch continues.
    pub fn delete(guard: &SandboxGuard, pattern: &str) -> Result<BatchReport> {
        let full_pattern = rooted_pattern(guard, pattern)?;
        debug!("Expanding delete pattern: {}", full_pattern);

        let matches = glob::glob(&full_pattern)?;
        let mut report = BatchReport::new("delete_glob");
        let mut seen = HashSet::new();

        for entry in matches {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    let failed_path = e.path().to_path_buf();
                    let shown = guard.display(&failed_path);
                    let err: Error = SandboxError::os(&failed_path, e.into()).into();
                    warn!("Glob match {} unreadable: {}", shown, err);
                    report.push(None, None, shown, ItemOutcome::failed(&err));
                    continue;
                }
            };

            let matched = match locate(guard, &path) {
                Ok(matched) => matched,
                Err(e) => {
                    warn!("Glob match {:?} rejected: {}", path, e);
                    report.push(None, None, path.to_string_lossy().to_string(), ItemOutcome::failed(&e));
                    continue;
                }
            };
            if !seen.insert(matched.clone()) {
                continue;
            }

            let shown = guard.display(&matched);
            let outcome = match remove_match(guard, &matched) {
                Ok(Removed::File) => ItemOutcome::Succeeded,
                Ok(Removed::SkippedFolder) => ItemOutcome::Skipped {
                    reason: "is a folder; use delete_folder".to_string(),
                },
                Err(e) => {
                    warn!("Glob delete of {} failed: {}", shown, e);
                    ItemOutcome::failed(&e)
                }
            };
            report.push(None, None, shown, outcome);
        }

        info!(
            "Glob delete {:?}: {} deleted, {} skipped, {} failed",
            pattern,
            report.succeeded(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }
}

enum Removed {
    File,
    SkippedFolder,
}

/// Containment-checked location of the matched entry itself. Only the parent
/// goes through symlink resolution, so a matched link stays a link.
fn locate(guard: &SandboxGuard, path: &Path) -> Result<PathBuf> {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let located = guard.resolve(parent)?.join(name);
            if guard.contains(&located) {
                Ok(located)
            } else {
                Err(SandboxError::PathEscape {
                    path: path.to_string_lossy().to_string(),
                    root: guard.root().to_path_buf(),
                }
                .into())
            }
        }
        _ => guard.resolve(path),
    }
}

fn remove_match(guard: &SandboxGuard, path: &Path) -> Result<Removed> {
    let metadata = fs::symlink_metadata(path).map_err(|e| io_error(guard, path, e))?;
    if metadata.is_dir() {
        return Ok(Removed::SkippedFolder);
    }

    debug!("Deleting glob match: {:?}", path);
    fs::remove_file(path).map_err(|e| io_error(guard, path, e))?;
    info!("Deleted: {:?}", path);
    Ok(Removed::File)
}

/// Anchor a caller pattern at the sandbox root. Leading separators, and a leading
/// copy of the root itself, are stripped so absolute-looking input stays inside.
fn rooted_pattern(guard: &SandboxGuard, pattern: &str) -> Result<String> {
    let trimmed = pattern.trim();
    let root = guard.root().to_string_lossy();

    // The root counts as a prefix only when a separator follows it
    let relative = match trimmed.strip_prefix(root.as_ref()) {
        Some(rest) if rest.starts_with(SEPARATORS) => rest,
        _ => trimmed,
    }
    .trim_start_matches(SEPARATORS);

    if relative.is_empty() {
        return Err(SandboxError::InvalidPattern("pattern must name entries inside the sandbox".to_string()).into());
    }

    // Validate the caller's part on its own so errors point at their input
    glob::Pattern::new(relative)?;

    Ok(format!("{}/{}", glob::Pattern::escape(&root), relative))
}
