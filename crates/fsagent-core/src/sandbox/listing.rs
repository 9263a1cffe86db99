//! Directory listings (flat and tree)

use super::filesystem::io_error;
use super::guard::SandboxGuard;
use crate::error::Result;
use crate::types::{format_size, EntryInfo};
use std::fs;
use std::path::Path;
use tracing::debug;

pub struct Listing;

impl Listing {
    /// Immediate children of a folder: folders first, then case-insensitive by name.
    ///
    /// Symlinks are reported as-is and never followed.
    pub fn entries(guard: &SandboxGuard, path: impl AsRef<Path>) -> Result<Vec<EntryInfo>> {
        let dir_path = guard.resolve(path)?;
        debug!("Listing directory: {:?}", dir_path);
        read_sorted(guard, &dir_path)
    }

    /// Render a folder (or a single file) for display
    pub fn render(guard: &SandboxGuard, path: impl AsRef<Path>, tree: bool, max_depth: usize) -> Result<String> {
        let target = guard.resolve(path)?;
        let metadata = fs::metadata(&target).map_err(|e| io_error(guard, &target, e))?;

        if !metadata.is_dir() {
            let name = guard.display(&target);
            return Ok(format!("{}\t{}", name, format_size(metadata.len())));
        }

        if !tree {
            let entries = read_sorted(guard, &target)?;
            if entries.is_empty() {
                return Ok("(empty)".to_string());
            }
            let lines: Vec<String> = entries
                .iter()
                .map(|e| match (e.is_dir, e.size) {
                    (true, _) => format!("{}/\t-", e.name),
                    (false, Some(size)) => format!("{}\t{}", e.name, format_size(size)),
                    (false, None) => format!("{}\t?", e.name),
                })
                .collect();
            return Ok(lines.join("\n"));
        }

        let header = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| guard.display(&target));
        let mut lines = vec![format!("{}/", header)];
        walk_tree(guard, &target, "", 1, max_depth, &mut lines);
        Ok(lines.join("\n"))
    }
}

fn walk_tree(guard: &SandboxGuard, dir: &Path, prefix: &str, depth: usize, max_depth: usize, lines: &mut Vec<String>) {
    if depth > max_depth {
        return;
    }

    let entries = match read_sorted(guard, dir) {
        Ok(entries) => entries,
        Err(_) => {
            lines.push(format!("{}└── [permission denied]", prefix));
            return;
        }
    };

    let total = entries.len();
    for (i, entry) in entries.iter().enumerate() {
        let last = i + 1 == total;
        let branch = if last { "└── " } else { "├── " };

        if entry.is_dir {
            lines.push(format!("{}{}{}/", prefix, branch, entry.name));
            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            walk_tree(guard, &dir.join(&entry.name), &child_prefix, depth + 1, max_depth, lines);
        } else {
            let size = entry.size.map(format_size).unwrap_or_else(|| "?".to_string());
            lines.push(format!("{}{}{} ({})", prefix, branch, entry.name, size));
        }
    }
}

fn read_sorted(guard: &SandboxGuard, dir: &Path) -> Result<Vec<EntryInfo>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| io_error(guard, dir, e))? {
        let entry = entry.map_err(|e| io_error(guard, dir, e))?;
        let entry_path = entry.path();
        let metadata = entry.metadata().ok();
        let is_dir = metadata.as_ref().map(|m| m.is_dir()).unwrap_or(false);

        entries.push(EntryInfo {
            path: guard.display(&entry_path),
            name: entry.file_name().to_string_lossy().to_string(),
            is_dir,
            size: metadata.as_ref().filter(|m| !m.is_dir()).map(|m| m.len()),
            modified: metadata
                .as_ref()
                .and_then(|m| m.modified().ok())
                .map(|t| t.into()),
        });
    }

    // Sort: directories first, then by name
    entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });

    Ok(entries)
}
