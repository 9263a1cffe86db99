//! Single-file operations confined to the sandbox

use super::guard::SandboxGuard;
use crate::error::{Error, Result, SandboxError};
use crate::types::OperationResult;
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File primitives. Every path goes through the guard before any OS call.
pub struct FileOps;

impl FileOps {
    /// Read a text file, refusing anything larger than `max_bytes`
    pub fn read(guard: &SandboxGuard, path: impl AsRef<Path>, max_bytes: u64) -> Result<String> {
        let file_path = guard.resolve(path)?;
        let display = guard.display(&file_path);

        debug!("Reading file: {:?}", file_path);

        let metadata = fs::metadata(&file_path).map_err(|e| io_error(guard, &file_path, e))?;
        if metadata.is_dir() {
            return Err(SandboxError::WrongType(format!("{} is a folder, not a file", display)).into());
        }
        if metadata.len() > max_bytes {
            return Err(too_large(display, metadata.len(), max_bytes));
        }

        // The file may have grown since the metadata call
        let file = fs::File::open(&file_path).map_err(|e| io_error(guard, &file_path, e))?;
        let mut buffer = Vec::with_capacity(metadata.len() as usize);
        file.take(max_bytes.saturating_add(1))
            .read_to_end(&mut buffer)
            .map_err(|e| io_error(guard, &file_path, e))?;

        if buffer.len() as u64 > max_bytes {
            return Err(too_large(display, buffer.len() as u64, max_bytes));
        }

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Create or overwrite a file. The parent folder must exist.
    pub fn write(guard: &SandboxGuard, path: impl AsRef<Path>, content: &str) -> Result<OperationResult> {
        let file_path = guard.resolve(path)?;
        let display = guard.display(&file_path);

        if file_path.is_dir() {
            return Err(SandboxError::WrongType(format!("{} is a folder, not a file", display)).into());
        }
        require_parent(guard, &file_path)?;

        debug!("Writing file: {:?}", file_path);

        let created = !file_path.exists();
        fs::write(&file_path, content).map_err(|e| io_error(guard, &file_path, e))?;

        info!("Wrote {} bytes to {:?}", content.len(), file_path);

        let verb = if created { "Created" } else { "Overwrote" };
        Ok(OperationResult::success(
            format!("{} {} ({} bytes)", verb, display, content.len()),
            vec![display],
        ))
    }

    /// Append to an existing file
    pub fn append(guard: &SandboxGuard, path: impl AsRef<Path>, content: &str) -> Result<OperationResult> {
        let file_path = guard.resolve(path)?;
        let display = guard.display(&file_path);

        let metadata = fs::metadata(&file_path).map_err(|e| io_error(guard, &file_path, e))?;
        if metadata.is_dir() {
            return Err(SandboxError::WrongType(format!("{} is a folder, not a file", display)).into());
        }

        debug!("Appending to file: {:?}", file_path);

        let mut file = OpenOptions::new()
            .append(true)
            .open(&file_path)
            .map_err(|e| io_error(guard, &file_path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| io_error(guard, &file_path, e))?;

        info!("Appended {} bytes to {:?}", content.len(), file_path);

        Ok(OperationResult::success(
            format!("Appended {} bytes to {}", content.len(), display),
            vec![display],
        ))
    }

    /// Copy a file. An existing destination is a collision unless `overwrite` is set.
    pub fn copy(
        guard: &SandboxGuard,
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
        overwrite: bool,
    ) -> Result<OperationResult> {
        let from = guard.resolve(src)?;
        let to = guard.resolve(dst)?;
        let (from_display, to_display) = (guard.display(&from), guard.display(&to));

        let metadata = fs::metadata(&from).map_err(|e| io_error(guard, &from, e))?;
        if metadata.is_dir() {
            return Err(SandboxError::WrongType(format!(
                "copy_file only copies files; {} is a folder",
                from_display
            ))
            .into());
        }

        if let Ok(existing) = fs::metadata(&to) {
            if !overwrite {
                return Err(collision(&to_display));
            }
            if existing.is_dir() {
                return Err(SandboxError::WrongType(format!(
                    "cannot overwrite folder {} with a file",
                    to_display
                ))
                .into());
            }
            if from == to {
                return Err(SandboxError::InvalidPath(format!(
                    "source and destination are the same file: {}",
                    to_display
                ))
                .into());
            }
        }
        require_parent(guard, &to)?;

        debug!("Copying {:?} to {:?}", from, to);
        fs::copy(&from, &to).map_err(|e| io_error(guard, &to, e))?;
        info!("Copied {:?} to {:?}", from, to);

        Ok(OperationResult::success(
            format!("Copied {} to {}", from_display, to_display),
            vec![from_display, to_display],
        ))
    }

    /// Move a file or folder.
    ///
    /// Uses an atomic rename when both sides share a volume and falls back to
    /// copy + delete otherwise. With `overwrite`, only a destination of the same
    /// kind (file for file, folder for folder) is replaced.
    pub fn move_path(
        guard: &SandboxGuard,
        src: impl AsRef<Path>,
        dst: impl AsRef<Path>,
        overwrite: bool,
    ) -> Result<OperationResult> {
        let from = guard.resolve(src)?;
        let to = guard.resolve(dst)?;
        let (from_display, to_display) = (guard.display(&from), guard.display(&to));

        if guard.is_root(&from) || guard.is_root(&to) {
            return Err(SandboxError::InvalidPath("cannot move the sandbox root".to_string()).into());
        }

        let metadata = fs::metadata(&from).map_err(|e| io_error(guard, &from, e))?;
        let is_dir = metadata.is_dir();

        if is_dir && to.starts_with(&from) {
            return Err(SandboxError::InvalidPath(format!(
                "cannot move folder {} into itself",
                from_display
            ))
            .into());
        }

        let mut replacing = false;
        if let Ok(existing) = fs::metadata(&to) {
            if !overwrite {
                return Err(collision(&to_display));
            }
            if from == to {
                return Err(SandboxError::InvalidPath(format!(
                    "source and destination are the same: {}",
                    to_display
                ))
                .into());
            }
            match (is_dir, existing.is_dir()) {
                (false, true) => {
                    return Err(SandboxError::WrongType(format!(
                        "cannot overwrite folder {} with a file",
                        to_display
                    ))
                    .into())
                }
                (true, false) => {
                    return Err(SandboxError::WrongType(format!(
                        "cannot overwrite file {} with a folder",
                        to_display
                    ))
                    .into())
                }
                _ => replacing = true,
            }
        }
        require_parent(guard, &to)?;

        debug!("Moving {:?} to {:?}", from, to);
        if replacing {
            replace_existing(guard, &to, || rename_or_copy(guard, &from, &to, is_dir))?;
        } else {
            rename_or_copy(guard, &from, &to, is_dir)?;
        }
        info!("Moved {:?} to {:?}", from, to);

        Ok(OperationResult::success(
            format!("Moved {} to {}", from_display, to_display),
            vec![from_display, to_display],
        ))
    }

    /// Create a new file; an existing entry at the path is a collision
    pub fn create(guard: &SandboxGuard, path: impl AsRef<Path>, content: &str) -> Result<OperationResult> {
        let file_path = guard.resolve(path)?;
        let display = guard.display(&file_path);

        require_parent(guard, &file_path)?;

        debug!("Creating file: {:?}", file_path);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .map_err(|e| io_error(guard, &file_path, e))?;

        if let Err(e) = file.write_all(content.as_bytes()) {
            drop(file);
            let _ = fs::remove_file(&file_path);
            return Err(io_error(guard, &file_path, e));
        }

        info!("Created file: {:?}", file_path);

        Ok(OperationResult::success(format!("Created {}", display), vec![display]))
    }

    /// Delete a single file. Folders are refused.
    pub fn delete(guard: &SandboxGuard, path: impl AsRef<Path>) -> Result<OperationResult> {
        let file_path = guard.resolve(path)?;
        let display = guard.display(&file_path);

        let metadata = fs::metadata(&file_path).map_err(|e| io_error(guard, &file_path, e))?;
        if metadata.is_dir() {
            return Err(SandboxError::WrongType(format!(
                "delete_file only deletes files; {} is a folder",
                display
            ))
            .into());
        }

        debug!("Deleting file: {:?}", file_path);
        fs::remove_file(&file_path).map_err(|e| io_error(guard, &file_path, e))?;
        info!("Deleted: {:?}", file_path);

        Ok(OperationResult::success(format!("Deleted {}", display), vec![display]))
    }

    /// Rename without replacing an existing target
    pub fn rename(
        guard: &SandboxGuard,
        old_path: impl AsRef<Path>,
        new_path: impl AsRef<Path>,
    ) -> Result<OperationResult> {
        Self::move_path(guard, old_path, new_path, false)
    }
}

fn rename_or_copy(guard: &SandboxGuard, from: &Path, to: &Path, is_dir: bool) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!("Rename crosses volumes, copying {:?} to {:?}", from, to);
            // A failed copy must not leave a partial destination behind
            if is_dir {
                if let Err(e) = copy_tree(guard, from, to) {
                    let _ = fs::remove_dir_all(to);
                    return Err(e);
                }
                fs::remove_dir_all(from).map_err(|e| io_error(guard, from, e))
            } else {
                if let Err(e) = fs::copy(from, to) {
                    let _ = fs::remove_file(to);
                    return Err(io_error(guard, to, e));
                }
                fs::remove_file(from).map_err(|e| io_error(guard, from, e))
            }
        }
        Err(e) => Err(io_error(guard, from, e)),
    }
}

/// Run `action` with the entry at `to` moved aside. The old entry is deleted
/// once `action` succeeds and put back when it fails.
fn replace_existing(guard: &SandboxGuard, to: &Path, action: impl FnOnce() -> Result<()>) -> Result<()> {
    let aside = aside_path(to);
    debug!("Setting {:?} aside as {:?}", to, aside);
    fs::rename(to, &aside).map_err(|e| io_error(guard, to, e))?;

    if let Err(e) = action() {
        if let Err(restore) = fs::rename(&aside, to) {
            warn!("Could not restore {:?} from {:?}: {}", to, aside, restore);
        }
        return Err(e);
    }

    let is_dir = fs::symlink_metadata(&aside).map(|m| m.is_dir()).unwrap_or(false);
    let removed = if is_dir {
        fs::remove_dir_all(&aside)
    } else {
        fs::remove_file(&aside)
    };
    if let Err(e) = removed {
        warn!("Replaced entry left behind at {:?}: {}", aside, e);
    }
    Ok(())
}

/// Unused sibling name for an entry being replaced
fn aside_path(to: &Path) -> PathBuf {
    let name = to
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    (0u32..)
        .map(|n| to.with_file_name(format!(".{}.replaced-{}", name, n)))
        .find(|candidate| fs::symlink_metadata(candidate).is_err())
        .unwrap_or_else(|| to.with_extension("replaced"))
}

fn copy_tree(guard: &SandboxGuard, from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            io_error(guard, &path, e.into())
        })?;
        let rel = entry.path().strip_prefix(from).map_err(|e| Error::Internal(e.to_string()))?;
        let target = to.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| io_error(guard, &target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| io_error(guard, &target, e))?;
        }
    }
    Ok(())
}

/// Map an I/O error to the sandbox taxonomy, keeping path context
pub(crate) fn io_error(guard: &SandboxGuard, path: &Path, err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::NotFound => SandboxError::NotFound(guard.display(path)).into(),
        io::ErrorKind::AlreadyExists => SandboxError::Collision(guard.display(path)).into(),
        _ => SandboxError::os(path, err).into(),
    }
}

pub(crate) fn collision(display: &str) -> Error {
    SandboxError::Collision(format!("{} (pass overwrite=true to replace it)", display)).into()
}

pub(crate) fn require_parent(guard: &SandboxGuard, path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.is_dir() => Err(SandboxError::NotFound(format!(
            "parent folder of {} ({})",
            guard.display(path),
            guard.display(parent)
        ))
        .into()),
        _ => Ok(()),
    }
}

fn too_large(display: String, size: u64, limit: u64) -> Error {
    SandboxError::TooLarge {
        path: display,
        size,
        limit,
    }
    .into()
}
