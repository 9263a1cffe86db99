//! Folder operations confined to the sandbox

use super::filesystem::io_error;
use super::guard::SandboxGuard;
use crate::error::{Result, SandboxError};
use crate::types::OperationResult;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub struct FolderOps;

impl FolderOps {
    /// Create a folder and any missing parents.
    ///
    /// An existing folder is fine when `exist_ok` is set; anything else already
    /// at the path is a collision.
    pub fn create(guard: &SandboxGuard, path: impl AsRef<Path>, exist_ok: bool) -> Result<OperationResult> {
        let dir_path = guard.resolve(path)?;
        let display = guard.display(&dir_path);

        if let Ok(metadata) = fs::metadata(&dir_path) {
            if !exist_ok {
                return Err(SandboxError::Collision(display).into());
            }
            if !metadata.is_dir() {
                return Err(SandboxError::WrongType(format!(
                    "{} exists and is not a folder",
                    display
                ))
                .into());
            }
            debug!("Folder already exists: {:?}", dir_path);
            return Ok(OperationResult::success(
                format!("Folder {} already exists", display),
                vec![display],
            ));
        }

        debug!("Creating directory: {:?}", dir_path);
        fs::create_dir_all(&dir_path).map_err(|e| io_error(guard, &dir_path, e))?;
        info!("Created directory: {:?}", dir_path);

        Ok(OperationResult::success(format!("Created folder {}", display), vec![display]))
    }

    /// Delete a folder; a non-empty one needs `recursive`
    pub fn delete(guard: &SandboxGuard, path: impl AsRef<Path>, recursive: bool) -> Result<OperationResult> {
        let dir_path = guard.resolve(path)?;
        let display = guard.display(&dir_path);

        if guard.is_root(&dir_path) {
            return Err(SandboxError::InvalidPath("refusing to delete the sandbox root".to_string()).into());
        }

        let metadata = fs::metadata(&dir_path).map_err(|e| io_error(guard, &dir_path, e))?;
        if !metadata.is_dir() {
            return Err(SandboxError::WrongType(format!("{} is not a folder", display)).into());
        }

        let is_empty = fs::read_dir(&dir_path)
            .map_err(|e| io_error(guard, &dir_path, e))?
            .next()
            .is_none();

        debug!("Deleting directory: {:?} (recursive: {})", dir_path, recursive);

        let message = if is_empty {
            fs::remove_dir(&dir_path).map_err(|e| io_error(guard, &dir_path, e))?;
            format!("Deleted empty folder {}", display)
        } else if recursive {
            fs::remove_dir_all(&dir_path).map_err(|e| io_error(guard, &dir_path, e))?;
            format!("Recursively deleted {}", display)
        } else {
            return Err(SandboxError::NotEmpty(display).into());
        };

        info!("Deleted directory: {:?}", dir_path);
        Ok(OperationResult::success(message, vec![display]))
    }
}
