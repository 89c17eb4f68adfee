//! Filesystem convenience helpers.
//!
//! Every helper is tolerant of the state it is asked to produce already
//! existing: removing something absent and creating something present are
//! both successes.

use nodectl_errors::{Error, PlatformError};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Result type for filesystem operations
pub type Result<T> = std::result::Result<T, Error>;

fn fs_error(operation: &str, path: &Path, err: &std::io::Error) -> Error {
    PlatformError::FilesystemOperationFailed {
        operation: format!("{operation} {}", path.display()),
        message: err.to_string(),
    }
    .into()
}

/// Check if a path exists without following a final symlink
pub async fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok()
}

/// Create a directory and all parents
///
/// # Errors
///
/// Returns an error if creation fails.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| fs_error("create directory", path, &e))
}

/// Set unix permission bits
///
/// # Errors
///
/// Returns an error if the permissions cannot be changed.
pub async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .map_err(|e| fs_error("set permissions on", path, &e))
}

/// Unix permission bits of a path
///
/// # Errors
///
/// Returns an error if the path cannot be inspected.
pub async fn mode(path: &Path) -> Result<u32> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| fs_error("inspect", path, &e))?;
    Ok(metadata.permissions().mode() & 0o7777)
}

/// Write a file through a temporary sibling, then rename it into place
///
/// The file has `mode` before it becomes visible under its final name.
///
/// # Errors
///
/// Returns an error if writing, chmod or rename fails.
pub async fn write_file_with_mode(path: &Path, contents: &str, mode: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent).await?;
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = path.with_file_name(format!(".{file_name}.nodectl-tmp"));
    fs::write(&staging, contents)
        .await
        .map_err(|e| fs_error("write", &staging, &e))?;
    set_mode(&staging, mode).await?;
    fs::rename(&staging, path)
        .await
        .map_err(|e| fs_error("rename into", path, &e))
}

/// Read a file, `None` if it does not exist
///
/// # Errors
///
/// Returns an error for any failure other than absence.
pub async fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(fs_error("read", path, &e)),
    }
}

/// Remove a file or symlink; returns whether anything was removed
///
/// # Errors
///
/// Returns an error for any failure other than absence.
pub async fn remove_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(fs_error("remove", path, &e)),
    }
}

/// Remove a directory tree; returns whether anything was removed
///
/// # Errors
///
/// Returns an error for any failure other than absence.
pub async fn remove_dir_all(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(fs_error("remove directory", path, &e)),
    }
}

/// Remove whatever is at `path`, file or directory
///
/// # Errors
///
/// Returns an error for any failure other than absence.
pub async fn remove_path(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => remove_dir_all(path).await,
        Ok(_) => remove_file(path).await,
        Err(_) => Ok(false),
    }
}

/// Immediate children of a directory; empty if it does not exist
///
/// # Errors
///
/// Returns an error if an existing directory cannot be read.
pub async fn list_dir(path: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(fs_error("list", path, &e)),
    };
    let mut children = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| fs_error("list", path, &e))?
    {
        children.push(entry.path());
    }
    children.sort();
    Ok(children)
}

/// Point `link` at `target`, replacing an existing link
///
/// # Errors
///
/// Returns an error if the old link cannot be removed or the new one
/// cannot be created.
pub async fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    if let Ok(current) = fs::read_link(link).await {
        if current == target {
            return Ok(());
        }
    }
    remove_file(link).await?;
    if let Some(parent) = link.parent() {
        create_dir_all(parent).await?;
    }
    fs::symlink(target, link)
        .await
        .map_err(|e| fs_error("symlink", link, &e))
}

/// Whether `link` is a symlink pointing at `target`
pub async fn is_symlink_to(link: &Path, target: &Path) -> bool {
    fs::read_link(link).await.is_ok_and(|current| current == target)
}
