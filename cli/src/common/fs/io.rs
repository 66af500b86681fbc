//! # tfwheels Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Thin wrappers around `std::fs` used by the sandbox, the ssh-agent socket
//! handling and key generation. Each wrapper names the offending path in its
//! error so the user sees *which* file could not be read or written.
//!
//! ## Architecture
//!
//! - **`ensure_dir_exists`**: `mkdir -p`, failing when the path is a file.
//! - **`read_file_to_string`**: `fs::read_to_string` with context.
//! - **`write_file`**: writes bytes, creating the parent directory first.
//! - **`remove_file_if_exists`**: removes a file, ignoring a missing one.
//! - **`move_file`**: renames, falling back to copy + remove across devices.
//! - **`restrict_to_owner`**: `chmod 600` on Unix, used for private keys.
//! - **`make_executable`**: `chmod 755` on Unix, used for downloaded binaries.
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! io::ensure_dir_exists(&sandbox.join(".terraform/tmp"))?;
//! io::write_file(&sandbox.join("cluster-aws.tf"), rendered.as_bytes())?;
//! ```
//!
use crate::core::error::{Result, WheelsError};
use anyhow::Context;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path.
///
/// Creates it together with any missing parents. Fails with
/// `WheelsError::FileSystem` when the path exists but is not a directory.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(WheelsError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Writes `content` to `path`, replacing any existing file.
///
/// The parent directory is created first. Write failures (permission denied,
/// read-only filesystem, ...) surface as `WheelsError::FileSystem`.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_exists(parent)?;
        }
    }
    fs::write(path, content).map_err(|e| {
        WheelsError::FileSystem(format!("Failed to write {:?}: {}", path, e))
    })?;
    info!("Wrote {} bytes to {:?}", content.len(), path);
    Ok(())
}

/// Removes `path` if it exists. A missing file is not an error.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {:?}", path)),
    }
}

/// Moves a file, falling back to copy and remove when a rename is not possible.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        debug!("Renamed {:?} -> {:?}", from, to);
        return Ok(());
    }
    fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;
    fs::remove_file(from).with_context(|| format!("Failed to remove {:?}", from))?;
    debug!("Copied {:?} -> {:?}", from, to);
    Ok(())
}

/// Restricts a file to its owner (mode 0600). No-op on non-Unix platforms.
pub fn restrict_to_owner(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions of {:?}", path))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Marks a file as executable (mode 0755). No-op on non-Unix platforms.
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to make {:?} executable", path))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
