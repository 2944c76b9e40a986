//! Atomic replacement of the installed binary
//!
//! The new binary is staged in a temporary file next to the target, so the
//! final step is a same-volume rename and the target is never observed
//! half-written. If anything fails before that rename, the staging file is
//! removed and the target is left untouched.
//!
//! Unix permits renaming over an executable that is currently running; the
//! running process keeps the old inode. Windows refuses to overwrite a
//! running executable but does allow renaming it, so there the current
//! binary is first moved aside to `<name>.old` and cleaned up by
//! [`BinaryInstaller::cleanup_stale`] on a later launch.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info, warn};

use crate::error::{Result, UpdateError};

/// `errno` reported when opening a running executable for writing
#[cfg(unix)]
const ETXTBSY: i32 = 26;

/// Win32 errors reported when opening a running executable for writing
#[cfg(windows)]
const ERROR_ACCESS_DENIED: i32 = 5;
#[cfg(windows)]
const ERROR_SHARING_VIOLATION: i32 = 32;

/// Installs downloaded binaries over the existing executable
#[derive(Debug, Clone, Default)]
pub struct BinaryInstaller;

impl BinaryInstaller {
    pub fn new() -> Self {
        Self
    }

    /// Check that `path` can be opened for writing by the current user.
    ///
    /// The file is opened without truncation and closed immediately. A file
    /// that refuses the open only because it is a running program passes if
    /// its directory accepts new files, since replacing it is a rename.
    pub fn check_write_permissions(&self, path: &Path) -> Result<()> {
        match OpenOptions::new().write(true).open(path) {
            Ok(_) => Ok(()),
            Err(e) if is_busy_executable(&e, path) => {
                debug!("{} is running; checking its directory instead", path.display());
                self.check_directory_writable(path)
            }
            Err(e) => Err(fs_error("Cannot open install path for writing", path, e)),
        }
    }

    /// Create and drop a temporary file beside `path`
    fn check_directory_writable(&self, path: &Path) -> Result<()> {
        let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let dir = match resolved.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        Builder::new()
            .prefix(".twine-probe-")
            .tempfile_in(dir)
            .map(drop)
            .map_err(|e| fs_error("Cannot create files beside install path", dir, e))
    }

    /// Replace `target` with `bytes`.
    ///
    /// Steps: write-permission preflight, stage into a temporary file in the
    /// target's directory, verify the staged length, copy the target's mode
    /// bits, then atomically move the staged file onto the target.
    pub fn install(&self, bytes: &[u8], target: &Path) -> Result<()> {
        self.check_write_permissions(target)?;

        let target = fs::canonicalize(target)
            .map_err(|e| fs_error("Failed to resolve install path", target, e))?;
        let dir = target.parent().unwrap_or_else(|| Path::new("."));

        let staged = self.stage(bytes, &target, dir)?;
        debug!("Staged new binary at {}", staged.path().display());

        replace(staged, &target)?;

        info!("Installed {} bytes to {}", bytes.len(), target.display());
        Ok(())
    }

    /// Write `bytes` to a temporary file in `dir` carrying `target`'s permissions.
    /// The file is deleted when the returned handle drops without being persisted.
    fn stage(&self, bytes: &[u8], target: &Path, dir: &Path) -> Result<NamedTempFile> {
        let mut staged = Builder::new()
            .prefix(".twine-update-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| fs_error("Failed to create staging file", dir, e))?;

        staged
            .write_all(bytes)
            .and_then(|_| staged.flush())
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| fs_error("Failed to write staging file", staged.path(), e))?;

        let written = staged
            .as_file()
            .metadata()
            .map_err(|e| fs_error("Failed to inspect staging file", staged.path(), e))?
            .len();
        if written != bytes.len() as u64 {
            return Err(UpdateError::ShortWrite {
                path: staged.path().to_path_buf(),
                expected: bytes.len() as u64,
                actual: written,
            });
        }

        let permissions = fs::metadata(target)
            .map_err(|e| fs_error("Failed to read install path metadata", target, e))?
            .permissions();
        fs::set_permissions(staged.path(), permissions)
            .map_err(|e| fs_error("Failed to copy permissions to staging file", staged.path(), e))?;

        Ok(staged)
    }

    /// Remove the `<name>.old` file left behind by a previous Windows swap.
    /// Returns whether a file was removed.
    pub fn cleanup_stale(&self, target: &Path) -> Result<bool> {
        let stale = stale_path(target);
        match fs::remove_file(&stale) {
            Ok(()) => {
                info!("Removed stale binary {}", stale.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                warn!("Failed to remove stale binary {}: {}", stale.display(), e);
                Err(fs_error("Failed to remove stale binary", &stale, e))
            }
        }
    }
}

/// Where the displaced binary is parked during a Windows swap
pub fn stale_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".old");
    target.with_file_name(name)
}

#[cfg(not(windows))]
fn replace(staged: NamedTempFile, target: &Path) -> Result<()> {
    staged
        .persist(target)
        .map_err(|e| fs_error("Failed to move new binary into place", target, e.error))?;
    Ok(())
}

#[cfg(windows)]
fn replace(staged: NamedTempFile, target: &Path) -> Result<()> {
    let stale = stale_path(target);
    match fs::remove_file(&stale) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(fs_error("Failed to remove stale binary", &stale, e)),
    }

    fs::rename(target, &stale)
        .map_err(|e| fs_error("Failed to move running binary aside", target, e))?;

    if let Err(e) = staged.persist(target) {
        if let Err(restore) = fs::rename(&stale, target) {
            warn!("Failed to restore {}: {}", target.display(), restore);
        }
        return Err(fs_error("Failed to move new binary into place", target, e.error));
    }

    Ok(())
}

/// Whether `err` only reports that `path` is a running program
#[cfg(unix)]
fn is_busy_executable(err: &io::Error, _path: &Path) -> bool {
    err.raw_os_error() == Some(ETXTBSY)
}

/// Whether `err` only reports that `path` is a running program.
/// A running image refuses write access even when the file is not read-only.
#[cfg(windows)]
fn is_busy_executable(err: &io::Error, path: &Path) -> bool {
    match err.raw_os_error() {
        Some(ERROR_SHARING_VIOLATION) => true,
        Some(ERROR_ACCESS_DENIED) => {
            fs::metadata(path).is_ok_and(|meta| !meta.permissions().readonly())
        }
        _ => false,
    }
}

#[cfg(not(any(unix, windows)))]
fn is_busy_executable(_err: &io::Error, _path: &Path) -> bool {
    false
}

/// Map an I/O error, keeping permission failures distinct
fn fs_error(context: &str, path: &Path, err: io::Error) -> UpdateError {
    if err.kind() == io::ErrorKind::PermissionDenied {
        UpdateError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        UpdateError::io(context, path, err)
    }
}
