//! Filesystem helpers shared by the installation steps.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{InstallerError, IoContext};

/// Create `dir` and its parents if missing
pub(super) fn ensure_dir(dir: &Path) -> Result<(), InstallerError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).io_context(|| format!("Failed to create directory {}", dir.display()))
}

/// Delete `path` if it is there. Returns whether something was removed.
pub(super) fn remove_if_exists(path: &Path) -> Result<bool, InstallerError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(InstallerError::io(
            format!("Failed to remove {}", path.display()),
            e,
        )),
    }
}

/// Write a file that must not exist yet.
///
/// Fails with `AlreadyExists` if another writer created it first.
pub(super) fn write_new_file(path: &Path, content: &str) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

pub(super) fn set_mode(path: &Path, mode: u32) -> Result<(), InstallerError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .io_context(|| format!("Failed to set permissions on {}", path.display()))
}
