//! Private-file writer for the configuration document and key material.
//!
//! ## `write_document` protocol
//!
//! 1. Delete any stale file at the target path (the document is never
//!    appended to or merged).
//! 2. Write to `<path>.dtn.tmp` with mode `0600`.
//! 3. Rename to the final path (atomic on POSIX).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::document::ConfigDocument;
use crate::error::{io_err, ConfigError};

/// Replace whatever is at `path` with `document`.
pub fn write_document(path: &Path, document: &ConfigDocument) -> Result<(), ConfigError> {
    remove_stale(path)?;
    write_private(path, &document.render())?;
    tracing::info!(path = %path.display(), lines = document.len(), "wrote daemon config");
    Ok(())
}

/// Remove `path` if it exists. Returns `true` if a file was removed.
pub fn remove_stale(path: &Path) -> Result<bool, ConfigError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed stale file");
            Ok(true)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Write `content` verbatim to `path` via a private temp file and rename.
pub(crate) fn write_private(path: &Path, content: &str) -> Result<(), ConfigError> {
    let tmp = PathBuf::from(format!("{}.dtn.tmp", path.display()));
    write_private_with_tmp(path, content, &tmp)
}

fn write_private_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
    }

    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    if let Err(err) = set_file_permissions(tmp) {
        let _ = std::fs::remove_file(tmp);
        return Err(err);
    }

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}
