//! Transient blob storage purge.

use std::path::Path;

/// Delete every non-directory entry directly inside `dir`.
///
/// Subdirectories are neither descended into nor removed. Individual delete
/// failures are logged and skipped. Returns the number of entries removed.
pub fn purge_blob_storage(dir: &Path) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %dir.display(), error = %err, "cannot list blob storage");
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.filter_map(|e| e.ok()) {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            continue;
        }
        let path = entry.path();
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to purge blob")
            }
        }
    }

    tracing::debug!(path = %dir.display(), removed, "purged blob storage");
    removed
}
