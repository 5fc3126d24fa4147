//! Host filesystem layout consumed by the synthesizer and supervisor.
//!
//! ```text
//! <files_dir>/
//!   config                 (daemon configuration document)
//!   bpsec/                 (security path, never created here)
//!   default-bab-key.mac    (BAB shared secret)
//! <storage_root>/
//!   blob/                  (purged on every synthesis)
//!   bundles/
//!   logs/
//! ```

use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config";
pub const SECURITY_DIR: &str = "bpsec";
pub const BAB_KEY_FILE: &str = "default-bab-key.mac";

pub const BLOB_DIR: &str = "blob";
pub const BUNDLES_DIR: &str = "bundles";
pub const LOGS_DIR: &str = "logs";

/// External storage directories resolved by the host.
///
/// `None` means the host could not resolve that location (e.g. external
/// storage unmounted); the matching config line is then omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoragePaths {
    pub blob: Option<PathBuf>,
    pub bundles: Option<PathBuf>,
    pub logs: Option<PathBuf>,
}

impl StoragePaths {
    /// Standard `blob` / `bundles` / `logs` layout under `root`.
    pub fn under(root: &Path) -> Self {
        Self {
            blob: Some(root.join(BLOB_DIR)),
            bundles: Some(root.join(BUNDLES_DIR)),
            logs: Some(root.join(LOGS_DIR)),
        }
    }

    /// Resolve each standard directory under `root`, creating it if needed.
    ///
    /// A directory that cannot be created is left unresolved.
    pub fn resolve_under(root: &Path) -> Self {
        let resolve = |name: &str| {
            let dir = root.join(name);
            match std::fs::create_dir_all(&dir) {
                Ok(()) => Some(dir),
                Err(err) => {
                    tracing::warn!(path = %dir.display(), error = %err, "storage path unavailable");
                    None
                }
            }
        };
        Self {
            blob: resolve(BLOB_DIR),
            bundles: resolve(BUNDLES_DIR),
            logs: resolve(LOGS_DIR),
        }
    }
}

/// Private application files plus external storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLayout {
    pub files_dir: PathBuf,
    pub storage: StoragePaths,
}

impl HostLayout {
    pub fn new(files_dir: impl Into<PathBuf>, storage: StoragePaths) -> Self {
        Self {
            files_dir: files_dir.into(),
            storage,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.files_dir.join(CONFIG_FILE)
    }

    pub fn security_dir(&self) -> PathBuf {
        self.files_dir.join(SECURITY_DIR)
    }

    pub fn bab_key_path(&self) -> PathBuf {
        self.files_dir.join(BAB_KEY_FILE)
    }
}
