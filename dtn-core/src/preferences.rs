//! Host preference store and its strongly-typed view.
//!
//! # Storage layout
//!
//! ```text
//! <data_dir>/dtn/
//!   preferences.yaml   (flat key → bool | integer | string mapping, mode 0600)
//! ```
//!
//! # API pattern
//!
//! - `load_at(path)` / `save_at(path, …)` take an explicit path; used in tests
//!   with `TempDir`.
//! - `default_store_path()` derives the path from `dirs::data_dir()`.
//!
//! The loosely-typed [`PreferenceSet`] is converted exactly once into
//! [`Preferences`]; nothing downstream branches on raw strings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, PreferenceError};
use crate::types::{EndpointId, PrefValue, SecurityMode};

/// Recognised preference keys.
pub mod keys {
    pub const ENDPOINT_ID: &str = "endpoint_id";
    pub const ROUTING: &str = "routing";
    pub const CONSTRAINS_LIFETIME: &str = "constrains_lifetime";
    pub const CONSTRAINS_TIMESTAMP: &str = "constrains_timestamp";
    pub const SECURITY_MODE: &str = "security_mode";
    pub const SECURITY_BAB_KEY: &str = "security_bab_key";
    pub const CHECK_IDLE_TIMEOUT: &str = "checkIdleTimeout";
    pub const DISCOVERY_ANNOUNCE: &str = "discovery_announce";
    pub const LOG_OPTIONS: &str = "log_options";
    pub const DEBUG_VERBOSITY: &str = "pref_debug_verbosity";
    /// Prefix of the per-interface boolean flags, e.g. `interface_wlan0`.
    pub const INTERFACE_PREFIX: &str = "interface_";
}

const PREFERENCES_FILE: &str = "preferences.yaml";

// ---------------------------------------------------------------------------
// 1. Raw preference set
// ---------------------------------------------------------------------------

/// Immutable snapshot of the host preference store.
///
/// Backed by a sorted map so every walk over the keys (interface enumeration
/// in particular) is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceSet(BTreeMap<String, PrefValue>);

impl PreferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set populated with every recognised key at its default value.
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.insert(keys::ENDPOINT_ID, "");
        set.insert(keys::ROUTING, "default");
        set.insert(keys::CONSTRAINS_LIFETIME, false);
        set.insert(keys::CONSTRAINS_TIMESTAMP, false);
        set.insert(keys::SECURITY_MODE, "disabled");
        set.insert(keys::SECURITY_BAB_KEY, "");
        set.insert(keys::CHECK_IDLE_TIMEOUT, false);
        set.insert(keys::DISCOVERY_ANNOUNCE, true);
        set.insert(keys::LOG_OPTIONS, "0");
        set.insert(keys::DEBUG_VERBOSITY, "0");
        set
    }

    /// Builder-style insert, mostly for tests and `init`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PrefValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PrefValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PrefValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn bool_or(&self, key: &str, default: bool) -> Result<bool, PreferenceError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.as_bool().ok_or_else(|| PreferenceError::WrongType {
                key: key.to_owned(),
                expected: "boolean",
                found: value.kind(),
            }),
        }
    }

    fn text_or(&self, key: &str, default: &str) -> Result<String, PreferenceError> {
        match self.get(key) {
            None => Ok(default.to_owned()),
            Some(value) => value.as_text().ok_or_else(|| PreferenceError::WrongType {
                key: key.to_owned(),
                expected: "string",
                found: value.kind(),
            }),
        }
    }

    fn int_or(&self, key: &str, default: &str) -> Result<i32, PreferenceError> {
        let raw = self.text_or(key, default)?;
        raw.trim()
            .parse::<i32>()
            .map_err(|_| PreferenceError::InvalidInteger {
                key: key.to_owned(),
                value: raw,
            })
    }

    /// Names of all interfaces whose `interface_<name>` flag is boolean `true`.
    ///
    /// Non-boolean values under the prefix are ignored, as is a bare prefix
    /// with no name.
    pub fn enabled_interfaces(&self) -> Vec<String> {
        self.iter()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix(keys::INTERFACE_PREFIX)?;
                (!name.is_empty() && value.as_bool() == Some(true)).then(|| name.to_owned())
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<PrefValue>> FromIterator<(K, V)> for PreferenceSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// 2. Typed preferences
// ---------------------------------------------------------------------------

/// Strongly-typed view of the preference store, validated at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    /// Explicit endpoint identifier; `None` when unset or empty.
    pub endpoint_id: Option<EndpointId>,
    pub routing: String,
    pub constrains_lifetime: bool,
    pub constrains_timestamp: bool,
    pub security_mode: SecurityMode,
    /// Raw shared secret for BAB mode; may be empty.
    pub security_bab_key: String,
    pub check_idle_timeout: bool,
    pub discovery_announce: bool,
    pub log_level: i32,
    pub debug_verbosity: i32,
    /// Enabled interface names, in stable key order.
    pub interfaces: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            endpoint_id: None,
            routing: "default".to_owned(),
            constrains_lifetime: false,
            constrains_timestamp: false,
            security_mode: SecurityMode::Disabled,
            security_bab_key: String::new(),
            check_idle_timeout: false,
            discovery_announce: true,
            log_level: 0,
            debug_verbosity: 0,
            interfaces: Vec::new(),
        }
    }
}

impl Preferences {
    /// Interpret a raw preference set, applying defaults for absent keys.
    pub fn from_set(set: &PreferenceSet) -> Result<Self, PreferenceError> {
        let endpoint_id = set.text_or(keys::ENDPOINT_ID, "")?;
        let security_mode = set
            .text_or(keys::SECURITY_MODE, "disabled")?
            .parse::<SecurityMode>()
            .unwrap_or_default();

        Ok(Self {
            endpoint_id: (!endpoint_id.is_empty()).then(|| EndpointId(endpoint_id)),
            routing: set.text_or(keys::ROUTING, "default")?,
            constrains_lifetime: set.bool_or(keys::CONSTRAINS_LIFETIME, false)?,
            constrains_timestamp: set.bool_or(keys::CONSTRAINS_TIMESTAMP, false)?,
            security_mode,
            security_bab_key: set.text_or(keys::SECURITY_BAB_KEY, "")?,
            check_idle_timeout: set.bool_or(keys::CHECK_IDLE_TIMEOUT, false)?,
            discovery_announce: set.bool_or(keys::DISCOVERY_ANNOUNCE, true)?,
            log_level: set.int_or(keys::LOG_OPTIONS, "0")?,
            debug_verbosity: set.int_or(keys::DEBUG_VERBOSITY, "0")?,
            interfaces: set.enabled_interfaces(),
        })
    }
}

impl TryFrom<&PreferenceSet> for Preferences {
    type Error = PreferenceError;

    fn try_from(set: &PreferenceSet) -> Result<Self, Self::Error> {
        Self::from_set(set)
    }
}

// ---------------------------------------------------------------------------
// 3. Load / save
// ---------------------------------------------------------------------------

/// `<data_dir>/dtn/preferences.yaml`.
pub fn default_store_path() -> Result<PathBuf, PreferenceError> {
    dirs::data_dir()
        .map(|d| d.join("dtn").join(PREFERENCES_FILE))
        .ok_or(PreferenceError::DataDirNotFound)
}

/// Load the preference store at `path`.
///
/// Returns `PreferenceError::NotFound` if absent and `PreferenceError::Parse`
/// if the YAML is malformed. An empty file is an empty set.
pub fn load_at(path: &Path) -> Result<PreferenceSet, PreferenceError> {
    if !path.exists() {
        return Err(PreferenceError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(PreferenceSet::new());
    }
    serde_yaml::from_str(&contents).map_err(|e| PreferenceError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save `set` to `path` atomically (`<path>.tmp` then rename), mode `0600`.
pub fn save_at(path: &Path, set: &PreferenceSet) -> Result<(), PreferenceError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
    }

    let yaml = serde_yaml::to_string(set)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    tracing::debug!(path = %path.display(), keys = set.len(), "saved preferences");
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), PreferenceError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), PreferenceError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
