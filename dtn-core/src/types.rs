//! Domain types shared by the synthesizer and the supervisor.
//!
//! Preference values arrive loosely typed from the host store; everything the
//! rest of the workspace consumes is one of the strongly-typed values below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// An opaque, vendor-assigned device identifier supplied by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A DTN-scheme endpoint identifier, e.g. `dtn://android-1a2b3c4d.dtn`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointId(pub String);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EndpointId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EndpointId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// A raw value held by the host preference store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl PrefValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Textual form; integers are rendered in decimal, booleans are not text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PrefValue::Text(s) => Some(s.clone()),
            PrefValue::Int(i) => Some(i.to_string()),
            PrefValue::Bool(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PrefValue::Bool(_) => "boolean",
            PrefValue::Int(_) => "integer",
            PrefValue::Text(_) => "string",
        }
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(b) => b.fmt(f),
            PrefValue::Int(i) => i.fmt(f),
            PrefValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for PrefValue {
    fn from(b: bool) -> Self {
        PrefValue::Bool(b)
    }
}

impl From<&str> for PrefValue {
    fn from(s: &str) -> Self {
        PrefValue::Text(s.to_owned())
    }
}

impl From<String> for PrefValue {
    fn from(s: String) -> Self {
        PrefValue::Text(s)
    }
}

/// Bundle security mode selected by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SecurityMode {
    #[default]
    Disabled,
    /// Bundle authentication block with a shared symmetric key.
    Bab,
    /// Any other mode the daemon understands; passed through untouched.
    Other(String),
}

impl SecurityMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, SecurityMode::Disabled)
    }
}

impl FromStr for SecurityMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "disabled" => SecurityMode::Disabled,
            "bab" => SecurityMode::Bab,
            other => SecurityMode::Other(other.to_owned()),
        })
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityMode::Disabled => write!(f, "disabled"),
            SecurityMode::Bab => write!(f, "bab"),
            SecurityMode::Other(mode) => write!(f, "{mode}"),
        }
    }
}

/// Daemon availability as announced to lifecycle observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DaemonState {
    Online,
    Offline,
}

impl fmt::Display for DaemonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaemonState::Online => write!(f, "ONLINE"),
            DaemonState::Offline => write!(f, "OFFLINE"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
