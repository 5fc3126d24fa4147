//! dtn core library: preferences, endpoint identity, host layout, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes and domain enums
//! - [`error`]: [`PreferenceError`]
//! - [`preferences`]: raw store, typed view, load / save
//! - [`identity`]: default endpoint identifier derivation
//! - [`paths`]: host filesystem layout

pub mod error;
pub mod identity;
pub mod paths;
pub mod preferences;
pub mod types;

pub use error::PreferenceError;
pub use identity::{IdentityDigest, IdentityResolver};
pub use paths::{HostLayout, StoragePaths};
pub use preferences::{PreferenceSet, Preferences};
pub use types::{DaemonState, DeviceId, EndpointId, PrefValue, SecurityMode};
