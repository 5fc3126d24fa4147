//! Default endpoint identifier derived from the platform device identifier.

use crate::types::{DeviceId, EndpointId};

const FRAGMENT_START: usize = 4;
const FRAGMENT_LEN: usize = 8;

/// Digest used to scramble the device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityDigest {
    #[default]
    Md5,
    /// No digest available; the fragment is cut from the raw identifier.
    Unavailable,
}

/// Derives `dtn://android-<fragment>.dtn` endpoint identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver {
    digest: IdentityDigest,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_digest(digest: IdentityDigest) -> Self {
        Self { digest }
    }

    /// Resolve the default endpoint identifier for `device`.
    ///
    /// Never fails: without a digest the fragment falls back to characters
    /// `[4, 12)` of the raw identifier.
    pub fn resolve(&self, device: &DeviceId) -> EndpointId {
        let fragment = match self.hex_digest(device) {
            Some(hex) => hex[FRAGMENT_START..FRAGMENT_START + FRAGMENT_LEN].to_owned(),
            None => {
                tracing::warn!("md5 not available, deriving endpoint id from raw device id");
                raw_fragment(&device.0)
            }
        };
        EndpointId(format!("dtn://android-{fragment}.dtn"))
    }

    fn hex_digest(&self, device: &DeviceId) -> Option<String> {
        match self.digest {
            IdentityDigest::Md5 => Some(unpadded_hex(&md5::compute(device.0.as_bytes()).0)),
            IdentityDigest::Unavailable => None,
        }
    }
}

/// Lowercase hex, each byte without its leading zero (`0x0a` → `a`).
///
/// Sixteen bytes always yield at least sixteen characters.
fn unpadded_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:x}")).collect()
}

/// Characters `[4, 12)` of `raw`, lowercased, padded with `0` when short.
fn raw_fragment(raw: &str) -> String {
    let mut fragment: String = raw
        .chars()
        .skip(FRAGMENT_START)
        .take(FRAGMENT_LEN)
        .flat_map(char::to_lowercase)
        .collect();
    while fragment.chars().count() < FRAGMENT_LEN {
        fragment.push('0');
    }
    fragment
}
