//! Preferences → daemon configuration document.
//!
//! Rules are applied in a fixed order so a given preference snapshot always
//! yields the same document. The only varying line is `logfile`, whose name
//! embeds the synthesis time.
//!
//! Side effects (skipped in dry-run mode):
//! - the BAB key file is (over)written when the security mode is `bab`;
//! - every file directly inside blob storage is deleted.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDateTime, Timelike};

use dtn_core::{DeviceId, HostLayout, IdentityResolver, Preferences, SecurityMode};

use crate::blob::purge_blob_storage;
use crate::document::ConfigDocument;
use crate::error::ConfigError;
use crate::key_material::write_bab_key;

/// Fourteen days, in seconds.
pub const LIFETIME_LIMIT_SECS: u64 = 1_209_600;
pub const BLOCKSIZE_LIMIT: &str = "50M";
pub const TCP_IDLE_TIMEOUT_SECS: u64 = 30;
/// IPv6 link-local and IPv4 multicast groups for neighbour discovery.
pub const DISCOVERY_ADDRESS: &str = "ff02::142 224.0.0.142";
pub const INTERFACE_PORT: u16 = 4556;

/// What a synthesis run produced besides the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub document: ConfigDocument,
    /// Key file written this run, if any.
    pub key_file: Option<PathBuf>,
    /// Number of blob storage entries purged.
    pub purged_blobs: usize,
}

/// Builds daemon configuration documents for one host.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    layout: HostLayout,
    device: DeviceId,
    resolver: IdentityResolver,
    dry_run: bool,
}

impl Synthesizer {
    pub fn new(layout: HostLayout, device: DeviceId) -> Self {
        Self {
            layout,
            device,
            resolver: IdentityResolver::new(),
            dry_run: false,
        }
    }

    pub fn with_resolver(mut self, resolver: IdentityResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// In dry-run mode the document is built but no file is touched.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn layout(&self) -> &HostLayout {
        &self.layout
    }

    /// Apply every synthesis rule to `prefs`, stamping the log file name with
    /// `now`.
    ///
    /// Fails only if the key file cannot be written; the caller decides what
    /// to do with the abandoned run.
    pub fn synthesize(
        &self,
        prefs: &Preferences,
        now: NaiveDateTime,
    ) -> Result<Synthesis, ConfigError> {
        let mut doc = ConfigDocument::new();
        let mut key_file = None;

        let local_uri = match &prefs.endpoint_id {
            Some(eid) => eid.clone(),
            None => self.resolver.resolve(&self.device),
        };
        doc.push("local_uri", local_uri);
        doc.push("routing", &prefs.routing);

        if prefs.constrains_lifetime {
            doc.push("limit_lifetime", LIFETIME_LIMIT_SECS);
        }
        if prefs.constrains_timestamp {
            doc.push("limit_predated_timestamp", LIFETIME_LIMIT_SECS);
        }
        doc.push("limit_blocksize", BLOCKSIZE_LIMIT);

        if prefs.security_mode.is_enabled() {
            let sec = self.layout.security_dir();
            // Only a regular file squatting on the path disqualifies it.
            if !sec.exists() || sec.is_dir() {
                doc.push("security_path", sec.display());
            }
        }

        if prefs.security_mode == SecurityMode::Bab {
            let key_path = self.layout.bab_key_path();
            if !self.dry_run {
                write_bab_key(&key_path, &prefs.security_bab_key)?;
                key_file = Some(key_path.clone());
            }
            if !prefs.security_bab_key.is_empty() {
                doc.push("security_level", 1);
                doc.push("security_bab_default_key", key_path.display());
            }
        }

        if prefs.check_idle_timeout {
            doc.push("tcp_idle_timeout", TCP_IDLE_TIMEOUT_SECS);
        }

        doc.push("discovery_address", DISCOVERY_ADDRESS);
        doc.push("discovery_announce", u8::from(prefs.discovery_announce));

        for iface in &prefs.interfaces {
            doc.push(format!("net_{iface}_type"), "tcp");
            doc.push(format!("net_{iface}_interface"), iface);
            doc.push(format!("net_{iface}_port"), INTERFACE_PORT);
        }
        let ifaces = prefs.interfaces.join(" ");
        doc.push("net_interfaces", &ifaces);
        doc.push("net_internet", &ifaces);

        let storage = &self.layout.storage;
        let mut purged_blobs = 0;
        if let Some(blob) = &storage.blob {
            doc.push("blob_path", blob.display());
            if !self.dry_run {
                purged_blobs = purge_blob_storage(blob);
            }
        }
        if let Some(bundles) = &storage.bundles {
            doc.push("storage_path", bundles.display());
        }
        if let Some(logs) = &storage.logs {
            // Joined under the directory even when it lacks a trailing separator.
            let name = format!("ibrdtn_{}.log", log_timestamp(&now));
            doc.push("logfile", logs.join(name).display());
        }

        doc.push("net_rebind", "yes");

        tracing::debug!(
            lines = doc.len(),
            interfaces = prefs.interfaces.len(),
            dry_run = self.dry_run,
            "synthesized daemon config"
        );

        Ok(Synthesis {
            document: doc,
            key_file,
            purged_blobs,
        })
    }
}

/// Unpadded calendar fields of `now`: year, zero-based month, day of month
/// (twice), hour of the 12-hour clock (0-11), minute, second.
///
/// The repeated day field is part of the daemon's established log naming.
pub fn log_timestamp(now: &NaiveDateTime) -> String {
    format!(
        "{}{}{}{}{}{}{}",
        now.year(),
        now.month0(),
        now.day(),
        now.day(),
        now.hour() % 12,
        now.minute(),
        now.second()
    )
}
