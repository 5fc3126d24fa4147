//! End-to-end synthesis behaviour against a real temp filesystem layout.

use std::fs;

use assert_fs::prelude::*;
use chrono::{NaiveDate, NaiveDateTime};
use dtn_config::{ConfigDocument, Synthesizer};
use dtn_core::{
    preferences::keys, DeviceId, HostLayout, IdentityDigest, IdentityResolver, PreferenceSet,
    Preferences, StoragePaths,
};
use predicates::prelude::predicate;
use rstest::rstest;

struct Host {
    files: assert_fs::TempDir,
    storage: assert_fs::TempDir,
}

impl Host {
    fn new() -> Self {
        Self {
            files: assert_fs::TempDir::new().expect("files dir"),
            storage: assert_fs::TempDir::new().expect("storage dir"),
        }
    }

    fn layout(&self) -> HostLayout {
        HostLayout::new(
            self.files.path(),
            StoragePaths::resolve_under(self.storage.path()),
        )
    }

    fn synthesize(&self, set: &PreferenceSet) -> ConfigDocument {
        self.synthesize_at(set, noon())
    }

    fn synthesize_at(&self, set: &PreferenceSet, now: NaiveDateTime) -> ConfigDocument {
        let prefs = Preferences::from_set(set).expect("typed prefs");
        Synthesizer::new(self.layout(), DeviceId::from("9774d56d682e549c"))
            .synthesize(&prefs, now)
            .expect("synthesize")
            .document
    }
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("timestamp")
}

fn lines_for(doc: &ConfigDocument, prefix: &str) -> Vec<String> {
    doc.entries()
        .iter()
        .filter(|e| e.key.starts_with(prefix))
        .map(|e| format!("{} = {}", e.key, e.value))
        .collect()
}

// ---------------------------------------------------------------------------
// 1. Security material
// ---------------------------------------------------------------------------

#[test]
fn bab_with_empty_key_writes_empty_file_and_no_security_lines() {
    let host = Host::new();
    let set = PreferenceSet::new()
        .with(keys::SECURITY_MODE, "bab")
        .with(keys::SECURITY_BAB_KEY, "");

    let doc = host.synthesize(&set);

    host.files.child("default-bab-key.mac").assert("");
    assert!(!doc.contains_key("security_level"));
    assert!(!doc.contains_key("security_bab_default_key"));
    assert!(doc.contains_key("security_path"));
}

#[test]
fn bab_with_key_writes_secret_and_references_it() {
    let host = Host::new();
    let set = PreferenceSet::new()
        .with(keys::SECURITY_MODE, "bab")
        .with(keys::SECURITY_BAB_KEY, "s3cr3t");

    let doc = host.synthesize(&set);

    let key_file = host.files.child("default-bab-key.mac");
    key_file.assert("s3cr3t");
    assert_eq!(doc.get("security_level"), Some("1"));
    assert_eq!(
        doc.get("security_bab_default_key"),
        Some(key_file.path().display().to_string().as_str())
    );
    assert_eq!(
        doc.get("security_path"),
        Some(host.files.path().join("bpsec").display().to_string().as_str())
    );
}

#[test]
fn disabled_security_touches_nothing() {
    let host = Host::new();
    let doc = host.synthesize(&PreferenceSet::new().with(keys::SECURITY_BAB_KEY, "s3cr3t"));

    host.files
        .child("default-bab-key.mac")
        .assert(predicate::path::missing());
    host.files.child("bpsec").assert(predicate::path::missing());
    assert!(!doc.contains_key("security_path"));
}

// ---------------------------------------------------------------------------
// 2. Interfaces
// ---------------------------------------------------------------------------

#[test]
fn only_enabled_interfaces_are_configured() {
    let host = Host::new();
    let set = PreferenceSet::new()
        .with("interface_wlan0", true)
        .with("interface_eth0", false);

    let doc = host.synthesize(&set);

    let net_interfaces = doc.get("net_interfaces").expect("net_interfaces line");
    assert!(net_interfaces.split(' ').any(|n| n == "wlan0"));
    assert!(!net_interfaces.contains("eth0"));
    assert_eq!(
        lines_for(&doc, "net_wlan0_"),
        vec![
            "net_wlan0_type = tcp",
            "net_wlan0_interface = wlan0",
            "net_wlan0_port = 4556",
        ]
    );
    assert!(lines_for(&doc, "net_eth0_").is_empty());
}

#[test]
fn every_enabled_interface_appears_exactly_once() {
    let host = Host::new();
    let set = PreferenceSet::new()
        .with("interface_wlan0", true)
        .with("interface_eth0", true)
        .with("interface_usb0", true);

    let doc = host.synthesize(&set);

    for key in ["net_interfaces", "net_internet"] {
        let mut names: Vec<&str> = doc.get(key).expect(key).split_whitespace().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["eth0", "usb0", "wlan0"], "{key}");
    }
}

#[test]
fn no_interfaces_yields_empty_aggregates() {
    let host = Host::new();
    let doc = host.synthesize(&PreferenceSet::new());
    assert_eq!(doc.get("net_interfaces"), Some(""));
    assert_eq!(doc.get("net_internet"), Some(""));
}

// ---------------------------------------------------------------------------
// 3. Limits and toggles
// ---------------------------------------------------------------------------

#[rstest]
#[case(false, false)]
#[case(true, false)]
#[case(false, true)]
#[case(true, true)]
fn lifetime_constraints_follow_preferences(#[case] lifetime: bool, #[case] timestamp: bool) {
    let host = Host::new();
    let set = PreferenceSet::new()
        .with(keys::CONSTRAINS_LIFETIME, lifetime)
        .with(keys::CONSTRAINS_TIMESTAMP, timestamp);

    let doc = host.synthesize(&set);

    assert_eq!(doc.get("limit_lifetime").is_some(), lifetime);
    assert_eq!(doc.get("limit_predated_timestamp").is_some(), timestamp);
    if lifetime {
        assert_eq!(doc.get("limit_lifetime"), Some("1209600"));
    }
    if timestamp {
        assert_eq!(doc.get("limit_predated_timestamp"), Some("1209600"));
    }
    assert_eq!(doc.get("limit_blocksize"), Some("50M"));
}

#[rstest]
#[case(true, "1")]
#[case(false, "0")]
fn discovery_announce_is_numeric(#[case] announce: bool, #[case] expected: &str) {
    let host = Host::new();
    let doc = host.synthesize(&PreferenceSet::new().with(keys::DISCOVERY_ANNOUNCE, announce));
    assert_eq!(doc.get("discovery_announce"), Some(expected));
    assert_eq!(doc.get("discovery_address"), Some("ff02::142 224.0.0.142"));
}

#[test]
fn idle_timeout_only_when_checked() {
    let host = Host::new();
    assert!(!host.synthesize(&PreferenceSet::new()).contains_key("tcp_idle_timeout"));
    let doc = host.synthesize(&PreferenceSet::new().with(keys::CHECK_IDLE_TIMEOUT, true));
    assert_eq!(doc.get("tcp_idle_timeout"), Some("30"));
}

#[test]
fn device_identity_used_when_endpoint_unset() {
    let host = Host::new();
    let doc = host.synthesize(&PreferenceSet::with_defaults());
    let expected = IdentityResolver::new().resolve(&DeviceId::from("9774d56d682e549c"));
    assert_eq!(doc.get("local_uri"), Some(expected.0.as_str()));
}

#[test]
fn fallback_identity_keeps_endpoint_shape() {
    let host = Host::new();
    let prefs = Preferences::default();
    let doc = Synthesizer::new(host.layout(), DeviceId::from("9774d56d682e549c"))
        .with_resolver(IdentityResolver::with_digest(IdentityDigest::Unavailable))
        .synthesize(&prefs, noon())
        .expect("synthesize")
        .document;
    assert_eq!(doc.get("local_uri"), Some("dtn://android-d56d682e.dtn"));
}

// ---------------------------------------------------------------------------
// 4. Storage
// ---------------------------------------------------------------------------

#[test]
fn blob_storage_is_purged_but_subdirectories_survive() {
    let host = Host::new();
    let layout = host.layout();
    let blob = layout.storage.blob.clone().expect("blob path");
    fs::write(blob.join("one.blob"), "1").expect("seed");
    fs::write(blob.join("two.blob"), "2").expect("seed");
    fs::create_dir_all(blob.join("keep")).expect("seed dir");
    fs::write(blob.join("keep").join("inner.blob"), "3").expect("seed nested");

    let doc = host.synthesize(&PreferenceSet::new());

    assert_eq!(doc.get("blob_path"), Some(blob.display().to_string().as_str()));
    assert!(!blob.join("one.blob").exists());
    assert!(!blob.join("two.blob").exists());
    assert!(blob.join("keep").join("inner.blob").exists());
}

#[test]
fn storage_and_log_lines_follow_layout() {
    let host = Host::new();
    let doc = host.synthesize(&PreferenceSet::new());
    let logs = host.storage.path().join("logs");

    assert_eq!(
        doc.get("storage_path"),
        Some(host.storage.path().join("bundles").display().to_string().as_str())
    );
    assert_eq!(
        doc.get("logfile"),
        Some(logs.join("ibrdtn_202691616000.log").display().to_string().as_str())
    );
}

#[test]
fn unresolved_storage_omits_lines() {
    let host = Host::new();
    let prefs = Preferences::default();
    let doc = Synthesizer::new(
        HostLayout::new(host.files.path(), StoragePaths::default()),
        DeviceId::from("device-identifier"),
    )
    .synthesize(&prefs, noon())
    .expect("synthesize")
    .document;
    for key in ["blob_path", "storage_path", "logfile"] {
        assert!(!doc.contains_key(key), "{key} must be omitted");
    }
    assert_eq!(doc.keys().last(), Some("net_rebind"));
}

// ---------------------------------------------------------------------------
// 5. Determinism
// ---------------------------------------------------------------------------

#[test]
fn identical_inputs_give_identical_documents_apart_from_logfile() {
    let host = Host::new();
    let set = PreferenceSet::with_defaults()
        .with("interface_wlan0", true)
        .with("interface_eth0", true)
        .with(keys::SECURITY_MODE, "bab")
        .with(keys::SECURITY_BAB_KEY, "s3cr3t")
        .with(keys::CONSTRAINS_LIFETIME, true);

    let later = NaiveDate::from_ymd_opt(2027, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .expect("timestamp");
    let first = host.synthesize_at(&set, noon());
    let second = host.synthesize_at(&set, later);

    let strip = |doc: &ConfigDocument| -> Vec<String> {
        doc.render()
            .lines()
            .filter(|l| !l.starts_with("logfile = "))
            .map(str::to_owned)
            .collect()
    };
    assert_eq!(strip(&first), strip(&second));
    assert_ne!(first.get("logfile"), second.get("logfile"));
    assert_eq!(host.synthesize_at(&set, noon()).render(), first.render());
}

#[test]
fn full_document_order_is_pinned() {
    let host = Host::new();
    let set = PreferenceSet::new()
        .with(keys::ENDPOINT_ID, "dtn://node.dtn")
        .with(keys::ROUTING, "epidemic")
        .with(keys::CONSTRAINS_LIFETIME, true)
        .with(keys::CONSTRAINS_TIMESTAMP, true)
        .with(keys::SECURITY_MODE, "bab")
        .with(keys::SECURITY_BAB_KEY, "k")
        .with(keys::CHECK_IDLE_TIMEOUT, true)
        .with("interface_wlan0", true);

    let keys: Vec<String> = host
        .synthesize(&set)
        .keys()
        .map(str::to_owned)
        .collect();
    assert_eq!(
        keys,
        vec![
            "local_uri",
            "routing",
            "limit_lifetime",
            "limit_predated_timestamp",
            "limit_blocksize",
            "security_path",
            "security_level",
            "security_bab_default_key",
            "tcp_idle_timeout",
            "discovery_address",
            "discovery_announce",
            "net_wlan0_type",
            "net_wlan0_interface",
            "net_wlan0_port",
            "net_interfaces",
            "net_internet",
            "blob_path",
            "storage_path",
            "logfile",
            "net_rebind",
        ]
    );
}
