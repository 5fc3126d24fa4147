//! # dtn-config
//!
//! Configuration synthesis for the DTN daemon.
//!
//! Call [`Synthesizer::synthesize`] to turn a [`dtn_core::Preferences`]
//! snapshot into a [`ConfigDocument`], then [`write_document`] to replace the
//! daemon's config file with it.

pub mod blob;
pub mod diff;
pub mod document;
pub mod error;
pub mod key_material;
pub mod synthesizer;
pub mod writer;

pub use diff::diff_config;
pub use document::{ConfigDocument, ConfigEntry};
pub use error::ConfigError;
pub use synthesizer::{log_timestamp, Synthesis, Synthesizer};
pub use writer::write_document;
