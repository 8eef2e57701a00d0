//! chromium-forensics - forensic artifact extraction for Chromium-family browsers
//!
//! Locates history, downloads, cookies, bookmarks and extensions in browser
//! profiles, reads them through temporary snapshots so live files are never
//! touched, and normalizes every artifact into a fixed-shape record.

pub mod artifacts;
pub mod browser;
pub mod cli;
pub mod config;
pub mod cookies;
pub mod error;
pub mod exit_code;
pub mod extractor;
pub mod i18n;
pub mod logging;
pub mod progress;
pub mod schema;
pub mod sink;
pub mod snapshot;
pub mod timestamp;
pub mod utils;

pub use artifacts::CanonicalRecord;
pub use config::{ArtifactKind, ExtractionConfig};
pub use error::{ForensicsError, Result};
pub use extractor::{CancellationToken, Extractor, RunSummary};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
