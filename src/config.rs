//! Configuration management for chromium-forensics

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ForensicsError, Result};

/// Artifact kinds that can be extracted from a Chromium profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    History,
    Cookies,
    Bookmarks,
    Downloads,
    Extensions,
}

impl ArtifactKind {
    /// Every kind, in the order `all` runs them.
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::History,
        ArtifactKind::Downloads,
        ArtifactKind::Cookies,
        ArtifactKind::Bookmarks,
        ArtifactKind::Extensions,
    ];

    /// Name of the profile entry holding this artifact.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::History | ArtifactKind::Downloads => "History",
            ArtifactKind::Cookies => "Cookies",
            ArtifactKind::Bookmarks => "Bookmarks",
            ArtifactKind::Extensions => "Extensions",
        }
    }

    /// Stable identifier used on the command line and in sink output.
    pub fn id(&self) -> &'static str {
        match self {
            ArtifactKind::History => "history",
            ArtifactKind::Cookies => "cookies",
            ArtifactKind::Bookmarks => "bookmarks",
            ArtifactKind::Downloads => "downloads",
            ArtifactKind::Extensions => "extensions",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ArtifactKind {
    type Err = ForensicsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "history" | "urls" => Ok(ArtifactKind::History),
            "cookies" | "cookie" => Ok(ArtifactKind::Cookies),
            "bookmarks" | "bookmark" => Ok(ArtifactKind::Bookmarks),
            "downloads" | "download" => Ok(ArtifactKind::Downloads),
            "extensions" | "extension" => Ok(ArtifactKind::Extensions),
            _ => Err(ForensicsError::Config(format!(
                "Unsupported artifact kind: {}",
                s
            ))),
        }
    }
}

/// Settings shared by every stage of one extraction run
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Directory holding the per-browser folders (`~/.config` on Linux).
    pub config_root: PathBuf,
    /// Where snapshots are written.
    pub scratch_dir: PathBuf,
    /// OS user the profiles belong to, copied into every record.
    pub username: String,
    /// Browser ids to restrict the catalog to; empty means all.
    pub browsers: Vec<String>,
}

impl ExtractionConfig {
    pub fn new(config_root: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_root: config_root.into(),
            scratch_dir: scratch_dir.into(),
            username: detect_username(),
            browsers: Vec::new(),
        }
    }

    /// Build a configuration from the host environment.
    pub fn detect() -> Result<Self> {
        let config_root = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .ok_or_else(|| {
                ForensicsError::Config("Cannot determine config directory".to_string())
            })?;
        Ok(Self::new(config_root, env::temp_dir()))
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_browsers(mut self, browsers: Vec<String>) -> Self {
        self.browsers = browsers;
        self
    }

    /// Reject settings that would make every acquisition fail.
    pub fn validate(&self) -> Result<()> {
        if !self.scratch_dir.is_dir() {
            return Err(ForensicsError::Config(format!(
                "Scratch directory does not exist: {:?}",
                self.scratch_dir
            )));
        }
        for id in &self.browsers {
            if crate::browser::variant_by_id(id).is_none() {
                return Err(ForensicsError::Config(format!("Unsupported browser: {}", id)));
            }
        }
        Ok(())
    }
}

fn detect_username() -> String {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .find_map(|key| env::var(key).ok().filter(|value| !value.is_empty()))
        .unwrap_or_else(|| "Unknown".to_string())
}
