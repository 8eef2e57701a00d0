//! Chromium-family browser catalog
//!
//! This module enumerates the browser variants whose profiles can be
//! examined and the profile locations discovered for them on this host.

use crate::config::ArtifactKind;
use std::path::PathBuf;

pub mod locator;

pub use locator::locate;

/// A supported Chromium-based browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrowserVariant {
    /// Folder name under the config root.
    pub id: &'static str,
    pub display_name: &'static str,
}

impl BrowserVariant {
    /// True when `name` is this variant's folder id or display name.
    pub fn matches(&self, name: &str) -> bool {
        self.id.eq_ignore_ascii_case(name) || self.display_name.eq_ignore_ascii_case(name)
    }
}

/// Supported browsers, in scan order.
pub static CATALOG: [BrowserVariant; 5] = [
    BrowserVariant {
        id: "google-chrome",
        display_name: "Google Chrome",
    },
    BrowserVariant {
        id: "chromium",
        display_name: "Chromium",
    },
    BrowserVariant {
        id: "microsoft-edge",
        display_name: "Microsoft Edge",
    },
    BrowserVariant {
        id: "opera",
        display_name: "Opera",
    },
    BrowserVariant {
        id: "brave",
        display_name: "Brave",
    },
];

/// Profile folder scanned for every variant
pub const DEFAULT_PROFILE: &str = "Default";

/// Look up a variant by folder id or display name, ignoring case
pub fn variant_by_id(id: &str) -> Option<&'static BrowserVariant> {
    CATALOG.iter().find(|variant| variant.matches(id))
}

/// An artifact store found inside a browser profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLocation {
    pub browser: &'static BrowserVariant,
    pub profile_root: PathBuf,
    pub kind: ArtifactKind,
    /// File (or directory, for extensions) holding the artifact.
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::{variant_by_id, CATALOG};

    #[test]
    fn catalog_keeps_declaration_order() {
        let ids: Vec<_> = CATALOG.iter().map(|variant| variant.id).collect();
        assert_eq!(
            ids,
            ["google-chrome", "chromium", "microsoft-edge", "opera", "brave"]
        );
    }

    #[test]
    fn variant_lookup_accepts_id_and_display_name() {
        assert_eq!(variant_by_id("Brave").map(|v| v.id), Some("brave"));
        assert_eq!(
            variant_by_id("microsoft edge").map(|v| v.id),
            Some("microsoft-edge")
        );
        assert!(variant_by_id("firefox").is_none());
    }
}
