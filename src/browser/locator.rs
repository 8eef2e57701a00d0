use super::{BrowserVariant, ProfileLocation, CATALOG, DEFAULT_PROFILE};
use crate::config::ArtifactKind;
use crate::utils::FileUtils;
use std::path::{Path, PathBuf};

/// Find the artifact stores of `kind` that exist and are readable.
///
/// Results follow catalog order. `browsers` narrows the catalog to the given
/// ids; an empty slice scans every variant. Misses are never errors.
pub fn locate(
    config_root: &Path,
    kind: ArtifactKind,
    browsers: &[String],
) -> Vec<ProfileLocation> {
    CATALOG
        .iter()
        .filter(|variant| is_selected(variant, browsers))
        .filter_map(|variant| locate_variant(config_root, variant, kind))
        .collect()
}

fn is_selected(variant: &BrowserVariant, browsers: &[String]) -> bool {
    browsers.is_empty() || browsers.iter().any(|id| variant.matches(id))
}

fn locate_variant(
    config_root: &Path,
    variant: &'static BrowserVariant,
    kind: ArtifactKind,
) -> Option<ProfileLocation> {
    let profile_root = config_root.join(variant.id).join(DEFAULT_PROFILE);
    let path = candidate_paths(&profile_root, kind)
        .into_iter()
        .find(|path| is_readable(path, kind))?;
    log::debug!("Found {} store for {}: {:?}", kind, variant.display_name, path);
    Some(ProfileLocation {
        browser: variant,
        profile_root,
        kind,
        path,
    })
}

fn candidate_paths(profile_root: &Path, kind: ArtifactKind) -> Vec<PathBuf> {
    let mut paths = vec![profile_root.join(kind.file_name())];
    // Chromium 96+ moved the cookie store into the Network folder.
    if kind == ArtifactKind::Cookies {
        paths.push(profile_root.join("Network").join(kind.file_name()));
    }
    paths
}

fn is_readable(path: &Path, kind: ArtifactKind) -> bool {
    let result = match kind {
        ArtifactKind::Extensions => FileUtils::check_dir_readable(path),
        _ => FileUtils::check_file_readable(path),
    };
    match result {
        Ok(()) => true,
        Err(err) => {
            log::debug!("Skipping {:?}: {}", path, err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::locate;
    use crate::config::ArtifactKind;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn touch(root: &Path, browser: &str, relative: &str) {
        let path = root.join(browser).join("Default").join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(path, b"data").expect("write file");
    }

    #[test]
    fn locate_returns_existing_stores_in_catalog_order() {
        let temp = tempdir().expect("tempdir");
        touch(temp.path(), "brave", "History");
        touch(temp.path(), "google-chrome", "History");
        touch(temp.path(), "opera", "Cookies");

        let found = locate(temp.path(), ArtifactKind::History, &[]);
        let ids: Vec<_> = found.iter().map(|loc| loc.browser.id).collect();
        assert_eq!(ids, ["google-chrome", "brave"]);
        assert!(found[0].path.ends_with("google-chrome/Default/History"));
        assert_eq!(found[0].kind, ArtifactKind::History);
    }

    #[test]
    fn locate_falls_back_to_network_cookies() {
        let temp = tempdir().expect("tempdir");
        touch(temp.path(), "chromium", "Network/Cookies");

        let found = locate(temp.path(), ArtifactKind::Cookies, &[]);
        assert_eq!(found.len(), 1);
        assert!(found[0].path.ends_with("Default/Network/Cookies"));
    }

    #[test]
    fn locate_requires_directory_for_extensions() {
        let temp = tempdir().expect("tempdir");
        touch(temp.path(), "google-chrome", "Extensions");
        fs::create_dir_all(temp.path().join("brave/Default/Extensions")).expect("mkdir");

        let found = locate(temp.path(), ArtifactKind::Extensions, &[]);
        let ids: Vec<_> = found.iter().map(|loc| loc.browser.id).collect();
        assert_eq!(ids, ["brave"]);
    }

    #[test]
    fn locate_honours_browser_filter_and_missing_root() {
        let temp = tempdir().expect("tempdir");
        touch(temp.path(), "brave", "Bookmarks");
        touch(temp.path(), "opera", "Bookmarks");

        let found = locate(temp.path(), ArtifactKind::Bookmarks, &["Opera".to_string()]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].browser.id, "opera");

        assert!(locate(&temp.path().join("missing"), ArtifactKind::Bookmarks, &[]).is_empty());
    }
}
