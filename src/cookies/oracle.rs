//! Optional sources of already-decrypted cookie values

use crate::browser::BrowserVariant;
use crate::error::{ForensicsError, Result};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Looks up a cookie's decrypted value by host and name
pub trait CookieOracle {
    fn lookup(&self, host: &str, name: &str) -> Option<String>;
}

/// Oracle used when no decryption capability is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOracle;

impl CookieOracle for NullOracle {
    fn lookup(&self, _host: &str, _name: &str) -> Option<String> {
        None
    }
}

/// Key used by cookie jars: `host|name`.
pub fn jar_key(host: &str, name: &str) -> String {
    format!("{}|{}", host, name)
}

/// Decrypted cookie values collected for one browser
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CookieJar {
    entries: HashMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, host: &str, name: &str, value: impl Into<String>) {
        self.entries.insert(jar_key(host, name), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CookieOracle for CookieJar {
    fn lookup(&self, host: &str, name: &str) -> Option<String> {
        self.entries.get(&jar_key(host, name)).cloned()
    }
}

/// Builds a cookie jar for a browser from its (snapshotted) cookie store
pub trait OracleProvider {
    fn collect(&self, browser: &BrowserVariant, cookies_db: &Path) -> Result<CookieJar>;
}

/// Jars exported ahead of time into a JSON file
///
/// The file maps browser ids (or display names) to `{"host|name": value}`.
#[derive(Debug, Clone, Default)]
pub struct JarFileProvider {
    jars: HashMap<String, CookieJar>,
}

impl JarFileProvider {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ForensicsError::Oracle(format!("Failed to read cookie jar file {:?}: {}", path, e))
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let jars: HashMap<String, CookieJar> = serde_json::from_str(contents)?;
        Ok(Self { jars })
    }
}

impl OracleProvider for JarFileProvider {
    fn collect(&self, browser: &BrowserVariant, _cookies_db: &Path) -> Result<CookieJar> {
        // Exact id, then exact display name, then either one ignoring case.
        let jar = self
            .jars
            .get(browser.id)
            .or_else(|| self.jars.get(browser.display_name))
            .or_else(|| {
                self.jars
                    .iter()
                    .filter(|(key, _)| browser.matches(key))
                    .min_by(|(a, _), (b, _)| a.cmp(b))
                    .map(|(_, jar)| jar)
            });
        Ok(jar.cloned().unwrap_or_default())
    }
}

/// Per-run memo of collected jars, one per browser
///
/// Collection is deferred until the first lookup, so browsers whose cookies
/// are all stored in plaintext never pay for it.
pub struct OracleCache {
    provider: Option<Box<dyn OracleProvider>>,
    jars: RefCell<HashMap<&'static str, Rc<CookieJar>>>,
}

impl OracleCache {
    pub fn new(provider: Option<Box<dyn OracleProvider>>) -> Self {
        Self {
            provider,
            jars: RefCell::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Oracle view for one browser whose cookie store snapshot is `cookies_db`.
    pub fn oracle_for<'a>(
        &'a self,
        browser: &'static BrowserVariant,
        cookies_db: &Path,
    ) -> CachedOracle<'a> {
        CachedOracle {
            cache: self,
            browser,
            cookies_db: cookies_db.to_path_buf(),
        }
    }

    fn jar(&self, browser: &'static BrowserVariant, cookies_db: &Path) -> Option<Rc<CookieJar>> {
        let provider = self.provider.as_ref()?;
        if let Some(jar) = self.jars.borrow().get(browser.id) {
            return Some(Rc::clone(jar));
        }

        let jar = match provider.collect(browser, cookies_db) {
            Ok(jar) => {
                log::info!(
                    "Cookie oracle collected {} values for {}",
                    jar.len(),
                    browser.display_name
                );
                jar
            }
            Err(err) => {
                log::warn!(
                    "Cookie oracle unavailable for {}: {}",
                    browser.display_name,
                    err
                );
                CookieJar::new()
            }
        };
        let jar = Rc::new(jar);
        self.jars.borrow_mut().insert(browser.id, Rc::clone(&jar));
        Some(jar)
    }
}

/// [`CookieOracle`] backed by an [`OracleCache`] entry
pub struct CachedOracle<'a> {
    cache: &'a OracleCache,
    browser: &'static BrowserVariant,
    cookies_db: PathBuf,
}

impl CookieOracle for CachedOracle<'_> {
    fn lookup(&self, host: &str, name: &str) -> Option<String> {
        self.cache
            .jar(self.browser, &self.cookies_db)?
            .lookup(host, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::CATALOG;
    use std::cell::Cell;

    struct CountingProvider {
        calls: Rc<Cell<usize>>,
    }

    impl OracleProvider for CountingProvider {
        fn collect(&self, _browser: &BrowserVariant, _cookies_db: &Path) -> Result<CookieJar> {
            self.calls.set(self.calls.get() + 1);
            let mut jar = CookieJar::new();
            jar.insert(".example.com", "sid", "secret");
            Ok(jar)
        }
    }

    struct FailingProvider;

    impl OracleProvider for FailingProvider {
        fn collect(&self, _browser: &BrowserVariant, _cookies_db: &Path) -> Result<CookieJar> {
            Err(ForensicsError::Oracle("keyring locked".to_string()))
        }
    }

    #[test]
    fn jar_lookup_uses_host_and_name() {
        let mut jar = CookieJar::new();
        jar.insert("example.com", "a", "1");
        assert_eq!(jar.lookup("example.com", "a"), Some("1".to_string()));
        assert_eq!(jar.lookup("example.com", "b"), None);
        assert_eq!(NullOracle.lookup("example.com", "a"), None);
    }

    #[test]
    fn jar_file_provider_matches_id_or_display_name() {
        let provider = JarFileProvider::from_json(
            r#"{"Brave": {"example.com|sid": "abc"}, "chromium": {}}"#,
        )
        .expect("parse jars");
        let brave = provider
            .collect(&CATALOG[4], Path::new("Cookies"))
            .expect("collect");
        assert_eq!(brave.lookup("example.com", "sid"), Some("abc".to_string()));
        let chrome = provider
            .collect(&CATALOG[0], Path::new("Cookies"))
            .expect("collect");
        assert!(chrome.is_empty());
    }

    #[test]
    fn jar_file_provider_prefers_exact_id_over_display_name() {
        let provider = JarFileProvider::from_json(
            r#"{"Brave": {"example.com|sid": "by-name"},
                "brave": {"example.com|sid": "by-id"},
                "CHROMIUM": {"example.com|sid": "upper"}}"#,
        )
        .expect("parse jars");
        let brave = provider
            .collect(&CATALOG[4], Path::new("Cookies"))
            .expect("collect");
        assert_eq!(brave.lookup("example.com", "sid"), Some("by-id".to_string()));
        let chromium = provider
            .collect(&CATALOG[1], Path::new("Cookies"))
            .expect("collect");
        assert_eq!(chromium.lookup("example.com", "sid"), Some("upper".to_string()));
    }

    #[test]
    fn jar_file_provider_rejects_malformed_json() {
        assert!(JarFileProvider::from_json("[1, 2]").is_err());
    }

    #[test]
    fn cache_collects_once_per_browser_and_lazily() {
        let calls = Rc::new(Cell::new(0));
        let cache = OracleCache::new(Some(Box::new(CountingProvider {
            calls: Rc::clone(&calls),
        })));
        let chrome = &CATALOG[0];

        let oracle = cache.oracle_for(chrome, Path::new("Cookies"));
        assert_eq!(calls.get(), 0);
        assert_eq!(oracle.lookup(".example.com", "sid"), Some("secret".to_string()));
        assert_eq!(oracle.lookup(".example.com", "other"), None);
        let again = cache.oracle_for(chrome, Path::new("Cookies"));
        assert!(again.lookup(".example.com", "sid").is_some());
        assert_eq!(calls.get(), 1);

        let brave = cache.oracle_for(&CATALOG[4], Path::new("Cookies"));
        brave.lookup(".example.com", "sid");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn failing_or_missing_provider_yields_no_values() {
        let cache = OracleCache::new(Some(Box::new(FailingProvider)));
        let oracle = cache.oracle_for(&CATALOG[1], Path::new("Cookies"));
        assert_eq!(oracle.lookup("example.com", "sid"), None);

        let disabled = OracleCache::new(None);
        assert!(!disabled.is_enabled());
        let oracle = disabled.oracle_for(&CATALOG[1], Path::new("Cookies"));
        assert_eq!(oracle.lookup("example.com", "sid"), None);
    }
}
