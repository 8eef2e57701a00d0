//! Cookie value resolution
//!
//! Chromium keeps a cookie's value either in the `value` column or, wrapped
//! with AES keyed by OS keychain material, in `encrypted_value`. Resolution
//! walks a ladder from trusted to guessed and never fails:
//! plaintext, oracle lookup, heuristic cleanup, opaque placeholder, empty.

use encoding_rs::{Encoding, UTF_16LE, UTF_8, WINDOWS_1252};
use std::fmt;

pub mod linux;
pub mod oracle;

pub use oracle::{CookieJar, CookieOracle, NullOracle, OracleCache, OracleProvider};

/// Version prefixes Chromium puts in front of AEAD-wrapped values.
pub const AEAD_PREFIXES: [&str; 2] = ["v10", "v11"];

const MIN_FRAGMENT_CHARS: usize = 4;
const MIN_PRINTABLE_PERCENT: usize = 80;

/// How much a resolved cookie value can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueProvenance {
    Plaintext,
    DecryptedViaOracle,
    HeuristicCleanup,
    OpaquePlaceholder,
}

impl ValueProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueProvenance::Plaintext => "plaintext",
            ValueProvenance::DecryptedViaOracle => "decrypted-via-oracle",
            ValueProvenance::HeuristicCleanup => "heuristic-cleanup",
            ValueProvenance::OpaquePlaceholder => "opaque-placeholder",
        }
    }
}

impl fmt::Display for ValueProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The effective value of a cookie and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieValueResolution {
    pub value: String,
    pub provenance: ValueProvenance,
}

impl CookieValueResolution {
    fn new(value: impl Into<String>, provenance: ValueProvenance) -> Self {
        Self {
            value: value.into(),
            provenance,
        }
    }
}

/// Determine the value analysts should see for one cookie.
pub fn resolve(
    name: &str,
    host: &str,
    plaintext: &str,
    encrypted: &[u8],
    oracle: &dyn CookieOracle,
) -> CookieValueResolution {
    if !plaintext.is_empty() {
        return CookieValueResolution::new(plaintext, ValueProvenance::Plaintext);
    }

    if let Some(value) = oracle.lookup(host, name) {
        return CookieValueResolution::new(value, ValueProvenance::DecryptedViaOracle);
    }

    if let Some(fragment) = printable_fragment(encrypted) {
        return CookieValueResolution::new(
            format!("[cipher fragment: {}]", fragment),
            ValueProvenance::HeuristicCleanup,
        );
    }

    if let Some(scheme) = aead_scheme(encrypted) {
        return CookieValueResolution::new(
            format!("[encrypted {}: {} bytes]", scheme, encrypted.len()),
            ValueProvenance::OpaquePlaceholder,
        );
    }

    CookieValueResolution::new(String::new(), ValueProvenance::Plaintext)
}

/// The AEAD version prefix of `blob`, if it carries one.
pub fn aead_scheme(blob: &[u8]) -> Option<&'static str> {
    AEAD_PREFIXES
        .iter()
        .copied()
        .find(|prefix| blob.starts_with(prefix.as_bytes()))
}

/// Lossy, non-cryptographic recovery of readable text from a blob.
///
/// The version prefix is skipped. A candidate decoding is accepted only when
/// enough of it is printable ASCII, so real ciphertext is rejected.
fn printable_fragment(blob: &[u8]) -> Option<String> {
    let payload = match aead_scheme(blob) {
        Some(scheme) => &blob[scheme.len()..],
        None => blob,
    };
    if payload.is_empty() {
        return None;
    }

    let encodings: [&'static Encoding; 3] = [UTF_8, UTF_16LE, WINDOWS_1252];
    encodings.iter().find_map(|encoding| {
        let decoded = encoding.decode_without_bom_handling_and_without_replacement(payload)?;
        let total = decoded.chars().count();
        let kept: String = decoded.chars().filter(|c| is_printable(*c)).collect();
        let kept_count = kept.chars().count();
        if kept_count >= MIN_FRAGMENT_CHARS && kept_count * 100 >= total * MIN_PRINTABLE_PERCENT {
            log::debug!("Recovered cookie fragment as {}", encoding.name());
            Some(kept)
        } else {
            None
        }
    })
}

fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || c == ' '
}
