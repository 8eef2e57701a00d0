//! Best-effort oracle for cookies wrapped with Chromium's Linux fallback key
//!
//! When no keyring is reachable, Chromium on Linux encrypts cookie values
//! (`v10`) with AES-128-CBC under a key derived from a fixed password. Those
//! values can be recovered without OS secrets. `v11` values need the keyring
//! password and are left to the opaque placeholder.

use super::oracle::{CookieJar, OracleProvider};
use crate::browser::BrowserVariant;
use crate::error::{ForensicsError, Result};
use crate::schema::{self, ColumnSpec, RawRow, SqlType};
use aes::Aes128;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use pbkdf2::pbkdf2_hmac;
use rusqlite::{Connection, OpenFlags};
use sha1::Sha1;
use std::path::Path;

const KEY_DERIVE_SALT: &[u8] = b"saltysalt";
const KEY_DERIVE_ITERATIONS: u32 = 1;
const KEY_LENGTH: usize = 16;
const AES_IV: &[u8; 16] = b"                ";
const LINUX_V10_PASSWORD: &[u8] = b"peanuts";
/// Cookie DB version from which plaintexts carry a SHA-256 of the host.
const HASH_PREFIX_META_VERSION: i64 = 24;
const HASH_PREFIX_LEN: usize = 32;

const JAR_COLUMNS: [ColumnSpec; 3] = [
    ColumnSpec::new("host_key", SqlType::Text),
    ColumnSpec::new("name", SqlType::Text),
    ColumnSpec::new("encrypted_value", SqlType::Blob),
];

/// Decrypts `v10` cookie values with the well-known Linux keys
pub struct LinuxV10Provider {
    v10_key: [u8; KEY_LENGTH],
    empty_key: [u8; KEY_LENGTH],
}

impl LinuxV10Provider {
    pub fn new() -> Self {
        Self {
            v10_key: derive_key(LINUX_V10_PASSWORD),
            empty_key: derive_key(b""),
        }
    }

    /// Decrypt one `v10` blob; anything else yields `None`.
    pub fn decrypt(&self, encrypted_value: &[u8], meta_version: i64) -> Option<String> {
        let ciphertext = encrypted_value.strip_prefix(b"v10")?;
        let hash_prefix = meta_version >= HASH_PREFIX_META_VERSION;
        [&self.v10_key, &self.empty_key]
            .into_iter()
            .find_map(|key| {
                let decrypted = decrypt_aes_cbc(ciphertext, key).ok()?;
                let trimmed = if hash_prefix && decrypted.len() > HASH_PREFIX_LEN {
                    &decrypted[HASH_PREFIX_LEN..]
                } else {
                    &decrypted[..]
                };
                String::from_utf8(trimmed.to_vec()).ok()
            })
    }
}

impl Default for LinuxV10Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleProvider for LinuxV10Provider {
    fn collect(&self, browser: &BrowserVariant, cookies_db: &Path) -> Result<CookieJar> {
        let conn = Connection::open_with_flags(cookies_db, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| {
                ForensicsError::Oracle(format!("Failed to open cookies DB {:?}: {}", cookies_db, e))
            })?;
        let meta_version = read_meta_version(&conn);
        let columns = schema::table_columns(&conn, "cookies")?;
        let query = schema::build_query("cookies", &JAR_COLUMNS, columns.as_ref(), None)?;

        let mut stmt = conn.prepare(&query.sql)?;
        let mut rows = stmt.query([])?;
        let mut jar = CookieJar::new();
        let mut failures = 0usize;
        while let Some(row) = rows.next()? {
            let raw = RawRow::from_sql_row(row, &query)?;
            let blob = raw.bytes("encrypted_value");
            if !blob.starts_with(b"v10") {
                continue;
            }
            match self.decrypt(&blob, meta_version) {
                Some(value) => jar.insert(&raw.text("host_key"), &raw.text("name"), value),
                None => failures += 1,
            }
        }

        if failures > 0 {
            log::debug!(
                "{} v10 cookies of {} did not decrypt with the fallback keys",
                failures,
                browser.display_name
            );
        }
        Ok(jar)
    }
}

fn read_meta_version(conn: &Connection) -> i64 {
    let result: std::result::Result<String, _> =
        conn.query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
            row.get(0)
        });
    result
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

fn derive_key(password: &[u8]) -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha1>(password, KEY_DERIVE_SALT, KEY_DERIVE_ITERATIONS, &mut key);
    key
}

fn decrypt_aes_cbc(ciphertext: &[u8], key: &[u8; KEY_LENGTH]) -> Result<Vec<u8>> {
    let mut buffer = ciphertext.to_vec();
    let decryptor = cbc::Decryptor::<Aes128>::new_from_slices(key, AES_IV)
        .map_err(|e| ForensicsError::Oracle(format!("Failed to create AES decryptor: {}", e)))?;
    let plaintext = decryptor
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|_| ForensicsError::Oracle("Failed to decrypt cookie".to_string()))?;
    Ok(plaintext.to_vec())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{derive_key, AES_IV, LINUX_V10_PASSWORD};
    use aes::Aes128;
    use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};

    /// Encrypt `plaintext` the way Chromium does without a keyring.
    pub fn encrypt_v10(plaintext: &[u8]) -> Vec<u8> {
        let key = derive_key(LINUX_V10_PASSWORD);
        let encryptor = cbc::Encryptor::<Aes128>::new_from_slices(&key, AES_IV).expect("cipher");
        let mut buffer = plaintext.to_vec();
        buffer.resize(plaintext.len() + 16, 0);
        let ciphertext = encryptor
            .encrypt_padded_mut::<Pkcs7>(&mut buffer, plaintext.len())
            .expect("padding");
        let mut blob = b"v10".to_vec();
        blob.extend_from_slice(ciphertext);
        blob
    }
}
