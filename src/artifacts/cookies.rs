//! Rows of the `cookies` table, with values resolved through the cookie ladder

use super::labels;
use super::{FieldSpec, FieldType, FieldValue, RecordContext, TableSource};
use crate::cookies;
use crate::schema::{ColumnSpec, RawRow, SqlType};
use crate::timestamp;

/// Shown instead of an expiry date for cookies that never expire.
pub const NO_EXPIRY: &str = "No expiry";

pub const FIELDS: [FieldSpec; 21] = [
    FieldSpec::new("UserName", "User", 100, FieldType::String, "Account that owns the profile"),
    FieldSpec::new("Browser", "Browser", 110, FieldType::String, "Browser the profile belongs to"),
    FieldSpec::new("Host", "Host", 200, FieldType::String, "Domain the cookie is scoped to"),
    FieldSpec::new("CookieName", "Name", 150, FieldType::String, "Cookie name"),
    FieldSpec::new(
        "CookieValue",
        "Value",
        250,
        FieldType::String,
        "Cookie value or a placeholder for it",
    ),
    FieldSpec::new(
        "ValueProvenance",
        "Value source",
        130,
        FieldType::String,
        "How the value was obtained",
    ),
    FieldSpec::new("Path", "Path", 100, FieldType::String, "Path the cookie is scoped to"),
    FieldSpec::new(
        "CreationUTC",
        "Created (raw)",
        -1,
        FieldType::Integer,
        "Creation time, Chromium microseconds",
    ),
    FieldSpec::new("CreationDate", "Created", 150, FieldType::String, "Creation time, UTC"),
    FieldSpec::new(
        "ExpiresUTC",
        "Expires (raw)",
        -1,
        FieldType::Integer,
        "Expiry time, Chromium microseconds",
    ),
    FieldSpec::new("ExpiresDate", "Expires", 150, FieldType::String, "Expiry time, UTC"),
    FieldSpec::new(
        "LastAccessUTC",
        "Last access (raw)",
        -1,
        FieldType::Integer,
        "Last access, Chromium microseconds",
    ),
    FieldSpec::new("LastAccessDate", "Last access", 150, FieldType::String, "Last access, UTC"),
    FieldSpec::new(
        "LastUpdateUTC",
        "Last update (raw)",
        -1,
        FieldType::Integer,
        "Last update, Chromium microseconds",
    ),
    FieldSpec::new("LastUpdateDate", "Last update", 150, FieldType::String, "Last update, UTC"),
    FieldSpec::new("IsSecure", "Secure", 60, FieldType::Boolean, "Sent over HTTPS only"),
    FieldSpec::new("IsHttpOnly", "HttpOnly", 60, FieldType::Boolean, "Hidden from scripts"),
    FieldSpec::new("CookieType", "Type", 90, FieldType::String, "Persistent or session cookie"),
    FieldSpec::new("Priority", "Priority", 70, FieldType::String, "Eviction priority"),
    FieldSpec::new("SameSite", "SameSite", 70, FieldType::String, "Cross-site sending policy"),
    FieldSpec::new("DataSource", "Source", -1, FieldType::String, "Store the record was read from"),
];

const COLUMNS: [ColumnSpec; 14] = [
    ColumnSpec::new("host_key", SqlType::Text),
    ColumnSpec::new("name", SqlType::Text),
    ColumnSpec::new("value", SqlType::Text),
    ColumnSpec::new("encrypted_value", SqlType::Blob),
    ColumnSpec::new("path", SqlType::Text),
    ColumnSpec::new("creation_utc", SqlType::Integer),
    ColumnSpec::new("expires_utc", SqlType::Integer),
    ColumnSpec::new("last_access_utc", SqlType::Integer),
    ColumnSpec::new("last_update_utc", SqlType::Integer),
    ColumnSpec::with_alternates("is_secure", &["secure"], SqlType::Integer),
    ColumnSpec::with_alternates("is_httponly", &["httponly"], SqlType::Integer),
    ColumnSpec::with_alternates("is_persistent", &["persistent"], SqlType::Integer),
    ColumnSpec::new("priority", SqlType::Integer),
    ColumnSpec::new("samesite", SqlType::Integer),
];

pub const SOURCE: TableSource = TableSource {
    table: "cookies",
    columns: &COLUMNS,
    order_by: Some("last_access_utc"),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieRecord {
    pub user_name: String,
    pub browser: String,
    pub host: String,
    pub name: String,
    pub value: String,
    pub value_provenance: cookies::ValueProvenance,
    pub path: String,
    pub creation_utc: i64,
    pub creation_date: String,
    pub expires_utc: i64,
    pub expires_date: String,
    pub last_access_utc: i64,
    pub last_access_date: String,
    pub last_update_utc: i64,
    pub last_update_date: String,
    pub is_secure: bool,
    pub is_http_only: bool,
    pub cookie_type: String,
    pub priority: String,
    pub same_site: String,
    pub data_source: String,
}

impl CookieRecord {
    pub fn values(&self) -> Vec<FieldValue> {
        vec![
            self.user_name.clone().into(),
            self.browser.clone().into(),
            self.host.clone().into(),
            self.name.clone().into(),
            self.value.clone().into(),
            self.value_provenance.as_str().into(),
            self.path.clone().into(),
            self.creation_utc.into(),
            self.creation_date.clone().into(),
            self.expires_utc.into(),
            self.expires_date.clone().into(),
            self.last_access_utc.into(),
            self.last_access_date.clone().into(),
            self.last_update_utc.into(),
            self.last_update_date.clone().into(),
            self.is_secure.into(),
            self.is_http_only.into(),
            self.cookie_type.clone().into(),
            self.priority.clone().into(),
            self.same_site.clone().into(),
            self.data_source.clone().into(),
        ]
    }
}

pub fn normalize(row: &RawRow, ctx: &RecordContext<'_>) -> CookieRecord {
    let host = row.text("host_key");
    let name = row.text("name");
    let resolution = cookies::resolve(
        &name,
        &host,
        &row.text("value"),
        &row.bytes("encrypted_value"),
        ctx.oracle,
    );

    let creation_utc = row.int("creation_utc");
    let expires_utc = row.int("expires_utc");
    let last_access_utc = row.int("last_access_utc");
    let last_update_utc = row.int("last_update_utc");
    // Placeholder columns read as 0, which would wrongly mean "session".
    let persistent = match row.get("is_persistent") {
        Some(rusqlite::types::Value::Null) | None => expires_utc != 0,
        Some(_) => row.flag("is_persistent"),
    };

    CookieRecord {
        user_name: ctx.username.to_string(),
        browser: ctx.browser().to_string(),
        host,
        name,
        value: resolution.value,
        value_provenance: resolution.provenance,
        path: row.text("path"),
        creation_utc,
        creation_date: timestamp::to_calendar(creation_utc),
        expires_utc,
        expires_date: timestamp::to_calendar_or(expires_utc, NO_EXPIRY),
        last_access_utc,
        last_access_date: timestamp::to_calendar(last_access_utc),
        last_update_utc,
        last_update_date: timestamp::to_calendar(last_update_utc),
        is_secure: row.flag("is_secure"),
        is_http_only: row.flag("is_httponly"),
        cookie_type: labels::cookie_type(persistent).to_string(),
        priority: labels::cookie_priority(row.int("priority")).to_string(),
        same_site: labels::same_site(row.int("samesite")).to_string(),
        data_source: ctx.data_source(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::test_support::location;
    use crate::artifacts::CanonicalRecord;
    use crate::config::ArtifactKind;
    use crate::cookies::{CookieJar, NullOracle, ValueProvenance};

    fn cookie_row() -> RawRow {
        RawRow::new()
            .with("host_key", ".example.com".to_string())
            .with("name", "sid".to_string())
            .with("value", String::new())
            .with("encrypted_value", b"v10\x01\x02\x03\x04\x05".to_vec())
            .with("path", "/".to_string())
            .with("creation_utc", 13_318_267_369_295_313_i64)
            .with("expires_utc", 0)
            .with("last_access_utc", 13_318_267_369_295_313_i64)
            .with("is_secure", 1)
            .with("is_httponly", 0)
            .with("is_persistent", 0)
            .with("priority", 1)
            .with("samesite", -1)
    }

    #[test]
    fn maps_cookie_with_opaque_value() {
        let location = location(ArtifactKind::Cookies);
        let ctx = RecordContext {
            username: "analyst",
            location: &location,
            oracle: &NullOracle,
        };
        let record = normalize(&cookie_row(), &ctx);
        assert_eq!(record.host, ".example.com");
        assert_eq!(record.value, "[encrypted v10: 8 bytes]");
        assert_eq!(record.value_provenance, ValueProvenance::OpaquePlaceholder);
        assert_eq!(record.creation_date, "2023.01.15 14:42:49");
        assert_eq!(record.expires_date, NO_EXPIRY);
        assert_eq!(record.last_update_date, "");
        assert!(record.is_secure);
        assert!(!record.is_http_only);
        assert_eq!(record.cookie_type, "Session");
        assert_eq!(record.priority, "Medium");
        assert_eq!(record.same_site, "Not set");
    }

    #[test]
    fn oracle_value_reaches_the_record() {
        let location = location(ArtifactKind::Cookies);
        let mut jar = CookieJar::new();
        jar.insert(".example.com", "sid", "abc123");
        let ctx = RecordContext {
            username: "analyst",
            location: &location,
            oracle: &jar,
        };
        let record = normalize(&cookie_row(), &ctx);
        assert_eq!(record.value, "abc123");
        assert_eq!(
            CanonicalRecord::Cookie(record).field("ValueProvenance"),
            Some(FieldValue::from("decrypted-via-oracle"))
        );
    }

    #[test]
    fn persistence_falls_back_to_expiry_when_column_is_absent() {
        let location = location(ArtifactKind::Cookies);
        let ctx = RecordContext {
            username: "analyst",
            location: &location,
            oracle: &NullOracle,
        };
        let row = RawRow::new()
            .with("expires_utc", 13_400_000_000_000_000_i64)
            .with("is_persistent", rusqlite::types::Value::Null)
            .with("samesite", 8);
        let record = normalize(&row, &ctx);
        assert_eq!(record.cookie_type, "Persistent");
        assert_eq!(record.same_site, labels::UNKNOWN);
        assert_eq!(record.value, "");
    }
}
