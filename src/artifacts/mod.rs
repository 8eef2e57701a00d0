//! Canonical records for each artifact kind
//!
//! Raw rows (SQLite projections or rows synthesized from JSON profile files)
//! are mapped into fixed-shape records. Mapping is pure and never fails:
//! unknown codes get an explicit `Unknown` label, missing values read as
//! zero or empty.

use crate::browser::ProfileLocation;
use crate::config::ArtifactKind;
use crate::cookies::CookieOracle;
use crate::schema::{ColumnSpec, RawRow};
use serde::Serialize;

pub mod bookmarks;
pub mod cookies;
pub mod downloads;
pub mod extensions;
pub mod history;
pub mod labels;

pub use bookmarks::BookmarkRecord;
pub use cookies::CookieRecord;
pub use downloads::DownloadRecord;
pub use extensions::ExtensionRecord;
pub use history::HistoryRecord;

/// Type tag of an output field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Boolean,
}

/// Declaration of one output field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    /// Display width; -1 hides the column by default.
    pub width: i32,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn new(
        name: &'static str,
        label: &'static str,
        width: i32,
        field_type: FieldType,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            width,
            field_type,
            description,
        }
    }
}

/// A single output value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Text(_) => FieldType::String,
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Boolean(_) => FieldType::Boolean,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

/// Where a SQLite-backed artifact lives inside its store
#[derive(Debug, Clone, Copy)]
pub struct TableSource {
    pub table: &'static str,
    pub columns: &'static [ColumnSpec],
    pub order_by: Option<&'static str>,
}

/// Field table declared to the sink for `kind`.
pub fn fields(kind: ArtifactKind) -> &'static [FieldSpec] {
    match kind {
        ArtifactKind::History => &history::FIELDS,
        ArtifactKind::Cookies => &cookies::FIELDS,
        ArtifactKind::Bookmarks => &bookmarks::FIELDS,
        ArtifactKind::Downloads => &downloads::FIELDS,
        ArtifactKind::Extensions => &extensions::FIELDS,
    }
}

/// SQLite table backing `kind`, or `None` for JSON-backed kinds.
pub fn table_source(kind: ArtifactKind) -> Option<TableSource> {
    match kind {
        ArtifactKind::History => Some(history::SOURCE),
        ArtifactKind::Cookies => Some(cookies::SOURCE),
        ArtifactKind::Downloads => Some(downloads::SOURCE),
        ArtifactKind::Bookmarks | ArtifactKind::Extensions => None,
    }
}

/// Everything besides the raw row that a record is built from
pub struct RecordContext<'a> {
    pub username: &'a str,
    pub location: &'a ProfileLocation,
    pub oracle: &'a dyn CookieOracle,
}

impl RecordContext<'_> {
    pub fn browser(&self) -> &'static str {
        self.location.browser.display_name
    }

    /// Live store path, as recorded in provenance fields.
    pub fn data_source(&self) -> String {
        self.location.path.display().to_string()
    }
}

/// A normalized artifact instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalRecord {
    History(HistoryRecord),
    Cookie(CookieRecord),
    Bookmark(BookmarkRecord),
    Download(DownloadRecord),
    Extension(ExtensionRecord),
}

impl CanonicalRecord {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            CanonicalRecord::History(_) => ArtifactKind::History,
            CanonicalRecord::Cookie(_) => ArtifactKind::Cookies,
            CanonicalRecord::Bookmark(_) => ArtifactKind::Bookmarks,
            CanonicalRecord::Download(_) => ArtifactKind::Downloads,
            CanonicalRecord::Extension(_) => ArtifactKind::Extensions,
        }
    }

    pub fn browser(&self) -> &str {
        match self {
            CanonicalRecord::History(record) => &record.browser,
            CanonicalRecord::Cookie(record) => &record.browser,
            CanonicalRecord::Bookmark(record) => &record.browser,
            CanonicalRecord::Download(record) => &record.browser,
            CanonicalRecord::Extension(record) => &record.browser,
        }
    }

    pub fn data_source(&self) -> &str {
        match self {
            CanonicalRecord::History(record) => &record.data_source,
            CanonicalRecord::Cookie(record) => &record.data_source,
            CanonicalRecord::Bookmark(record) => &record.data_source,
            CanonicalRecord::Download(record) => &record.data_source,
            CanonicalRecord::Extension(record) => &record.data_source,
        }
    }

    /// One value per entry of [`fields`] for this record's kind, in order.
    pub fn values(&self) -> Vec<FieldValue> {
        match self {
            CanonicalRecord::History(record) => record.values(),
            CanonicalRecord::Cookie(record) => record.values(),
            CanonicalRecord::Bookmark(record) => record.values(),
            CanonicalRecord::Download(record) => record.values(),
            CanonicalRecord::Extension(record) => record.values(),
        }
    }

    /// Value of the field called `name`, if this kind declares it.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        fields(self.kind())
            .iter()
            .position(|spec| spec.name == name)
            .and_then(|index| self.values().into_iter().nth(index))
    }
}

/// Map a raw row into the record for `ctx.location.kind`.
pub fn normalize(row: &RawRow, ctx: &RecordContext<'_>) -> CanonicalRecord {
    match ctx.location.kind {
        ArtifactKind::History => CanonicalRecord::History(history::normalize(row, ctx)),
        ArtifactKind::Cookies => CanonicalRecord::Cookie(cookies::normalize(row, ctx)),
        ArtifactKind::Bookmarks => CanonicalRecord::Bookmark(bookmarks::normalize(row, ctx)),
        ArtifactKind::Downloads => CanonicalRecord::Download(downloads::normalize(row, ctx)),
        ArtifactKind::Extensions => CanonicalRecord::Extension(extensions::normalize(row, ctx)),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::location;
    use super::*;
    use crate::cookies::NullOracle;

    #[test]
    fn every_kind_emits_one_value_per_field_with_matching_types() {
        for kind in ArtifactKind::ALL {
            let location = location(kind);
            let ctx = RecordContext {
                username: "analyst",
                location: &location,
                oracle: &NullOracle,
            };
            let record = normalize(&RawRow::new(), &ctx);
            assert_eq!(record.kind(), kind);
            let values = record.values();
            let specs = fields(kind);
            assert_eq!(values.len(), specs.len(), "{kind}");
            for (value, spec) in values.iter().zip(specs) {
                assert_eq!(value.field_type(), spec.field_type, "{kind}.{}", spec.name);
            }
            assert_eq!(record.browser(), "Google Chrome");
            assert_eq!(record.field("UserName"), Some(FieldValue::from("analyst")));
        }
    }

    #[test]
    fn field_names_are_unique_per_kind() {
        for kind in ArtifactKind::ALL {
            let mut names: Vec<_> = fields(kind).iter().map(|spec| spec.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), fields(kind).len(), "{kind}");
            assert!(names.contains(&"DataSource"));
            assert!(names.contains(&"Browser"));
        }
    }

    #[test]
    fn only_sqlite_kinds_have_tables() {
        assert_eq!(table_source(ArtifactKind::History).map(|s| s.table), Some("urls"));
        assert_eq!(table_source(ArtifactKind::Downloads).map(|s| s.table), Some("downloads"));
        assert_eq!(table_source(ArtifactKind::Cookies).map(|s| s.table), Some("cookies"));
        assert!(table_source(ArtifactKind::Bookmarks).is_none());
        assert!(table_source(ArtifactKind::Extensions).is_none());
    }
}
