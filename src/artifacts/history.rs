//! Visited URLs from the `urls` table of a `History` store

use super::{FieldSpec, FieldType, FieldValue, RecordContext, TableSource};
use crate::schema::{ColumnSpec, RawRow, SqlType};
use crate::timestamp;

pub const FIELDS: [FieldSpec; 9] = [
    FieldSpec::new("UserName", "User", 100, FieldType::String, "Account that owns the profile"),
    FieldSpec::new("Browser", "Browser", 110, FieldType::String, "Browser the profile belongs to"),
    FieldSpec::new("URL", "URL", 400, FieldType::String, "Visited address"),
    FieldSpec::new("Title", "Title", 300, FieldType::String, "Page title"),
    FieldSpec::new("VisitCount", "Visits", 70, FieldType::Integer, "Number of visits"),
    FieldSpec::new(
        "TypedCount",
        "Typed",
        70,
        FieldType::Integer,
        "Times the URL was typed by hand",
    ),
    FieldSpec::new(
        "LastVisitUTC",
        "Last visit (raw)",
        -1,
        FieldType::Integer,
        "Last visit, Chromium microseconds",
    ),
    FieldSpec::new("LastVisitDate", "Last visit", 150, FieldType::String, "Last visit, UTC"),
    FieldSpec::new("DataSource", "Source", -1, FieldType::String, "Store the record was read from"),
];

const COLUMNS: [ColumnSpec; 5] = [
    ColumnSpec::new("url", SqlType::Text),
    ColumnSpec::new("title", SqlType::Text),
    ColumnSpec::new("visit_count", SqlType::Integer),
    ColumnSpec::new("typed_count", SqlType::Integer),
    ColumnSpec::new("last_visit_time", SqlType::Integer),
];

pub const SOURCE: TableSource = TableSource {
    table: "urls",
    columns: &COLUMNS,
    order_by: Some("last_visit_time"),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub user_name: String,
    pub browser: String,
    pub url: String,
    pub title: String,
    pub visit_count: i64,
    pub typed_count: i64,
    pub last_visit_utc: i64,
    pub last_visit_date: String,
    pub data_source: String,
}

impl HistoryRecord {
    pub fn values(&self) -> Vec<FieldValue> {
        vec![
            self.user_name.clone().into(),
            self.browser.clone().into(),
            self.url.clone().into(),
            self.title.clone().into(),
            self.visit_count.into(),
            self.typed_count.into(),
            self.last_visit_utc.into(),
            self.last_visit_date.clone().into(),
            self.data_source.clone().into(),
        ]
    }
}

pub fn normalize(row: &RawRow, ctx: &RecordContext<'_>) -> HistoryRecord {
    let last_visit_utc = row.int("last_visit_time");
    HistoryRecord {
        user_name: ctx.username.to_string(),
        browser: ctx.browser().to_string(),
        url: row.text("url"),
        title: row.text("title"),
        visit_count: row.int("visit_count"),
        typed_count: row.int("typed_count"),
        last_visit_utc,
        last_visit_date: timestamp::to_calendar(last_visit_utc),
        data_source: ctx.data_source(),
    }
}
