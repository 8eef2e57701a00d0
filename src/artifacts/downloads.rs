//! Rows of the `downloads` table of a `History` store

use super::labels;
use super::{FieldSpec, FieldType, FieldValue, RecordContext, TableSource};
use crate::schema::{ColumnSpec, RawRow, SqlType};
use crate::timestamp;

pub const FIELDS: [FieldSpec; 20] = [
    FieldSpec::new("UserName", "User", 100, FieldType::String, "Account that owns the profile"),
    FieldSpec::new("Browser", "Browser", 110, FieldType::String, "Browser the profile belongs to"),
    FieldSpec::new("DownloadID", "ID", 60, FieldType::Integer, "Row id in the downloads table"),
    FieldSpec::new("FilePath", "File", 300, FieldType::String, "Where the file was saved"),
    FieldSpec::new("SourceURL", "Source URL", 300, FieldType::String, "Address the file came from"),
    FieldSpec::new(
        "ReferrerURL",
        "Referrer",
        250,
        FieldType::String,
        "Page that linked to the file",
    ),
    FieldSpec::new(
        "MimeType",
        "MIME type",
        120,
        FieldType::String,
        "Content type reported by the server",
    ),
    FieldSpec::new(
        "StartTimeUTC",
        "Started (raw)",
        -1,
        FieldType::Integer,
        "Start time, Chromium microseconds",
    ),
    FieldSpec::new("StartDate", "Started", 150, FieldType::String, "Start time, UTC"),
    FieldSpec::new(
        "EndTimeUTC",
        "Finished (raw)",
        -1,
        FieldType::Integer,
        "End time, Chromium microseconds",
    ),
    FieldSpec::new("EndDate", "Finished", 150, FieldType::String, "End time, UTC"),
    FieldSpec::new("ReceivedBytes", "Received (bytes)", -1, FieldType::Integer, "Bytes received"),
    FieldSpec::new(
        "ReceivedSize",
        "Received",
        90,
        FieldType::String,
        "Bytes received, human readable",
    ),
    FieldSpec::new("TotalBytes", "Total (bytes)", -1, FieldType::Integer, "Expected size in bytes"),
    FieldSpec::new("TotalSize", "Total", 90, FieldType::String, "Expected size, human readable"),
    FieldSpec::new("Progress", "Progress, %", 70, FieldType::Integer, "Share of the file received"),
    FieldSpec::new("Status", "Status", 100, FieldType::String, "Download state"),
    FieldSpec::new("DangerLevel", "Danger", 110, FieldType::String, "Safe Browsing verdict"),
    FieldSpec::new("Opened", "Opened", 60, FieldType::Boolean, "File was opened from the browser"),
    FieldSpec::new("DataSource", "Source", -1, FieldType::String, "Store the record was read from"),
];

const COLUMNS: [ColumnSpec; 12] = [
    ColumnSpec::new("id", SqlType::Integer),
    ColumnSpec::with_alternates("target_path", &["current_path", "full_path"], SqlType::Text),
    ColumnSpec::with_alternates("tab_url", &["url"], SqlType::Text),
    ColumnSpec::with_alternates("tab_referrer_url", &["referrer"], SqlType::Text),
    ColumnSpec::new("mime_type", SqlType::Text),
    ColumnSpec::new("start_time", SqlType::Integer),
    ColumnSpec::new("end_time", SqlType::Integer),
    ColumnSpec::new("received_bytes", SqlType::Integer),
    ColumnSpec::new("total_bytes", SqlType::Integer),
    ColumnSpec::new("state", SqlType::Integer),
    ColumnSpec::new("danger_type", SqlType::Integer),
    ColumnSpec::new("opened", SqlType::Integer),
];

pub const SOURCE: TableSource = TableSource {
    table: "downloads",
    columns: &COLUMNS,
    order_by: Some("start_time"),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    pub user_name: String,
    pub browser: String,
    pub download_id: i64,
    pub file_path: String,
    pub source_url: String,
    pub referrer_url: String,
    pub mime_type: String,
    pub start_time_utc: i64,
    pub start_date: String,
    pub end_time_utc: i64,
    pub end_date: String,
    pub received_bytes: i64,
    pub received_size: String,
    pub total_bytes: i64,
    pub total_size: String,
    pub progress: i64,
    pub status: String,
    pub danger_level: String,
    pub opened: bool,
    pub data_source: String,
}

impl DownloadRecord {
    pub fn values(&self) -> Vec<FieldValue> {
        vec![
            self.user_name.clone().into(),
            self.browser.clone().into(),
            self.download_id.into(),
            self.file_path.clone().into(),
            self.source_url.clone().into(),
            self.referrer_url.clone().into(),
            self.mime_type.clone().into(),
            self.start_time_utc.into(),
            self.start_date.clone().into(),
            self.end_time_utc.into(),
            self.end_date.clone().into(),
            self.received_bytes.into(),
            self.received_size.clone().into(),
            self.total_bytes.into(),
            self.total_size.clone().into(),
            self.progress.into(),
            self.status.clone().into(),
            self.danger_level.clone().into(),
            self.opened.into(),
            self.data_source.clone().into(),
        ]
    }
}

pub fn normalize(row: &RawRow, ctx: &RecordContext<'_>) -> DownloadRecord {
    let start_time_utc = row.int("start_time");
    let end_time_utc = row.int("end_time");
    let received_bytes = row.int("received_bytes");
    let total_bytes = row.int("total_bytes");

    DownloadRecord {
        user_name: ctx.username.to_string(),
        browser: ctx.browser().to_string(),
        download_id: row.int("id"),
        file_path: row.text("target_path"),
        source_url: row.text("tab_url"),
        referrer_url: row.text("tab_referrer_url"),
        mime_type: row.text("mime_type"),
        start_time_utc,
        start_date: timestamp::to_calendar(start_time_utc),
        end_time_utc,
        end_date: timestamp::to_calendar(end_time_utc),
        received_bytes,
        received_size: labels::format_size(received_bytes),
        total_bytes,
        total_size: labels::format_size(total_bytes),
        progress: labels::download_progress(received_bytes, total_bytes),
        status: labels::download_state(row.int("state")).to_string(),
        danger_level: labels::danger_level(row.int("danger_type")).to_string(),
        opened: row.flag("opened"),
        data_source: ctx.data_source(),
    }
}
