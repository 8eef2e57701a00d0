//! Bookmarks from the JSON `Bookmarks` file
//!
//! The file holds a forest under `roots`. Folders nest arbitrarily deep, so
//! the tree is walked with an explicit worklist rather than recursion.

use super::{FieldSpec, FieldType, FieldValue, RecordContext};
use crate::error::{ForensicsError, Result};
use crate::schema::RawRow;
use crate::timestamp;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const FIELDS: [FieldSpec; 10] = [
    FieldSpec::new("UserName", "User", 100, FieldType::String, "Account that owns the profile"),
    FieldSpec::new("Browser", "Browser", 110, FieldType::String, "Browser the profile belongs to"),
    FieldSpec::new("Folder", "Folder", 200, FieldType::String, "Slash-separated folder path"),
    FieldSpec::new("Title", "Title", 250, FieldType::String, "Bookmark title"),
    FieldSpec::new("URL", "URL", 400, FieldType::String, "Bookmarked address"),
    FieldSpec::new(
        "DateAddedUTC",
        "Added (raw)",
        -1,
        FieldType::Integer,
        "Creation time, Chromium microseconds",
    ),
    FieldSpec::new("DateAdded", "Added", 150, FieldType::String, "Creation time, UTC"),
    FieldSpec::new(
        "DateModifiedUTC",
        "Modified (raw)",
        -1,
        FieldType::Integer,
        "Last change, Chromium microseconds",
    ),
    FieldSpec::new("DateModified", "Modified", 150, FieldType::String, "Last change, UTC"),
    FieldSpec::new("DataSource", "Source", -1, FieldType::String, "Store the record was read from"),
];

/// Well-known roots, in output order, with their display names.
const KNOWN_ROOTS: [(&str, &str); 3] = [
    ("bookmark_bar", "Bookmarks bar"),
    ("other", "Other bookmarks"),
    ("synced", "Synced bookmarks"),
];

const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkRecord {
    pub user_name: String,
    pub browser: String,
    pub folder: String,
    pub title: String,
    pub url: String,
    pub date_added_utc: i64,
    pub date_added: String,
    pub date_modified_utc: i64,
    pub date_modified: String,
    pub data_source: String,
}

impl BookmarkRecord {
    pub fn values(&self) -> Vec<FieldValue> {
        vec![
            self.user_name.clone().into(),
            self.browser.clone().into(),
            self.folder.clone().into(),
            self.title.clone().into(),
            self.url.clone().into(),
            self.date_added_utc.into(),
            self.date_added.clone().into(),
            self.date_modified_utc.into(),
            self.date_modified.clone().into(),
            self.data_source.clone().into(),
        ]
    }
}

/// Read every URL node of a bookmarks file as a raw row.
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    let contents = fs::read(path)?;
    let document: Value = serde_json::from_slice(&contents)?;
    let roots = document
        .get("roots")
        .and_then(Value::as_object)
        .ok_or_else(|| ForensicsError::MalformedRow(format!("{:?} has no bookmark roots", path)))?;

    let mut ordered: Vec<(String, &Value)> = KNOWN_ROOTS
        .iter()
        .filter_map(|(key, label)| roots.get(*key).map(|node| (label.to_string(), node)))
        .collect();
    ordered.extend(
        roots
            .iter()
            .filter(|(key, _)| !KNOWN_ROOTS.iter().any(|(known, _)| *known == key.as_str()))
            .map(|(key, node)| (key.clone(), node)),
    );

    let mut rows = Vec::new();
    let mut worklist: Vec<(&Value, String)> = Vec::new();
    for (label, node) in ordered.iter().rev() {
        push_children(&mut worklist, *node, label);
    }

    while let Some((node, folder)) = worklist.pop() {
        match node.get("type").and_then(Value::as_str) {
            Some("url") => rows.push(url_row(node, &folder)),
            Some("folder") => {
                let path = format!("{}/{}", folder, node_name(node));
                push_children(&mut worklist, node, &path);
            }
            _ => {}
        }
    }
    Ok(rows)
}

// Children are pushed in reverse so they pop in document order.
fn push_children<'a>(worklist: &mut Vec<(&'a Value, String)>, node: &'a Value, folder: &str) {
    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for child in children.iter().rev() {
            worklist.push((child, folder.to_string()));
        }
    }
}

fn node_name(node: &Value) -> String {
    match node.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNTITLED.to_string(),
    }
}

fn url_row(node: &Value, folder: &str) -> RawRow {
    RawRow::new()
        .with("folder", folder.to_string())
        .with("name", node_name(node))
        .with("url", text_of(node.get("url")))
        .with("date_added", text_of(node.get("date_added")))
        .with("date_modified", text_of(node.get("date_modified")))
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

pub fn normalize(row: &RawRow, ctx: &RecordContext<'_>) -> BookmarkRecord {
    let date_added_utc = timestamp::parse_epoch_text(&row.text("date_added"));
    let date_modified_utc = timestamp::parse_epoch_text(&row.text("date_modified"));
    BookmarkRecord {
        user_name: ctx.username.to_string(),
        browser: ctx.browser().to_string(),
        folder: row.text("folder"),
        title: row.text("name"),
        url: row.text("url"),
        date_added_utc,
        date_added: timestamp::to_calendar(date_added_utc),
        date_modified_utc,
        date_modified: timestamp::to_calendar(date_modified_utc),
        data_source: ctx.data_source(),
    }
}
