//! Installed extensions, read from `Extensions/<id>/<version>/manifest.json`

use super::{FieldSpec, FieldType, FieldValue, RecordContext};
use crate::error::{ForensicsError, Result};
use crate::schema::RawRow;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const FIELDS: [FieldSpec; 10] = [
    FieldSpec::new("UserName", "User", 100, FieldType::String, "Account that owns the profile"),
    FieldSpec::new("Browser", "Browser", 110, FieldType::String, "Browser the profile belongs to"),
    FieldSpec::new(
        "ExtensionID",
        "Extension ID",
        250,
        FieldType::String,
        "Store identifier of the extension",
    ),
    FieldSpec::new("Version", "Folder version", 100, FieldType::String, "Version folder on disk"),
    FieldSpec::new("Name", "Name", 200, FieldType::String, "Extension name"),
    FieldSpec::new(
        "VersionNumber",
        "Version",
        100,
        FieldType::String,
        "Version declared in the manifest",
    ),
    FieldSpec::new("Description", "Description", 300, FieldType::String, "Extension description"),
    FieldSpec::new("Author", "Author", 150, FieldType::String, "Extension author"),
    FieldSpec::new("Permissions", "Permissions", 400, FieldType::String, "Requested permissions"),
    FieldSpec::new(
        "DataSource",
        "Source",
        -1,
        FieldType::String,
        "Manifest the record was read from",
    ),
];

const MANIFEST_FILE: &str = "manifest.json";
const FALLBACK_LOCALE: &str = "en";
const MESSAGE_PREFIX: &str = "__MSG_";
const MESSAGE_SUFFIX: &str = "__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRecord {
    pub user_name: String,
    pub browser: String,
    pub extension_id: String,
    pub version: String,
    pub name: String,
    pub version_number: String,
    pub description: String,
    pub author: String,
    pub permissions: String,
    pub data_source: String,
}

impl ExtensionRecord {
    pub fn values(&self) -> Vec<FieldValue> {
        vec![
            self.user_name.clone().into(),
            self.browser.clone().into(),
            self.extension_id.clone().into(),
            self.version.clone().into(),
            self.name.clone().into(),
            self.version_number.clone().into(),
            self.description.clone().into(),
            self.author.clone().into(),
            self.permissions.clone().into(),
            self.data_source.clone().into(),
        ]
    }
}

/// Scan an `Extensions` directory, one row per version folder with a
/// readable manifest. Unreadable manifests are skipped with a warning.
pub fn read_rows(extensions_dir: &Path) -> Result<Vec<RawRow>> {
    let mut rows = Vec::new();
    for extension_dir in sorted_subdirs(extensions_dir)? {
        let extension_id = file_name(&extension_dir);
        let versions = match sorted_subdirs(&extension_dir) {
            Ok(versions) => versions,
            Err(err) => {
                log::warn!("Skipping extension {}: {}", extension_id, err);
                continue;
            }
        };
        for version_dir in versions {
            let manifest_path = version_dir.join(MANIFEST_FILE);
            if !manifest_path.is_file() {
                continue;
            }
            match read_manifest(&manifest_path) {
                Ok(manifest) => rows.push(manifest_row(
                    &extension_id,
                    &version_dir,
                    &manifest_path,
                    &manifest,
                )),
                Err(err) => log::warn!("Skipping manifest {:?}: {}", manifest_path, err),
            }
        }
    }
    Ok(rows)
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_manifest(path: &Path) -> Result<Map<String, Value>> {
    let contents = fs::read(path)?;
    match serde_json::from_slice(&contents)? {
        Value::Object(manifest) => Ok(manifest),
        _ => Err(ForensicsError::MalformedRow(
            "manifest is not a JSON object".to_string(),
        )),
    }
}

fn manifest_row(
    extension_id: &str,
    version_dir: &Path,
    manifest_path: &Path,
    manifest: &Map<String, Value>,
) -> RawRow {
    let messages = LocaleMessages::load(manifest, version_dir);
    RawRow::new()
        .with("extension_id", extension_id.to_string())
        .with("version_dir", file_name(version_dir))
        .with("name", messages.localize(&display_string(manifest.get("name"))))
        .with("version", display_string(manifest.get("version")))
        .with(
            "description",
            messages.localize(&display_string(manifest.get("description"))),
        )
        .with("author", display_string(manifest.get("author")))
        .with("permissions", permissions(manifest.get("permissions")))
        .with("manifest_path", manifest_path.display().to_string())
}

/// Strings as-is, null as empty, anything else as compact JSON.
fn display_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn permissions(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| display_string(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        other => display_string(other),
    }
}

/// `_locales/<locale>/messages.json` of one extension version
struct LocaleMessages {
    messages: Map<String, Value>,
}

impl LocaleMessages {
    fn load(manifest: &Map<String, Value>, version_dir: &Path) -> Self {
        let locale = manifest
            .get("default_locale")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_LOCALE);
        let path = version_dir.join("_locales").join(locale).join("messages.json");
        let messages = fs::read(&path)
            .ok()
            .and_then(|contents| serde_json::from_slice::<Value>(&contents).ok())
            .and_then(|value| match value {
                Value::Object(messages) => Some(messages),
                _ => None,
            })
            .unwrap_or_default();
        Self { messages }
    }

    /// Resolve a `__MSG_key__` placeholder, or return `text` unchanged.
    fn localize(&self, text: &str) -> String {
        let key = match text
            .strip_prefix(MESSAGE_PREFIX)
            .and_then(|rest| rest.strip_suffix(MESSAGE_SUFFIX))
        {
            Some(key) if !key.is_empty() => key,
            _ => return text.to_string(),
        };

        self.messages
            .get(key)
            .or_else(|| {
                self.messages
                    .iter()
                    .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
                    .map(|(_, entry)| entry)
            })
            .and_then(|entry| entry.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| text.to_string())
    }
}

pub fn normalize(row: &RawRow, ctx: &RecordContext<'_>) -> ExtensionRecord {
    let manifest_path = row.text("manifest_path");
    ExtensionRecord {
        user_name: ctx.username.to_string(),
        browser: ctx.browser().to_string(),
        extension_id: row.text("extension_id"),
        version: row.text("version_dir"),
        name: row.text("name"),
        version_number: row.text("version"),
        description: row.text("description"),
        author: row.text("author"),
        permissions: row.text("permissions"),
        data_source: if manifest_path.is_empty() {
            ctx.data_source()
        } else {
            manifest_path
        },
    }
}
