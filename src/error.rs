//! Error handling for chromium-forensics

use thiserror::Error;

/// Main error type for extraction operations
#[derive(Error, Debug)]
pub enum ForensicsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Table absent: {0}")]
    TableAbsent(String),

    #[error("Malformed row: {0}")]
    MalformedRow(String),

    #[error("Cookie oracle error: {0}")]
    Oracle(String),

    #[error("Output sink error: {0}")]
    Sink(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Extraction cancelled")]
    Cancelled,
}

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ForensicsError>;
