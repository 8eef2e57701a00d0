//! Chromium epoch conversion
//!
//! Chromium stores instants as microseconds since 1601-01-01T00:00:00Z.
//! Calendar strings are rendered in UTC as `YYYY.MM.DD HH:MM:SS`; zero,
//! negative and out-of-range inputs all render as the empty "unset" sentinel.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Seconds between 1601-01-01 and 1970-01-01.
pub const EPOCH_OFFSET_SECONDS: i64 = 11_644_473_600;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Returned for zero, negative and unrepresentable timestamps.
pub const UNSET: &str = "";

const CALENDAR_FORMAT: &[FormatItem<'static>] =
    format_description!("[year].[month].[day] [hour]:[minute]:[second]");

/// Whole Unix seconds for a Chromium timestamp, or `None` when unset.
pub fn to_unix_seconds(micros: i64) -> Option<i64> {
    if micros <= 0 {
        return None;
    }
    Some(micros / MICROS_PER_SECOND - EPOCH_OFFSET_SECONDS)
}

/// Render a Chromium timestamp as a calendar string.
pub fn to_calendar(micros: i64) -> String {
    to_unix_seconds(micros)
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
        .and_then(|datetime| datetime.format(CALENDAR_FORMAT).ok())
        .unwrap_or_else(|| UNSET.to_string())
}

/// Like [`to_calendar`], substituting `label` for the unset sentinel.
pub fn to_calendar_or(micros: i64, label: &str) -> String {
    let rendered = to_calendar(micros);
    if rendered.is_empty() && micros == 0 {
        label.to_string()
    } else {
        rendered
    }
}

/// Inverse of [`to_calendar`], to whole-second precision.
pub fn from_calendar(text: &str) -> Option<i64> {
    let datetime = PrimitiveDateTime::parse(text.trim(), CALENDAR_FORMAT).ok()?;
    let seconds = datetime.assume_utc().unix_timestamp();
    (seconds + EPOCH_OFFSET_SECONDS).checked_mul(MICROS_PER_SECOND)
}

/// Parse the string-encoded timestamps found in JSON profile files.
///
/// Empty, `"0"` and non-numeric text all mean unset and yield 0.
pub fn parse_epoch_text(text: &str) -> i64 {
    text.trim().parse::<i64>().unwrap_or(0)
}
