//! Human-readable labels for Chromium's enumerated codes and sizes

pub const UNKNOWN: &str = "Unknown";

pub fn download_state(code: i64) -> &'static str {
    match code {
        0 => "In progress",
        1 => "Complete",
        2 => "Cancelled",
        3 => "Interrupted",
        _ => UNKNOWN,
    }
}

pub fn danger_level(code: i64) -> &'static str {
    match code {
        0 => "Safe",
        1 => "Dangerous",
        2 => "Suspicious",
        3 => "Not checked",
        4 => "Allowed by user",
        _ => UNKNOWN,
    }
}

pub fn cookie_priority(code: i64) -> &'static str {
    match code {
        0 => "Low",
        1 => "Medium",
        2 => "High",
        _ => UNKNOWN,
    }
}

pub fn same_site(code: i64) -> &'static str {
    match code {
        -1 | 0 => "Not set",
        1 => "Lax",
        2 => "Strict",
        3 => "None",
        _ => UNKNOWN,
    }
}

pub fn cookie_type(persistent: bool) -> &'static str {
    if persistent {
        "Persistent"
    } else {
        "Session"
    }
}

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Render a byte count with base-1024 units and one decimal digit.
pub fn format_size(bytes: i64) -> String {
    if bytes <= 0 {
        return "0 B".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, SIZE_UNITS[unit])
}

/// Whole-percent completion, 0 when the total is unknown.
pub fn download_progress(received: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    let percent = i128::from(received.max(0)) * 100 / i128::from(total);
    percent.min(100) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_labels() {
        assert_eq!(download_state(1), "Complete");
        assert_eq!(danger_level(4), "Allowed by user");
        assert_eq!(cookie_priority(2), "High");
        assert_eq!(same_site(-1), "Not set");
        assert_eq!(same_site(3), "None");
        assert_eq!(cookie_type(false), "Session");
    }

    #[test]
    fn unknown_codes_are_labelled_unknown() {
        assert_eq!(download_state(42), UNKNOWN);
        assert_eq!(danger_level(-3), UNKNOWN);
        assert_eq!(cookie_priority(7), UNKNOWN);
        assert_eq!(same_site(9), UNKNOWN);
    }

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(-5), "0 B");
        assert_eq!(format_size(512), "512.0 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024_i64.pow(5)), "3072.0 TB");
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(download_progress(50, 100), 50);
        assert_eq!(download_progress(10, 0), 0);
        assert_eq!(download_progress(10, -1), 0);
        assert_eq!(download_progress(300, 100), 100);
        assert_eq!(download_progress(i64::MAX, 3), 100);
        assert_eq!(download_progress(-10, 100), 0);
    }
}
