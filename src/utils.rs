//! Time and logging helpers.

use crate::config::TIMEZONE_OFFSET_HOURS;
use chrono::{DateTime, FixedOffset, Utc};
use once_cell::sync::Lazy;

/// Format used for `scraped_at` and `update_time`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static LOCAL_OFFSET: Lazy<FixedOffset> = Lazy::new(|| {
    FixedOffset::east_opt(TIMEZONE_OFFSET_HOURS * 3600).expect("UTC+8 is a valid offset")
});

/// Render a UTC instant in the fixed UTC+8 civil time.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&*LOCAL_OFFSET)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Current time as `YYYY-MM-DD HH:MM:SS` in UTC+8.
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

/// Truncate a string for logging, on a char boundary.
///
/// Strings longer than `max` characters are cut and suffixed with the
/// number of dropped bytes.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_shifts_to_utc_plus_8() {
        let at = Utc.with_ymd_and_hms(2025, 5, 6, 20, 30, 0).unwrap();
        assert_eq!(format_timestamp(at), "2025-05-07 04:30:00");
    }

    #[test]
    fn test_timestamp_now_shape() {
        let now = timestamp_now();
        assert_eq!(now.len(), 19);
        assert_eq!(&now[4..5], "-");
        assert_eq!(&now[10..11], " ");
        assert_eq!(&now[13..14], ":");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "香港去東京優惠機票";
        assert_eq!(truncate_for_log(s, 2), "香港…(+21 bytes)");
    }
}
