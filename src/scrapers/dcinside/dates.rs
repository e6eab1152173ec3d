//! KST timestamp parsing.
//!
//! The upstream encodes dates three ways: `YYYY-MM-DD HH:MM:SS` (listing
//! title attributes and view pages), `YYYY.MM.DD` (gallog listings, dotted
//! variants with or without seconds), and year-less `MM.DD HH:MM:SS` on
//! comments. Everything is interpreted as KST (+09:00); the process-local
//! timezone is never consulted.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Korea Standard Time, UTC+09:00.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("valid KST offset")
}

/// Current instant in KST.
pub fn now_kst() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&kst())
}

fn localize(naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    naive.and_local_timezone(kst()).single()
}

/// Parse a full upstream timestamp.
///
/// Accepts dot and dash separators, with or without seconds, and bare
/// dates (midnight KST).
pub fn parse_kst(s: &str) -> Option<DateTime<FixedOffset>> {
    let normalized = s.trim().replace('.', "-");
    if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S") {
        return localize(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M") {
        return localize(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return localize(d.and_hms_opt(0, 0, 0)?);
    }
    None
}

/// Parse a comment timestamp, patching in `year` when the upstream omits it.
pub fn parse_comment_date_in_year(s: &str, year: i32) -> Option<DateTime<FixedOffset>> {
    if let Some(dt) = parse_kst(s) {
        return Some(dt);
    }
    let normalized = format!("{year}-{}", s.trim().replace('.', "-"));
    if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S") {
        return localize(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M") {
        return localize(dt);
    }
    None
}

/// Parse a comment timestamp against the current KST year.
pub fn parse_comment_date(s: &str) -> Option<DateTime<FixedOffset>> {
    parse_comment_date_in_year(s, now_kst().year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_dashed_with_seconds() {
        let dt = parse_kst("2025-03-04 05:06:07").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-04T05:06:07+09:00");
    }

    #[test]
    fn test_parse_dotted_without_seconds() {
        let dt = parse_kst("2025.03.04 05:06").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-04T05:06:00+09:00");
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        let dt = parse_kst("2025.03.04").unwrap();
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.to_rfc3339(), "2025-03-04T00:00:00+09:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_kst("yesterday").is_none());
        assert!(parse_kst("").is_none());
    }

    #[test]
    fn test_comment_date_year_patch() {
        let dt = parse_comment_date_in_year("09.01 12:34:56", 2025).unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-09-01T12:34:56+09:00");
    }

    #[test]
    fn test_comment_date_full_form_keeps_year() {
        let dt = parse_comment_date_in_year("2023.09.01 12:34:56", 2025).unwrap();
        assert_eq!(dt.year(), 2023);
    }

    #[test]
    fn test_comment_date_short_without_seconds() {
        let dt = parse_comment_date_in_year("12.31 23:59", 2024).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-12-31T23:59:00+09:00");
    }

    #[test]
    fn test_offset_is_always_kst() {
        let dt = parse_kst("2025-01-01 00:00:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 9 * 3600);
    }
}
