//! Interpretation of the opaque timestamp strings found in broker exports.
//!
//! Exports carry no zone information, so every timestamp is read as local
//! wall-clock time. Strings that do carry an offset (RFC 3339) are converted
//! into the host's local zone first.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

// Two-digit years come first: `%Y` would happily read "24" as year 24.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

/// Parses a platform timestamp into a local, zone-less instant.
///
/// Returns `None` when the string matches none of the known shapes.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Milliseconds elapsed between two timestamps, regardless of which one is later.
///
/// Yields `None` if either side cannot be interpreted.
pub fn elapsed_millis(from: &str, to: &str) -> Option<u64> {
    let from = parse_timestamp(from)?;
    let to = parse_timestamp(to)?;
    Some((to - from).num_milliseconds().unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use test_case::test_case;

    #[test_case("2024-03-05 14:30:15", (2024, 3, 5, 14, 30, 15))]
    #[test_case("2024-03-05T14:30:15.250", (2024, 3, 5, 14, 30, 15))]
    #[test_case("03/05/2024 14:30:15", (2024, 3, 5, 14, 30, 15))]
    #[test_case("3/5/2024 2:30:15 PM", (2024, 3, 5, 14, 30, 15))]
    #[test_case("3/5/24 14:30:15", (2024, 3, 5, 14, 30, 15))]
    #[test_case("2024-03-05 14:30", (2024, 3, 5, 14, 30, 0))]
    #[test_case("2024-03-05", (2024, 3, 5, 0, 0, 0))]
    fn parses_known_shapes(raw: &str, expected: (i32, u32, u32, u32, u32, u32)) {
        let ts = parse_timestamp(raw).unwrap();
        let (y, mo, d, h, mi, s) = expected;
        assert_eq!((ts.year(), ts.month(), ts.day()), (y, mo, d));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (h, mi, s));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-45 10:00:00").is_none());
    }

    #[test]
    fn rfc3339_is_accepted() {
        assert!(parse_timestamp("2024-03-05T14:30:15Z").is_some());
    }

    #[test]
    fn elapsed_is_absolute() {
        assert_eq!(
            elapsed_millis("2024-03-05 10:00:00", "2024-03-05 10:01:30"),
            Some(90_000)
        );
        assert_eq!(
            elapsed_millis("2024-03-05 10:01:30", "2024-03-05 10:00:00"),
            Some(90_000)
        );
        assert_eq!(elapsed_millis("bad", "2024-03-05 10:00:00"), None);
    }
}
