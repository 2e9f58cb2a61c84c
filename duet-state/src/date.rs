//! Parsing of the date-like and time-like strings the backend stores.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a date-like string: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]`,
/// `YYYY-MM-DDTHH:MM[:SS]` or a full RFC 3339 timestamp.
///
/// Timestamps with an offset keep their wall-clock time; the backend stores
/// event times as they are shown, not as instants.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
        return Some(timestamp.naive_local());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(s, format) {
            return Some(timestamp);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Parse the calendar date of a date-like string.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_timestamp(s).map(|timestamp| timestamp.date())
}

/// The sort key of a date-like string: milliseconds since the Unix epoch, with
/// anything unparseable treated as the epoch itself.
pub fn sort_millis(s: &str) -> i64 {
    parse_timestamp(s)
        .map(|timestamp| timestamp.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// Parse a time of day written as `HH.MM` (the display convention), `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    ["%H.%M", "%H:%M", "%H:%M:%S"]
        .into_iter()
        .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
}

/// The group heading for a date: long month name and four-digit year, e.g. `June 2024`.
pub fn month_year(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_supported_date_shapes() {
        assert_eq!(parse_date("2024-06-10"), Some(date(2024, 6, 10)));
        assert_eq!(parse_date("2024-06-10T19:30:00"), Some(date(2024, 6, 10)));
        assert_eq!(parse_date("2024-06-10 19:30"), Some(date(2024, 6, 10)));
        assert_eq!(parse_date("2024-06-10T23:30:00+07:00"), Some(date(2024, 6, 10)));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn unparseable_dates_sort_as_epoch() {
        assert_eq!(sort_millis("TBA"), 0);
        assert_eq!(sort_millis("1970-01-01"), 0);
        assert!(sort_millis("2024-06-11") > sort_millis("2024-06-10T23:59:59"));
    }

    #[test]
    fn time_of_day_keeps_zero_padded_string_order() {
        let mut times = ["19.30", "09.00", "12.15", "00.45"];
        let mut parsed: Vec<_> = times.iter().map(|t| parse_time_of_day(t).unwrap()).collect();
        times.sort();
        parsed.sort();
        let reparsed: Vec<_> = times.iter().map(|t| parse_time_of_day(t).unwrap()).collect();
        assert_eq!(parsed, reparsed);
        assert_eq!(parse_time_of_day("18:00"), NaiveTime::from_hms_opt(18, 0, 0));
        assert_eq!(parse_time_of_day("late"), None);
    }

    #[test]
    fn month_year_heading() {
        assert_eq!(month_year(date(2024, 6, 1)), "June 2024");
        assert_eq!(month_year(date(2025, 12, 31)), "December 2025");
    }
}
