//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write;

/// Default pattern of the `format_date` template filter
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date with either a strftime pattern (`%Y-%m-%d`) or a
/// Moment.js-style pattern (`YYYY-MM-DD`).
///
/// Returns `None` when the pattern contains an unknown specifier.
///
/// # Examples
/// ```ignore
/// format_date(&date, "%d/%m/%Y") // -> Some("15/01/2024")
/// format_date(&date, "YYYY-MM-DD") // -> Some("2024-01-15")
/// ```
pub fn format_date(date: &NaiveDateTime, format: &str) -> Option<String> {
    let chrono_format = if format.contains('%') {
        format.to_string()
    } else {
        moment_to_chrono_format(format)
    };

    let mut out = String::new();
    write!(out, "{}", date.format(&chrono_format)).ok()?;
    Some(out)
}

/// Parse a `YYYY-MM-DD` calendar date at midnight.
///
/// Out-of-range dates (month 13, February 30th) yield `None`.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse an ISO-8601 date or date-time string.
///
/// Offsets are accepted and dropped: the wall-clock time as written is kept.
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    if let Some(dt) = parse_calendar_date(s) {
        return Some(dt);
    }

    // RFC 3339 and the space-separated variant with an offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }

    None
}

/// Convert a Moment.js format to a chrono format.
///
/// Tokens are runs of one letter (`YYYY`, `MM`, `D`...); `[text]` is copied
/// literally. Runs with no chrono equivalent are kept as written.
fn moment_to_chrono_format(format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut result = String::with_capacity(format.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '[' {
            if let Some(len) = chars[i + 1..].iter().position(|&ch| ch == ']') {
                push_literal(&mut result, chars[i + 1..i + 1 + len].iter().copied());
                i += len + 2;
                continue;
            }
        }

        let run = chars[i..].iter().take_while(|&&ch| ch == c).count();
        match moment_token(c, run) {
            Some(spec) => result.push_str(spec),
            None => push_literal(&mut result, std::iter::repeat(c).take(run)),
        }
        i += run;
    }

    result
}

fn moment_token(c: char, run: usize) -> Option<&'static str> {
    let spec = match (c, run) {
        ('Y', 4) => "%Y",
        ('Y', 2) => "%y",
        ('M', 4) => "%B",
        ('M', 3) => "%b",
        ('M', 2) => "%m",
        ('M', 1) => "%-m",
        ('D', 4) => "%j",
        ('D', 2) => "%d",
        ('D', 1) => "%-d",
        ('d', 4) => "%A",
        ('d', 3) => "%a",
        ('d', 1) => "%w",
        ('H', 2) => "%H",
        ('H', 1) => "%-H",
        ('h', 2) => "%I",
        ('h', 1) => "%-I",
        ('m', 2) => "%M",
        ('m', 1) => "%-M",
        ('s', 2) => "%S",
        ('s', 1) => "%-S",
        ('S', 3) => "%3f",
        ('A', 1) => "%p",
        ('a', 1) => "%P",
        ('Z', 2) => "%z",
        ('Z', 1) => "%:z",
        _ => return None,
    };
    Some(spec)
}

fn push_literal(out: &mut String, text: impl Iterator<Item = char>) {
    for ch in text {
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_format_date() {
        let dt = date(2024, 1, 15, 10, 30);
        assert_eq!(format_date(&dt, DEFAULT_DATE_FORMAT).unwrap(), "2024-01-15");
        assert_eq!(format_date(&dt, "%d/%m/%Y").unwrap(), "15/01/2024");
        assert_eq!(format_date(&dt, "YYYY/MM/DD").unwrap(), "2024/01/15");
        assert_eq!(format_date(&dt, "MMMM D, YYYY HH:mm").unwrap(), "January 15, 2024 10:30");
    }

    #[test]
    fn test_format_date_bad_pattern() {
        let dt = date(2024, 1, 15, 0, 0);
        assert_eq!(format_date(&dt, "%Q"), None);
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(parse_calendar_date("2024-05-10"), Some(date(2024, 5, 10, 0, 0)));
        assert_eq!(parse_calendar_date("2024-13-01"), None);
        assert_eq!(parse_calendar_date("2023-02-29"), None);
    }

    #[test]
    fn test_parse_date_string() {
        assert_eq!(parse_date_string("2024-01-15"), Some(date(2024, 1, 15, 0, 0)));
        assert_eq!(
            parse_date_string("2024-01-15T10:30:00"),
            Some(date(2024, 1, 15, 10, 30))
        );
        assert_eq!(
            parse_date_string("2024-01-15 10:30"),
            Some(date(2024, 1, 15, 10, 30))
        );
        assert_eq!(
            parse_date_string("2024-01-15T10:30:00+02:00"),
            Some(date(2024, 1, 15, 10, 30))
        );
        assert_eq!(parse_date_string("next tuesday"), None);
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
    }

    #[test]
    fn test_moment_single_letter_tokens() {
        let dt = date(2024, 1, 5, 9, 7);
        assert_eq!(format_date(&dt, "D/M/YY h:mm A").unwrap(), "5/1/24 9:07 AM");
        assert_eq!(format_date(&dt, "dddd, MMMM D").unwrap(), "Friday, January 5");
        assert_eq!(format_date(&dt, "YYYY-MM-DDTHH:mm").unwrap(), "2024-01-05T09:07");
    }

    #[test]
    fn test_moment_bracketed_literal() {
        let dt = date(2024, 1, 5, 0, 0);
        assert_eq!(format_date(&dt, "[Day] D [of] YYYY").unwrap(), "Day 5 of 2024");
        assert_eq!(moment_to_chrono_format("[100%] YYYY"), "100%% %Y");
    }
}
