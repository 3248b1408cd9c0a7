//! Date parsing, argument validation, and small string helpers.
//!
//! The validators mirror the CLI contract: they log the reason at error
//! level and answer with a plain `bool`, leaving the caller to decide how
//! to report the failure.

use crate::error::{Result, ScrapeError};
use chrono::{Local, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{error, instrument};

static STRICT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date regex"));

static LEADING_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:[T ].*)?$").expect("static date regex"));

/// Marker that every article URL carries.
pub const ARTICLE_MARKER: &str = "/news";

/// Parse a strict `YYYY-MM-DD` string into a calendar date.
///
/// # Errors
///
/// [`ScrapeError::Format`] when the text is not exactly four, two and two
/// digits separated by dashes, or when the digits do not name a real day.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    if !STRICT_DATE.is_match(text) {
        return Err(ScrapeError::Format(format!(
            "expected YYYY-MM-DD, got {text:?}"
        )));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| ScrapeError::Format(format!("invalid date {text:?}: {e}")))
}

/// Parse the `datetime` attribute of an article's publish-date element.
///
/// Accepts a plain date or a timestamp whose first ten characters are a
/// strict date (`2024-03-01T10:00:00+00:00`).
pub fn parse_publish_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    match LEADING_DATE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(day) => parse_date(day.as_str()),
        None => Err(ScrapeError::Format(format!(
            "unrecognised publish date {trimmed:?}"
        ))),
    }
}

/// Cutoff used when no date was supplied: nothing is too old.
pub fn epoch_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Validate the `--date` argument against today's local date.
pub fn validate_date_arg(date: Option<&str>) -> bool {
    validate_date_arg_at(date, Local::now().date_naive())
}

#[instrument(level = "debug")]
pub fn validate_date_arg_at(date: Option<&str>, today: NaiveDate) -> bool {
    let Some(text) = date else {
        error!(severity = "critical", "No date found");
        return false;
    };
    match parse_date(text) {
        Ok(day) if day > today => {
            error!(severity = "critical", %day, %today, "Entered date must not be greater than today's date");
            false
        }
        Ok(_) => true,
        Err(e) => {
            error!(severity = "critical", error = %e, "Invalid date");
            false
        }
    }
}

/// Validate the `--filepath` argument: present and existing on disk.
#[instrument(level = "debug")]
pub fn validate_file_path_arg(path: Option<&Path>) -> bool {
    match path {
        Some(p) if p.exists() => true,
        _ => {
            error!(severity = "critical", "Invalid CSV file");
            false
        }
    }
}

/// An article URL is valid when `/news` occurs somewhere after its first
/// character. Category pages, podcasts and sponsored teasers fail the test.
pub fn is_url_valid(url: &str) -> bool {
    url.find(ARTICLE_MARKER).is_some_and(|idx| idx > 0)
}

/// Directory name for one pipeline invocation, stamped to the minute.
pub fn run_dir_name(now: NaiveDateTime) -> String {
    format!("resources_{}", now.format("%d-%m-%Y-%H-%M"))
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at a char boundary at or below `max` bytes and get
/// `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_valid() {
        for text in ["2024-03-01", "1999-12-31", "2020-02-29", "1970-01-01"] {
            let parsed = parse_date(text).unwrap();
            assert_eq!(parsed.format("%Y-%m-%d").to_string(), text);
        }
        let parsed = parse_date("2024-02-15").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2024, 2, 15));
    }

    #[test]
    fn test_parse_date_malformed() {
        for text in [
            "",
            "2024-3-1",
            "2024/03/01",
            "01-03-2024",
            "2024-13-01",
            "2023-02-29",
            " 2024-03-01",
            "2024-03-01T00:00:00",
            "yesterday",
        ] {
            assert!(
                matches!(parse_date(text), Err(ScrapeError::Format(_))),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_publish_date_accepts_timestamps() {
        assert_eq!(parse_publish_date("2024-03-01").unwrap(), day(2024, 3, 1));
        assert_eq!(
            parse_publish_date("2024-03-01T10:15:00+00:00").unwrap(),
            day(2024, 3, 1)
        );
        assert!(matches!(
            parse_publish_date("March 1, 2024"),
            Err(ScrapeError::Format(_))
        ));
    }

    #[test]
    fn test_validate_date_arg() {
        let today = day(2024, 6, 10);
        assert!(validate_date_arg_at(Some("2024-06-10"), today));
        assert!(validate_date_arg_at(Some("2020-01-01"), today));
        assert!(!validate_date_arg_at(Some("2024-06-11"), today));
        assert!(!validate_date_arg_at(Some("2024-6-1"), today));
        assert!(!validate_date_arg_at(Some("not a date"), today));
        assert!(!validate_date_arg_at(None, today));
    }

    #[test]
    fn test_validate_date_arg_rejects_tomorrow() {
        let tomorrow = Local::now().date_naive().succ_opt().unwrap();
        let text = tomorrow.format("%Y-%m-%d").to_string();
        assert!(!validate_date_arg(Some(&text)));
    }

    #[test]
    fn test_validate_file_path_arg() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(validate_file_path_arg(Some(file.path())));
        assert!(!validate_file_path_arg(Some(Path::new(
            "/definitely/not/here/result.csv"
        ))));
        assert!(!validate_file_path_arg(None));
    }

    #[test]
    fn test_is_url_valid() {
        assert!(is_url_valid(
            "https://cointelegraph.com/news/bitcoin-price-rallies"
        ));
        assert!(!is_url_valid("https://cointelegraph.com/magazine/interview"));
        assert!(!is_url_valid("/news/relative-path-starts-with-marker"));
        assert!(!is_url_valid(""));
    }

    #[test]
    fn test_run_dir_name() {
        let now = day(2024, 3, 5).and_hms_opt(9, 7, 0).unwrap();
        assert_eq!(run_dir_name(now), "resources_05-03-2024-09-07");
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 100), "short");
        let long = "a".repeat(500);
        let result = truncate_for_log(&long, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.ends_with("…(+400 bytes)"));
        // multi-byte input must not split a char
        let result = truncate_for_log("ééé", 3);
        assert_eq!(result, "é…(+4 bytes)");
    }

    #[test]
    fn test_epoch_cutoff() {
        assert_eq!(epoch_cutoff(), day(1970, 1, 1));
    }

    fn any_calendar_day() -> impl Strategy<Value = NaiveDate> {
        (1000i32..=9999, 1u32..=12, 1u32..=31)
            .prop_filter_map("not a real day", |(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
    }

    proptest! {
        #[test]
        fn test_parse_date_round_trips(date in any_calendar_day()) {
            let text = date.format("%Y-%m-%d").to_string();
            prop_assert_eq!(parse_date(&text).unwrap(), date);
        }

        #[test]
        fn test_parse_date_rejects_other_shapes(text in "[0-9a-zA-Z/:T .-]{0,14}") {
            prop_assume!(!STRICT_DATE.is_match(&text));
            prop_assert!(matches!(parse_date(&text), Err(ScrapeError::Format(_))));
        }

        #[test]
        fn test_parse_date_rejects_impossible_months(y in 1000i32..=9999, m in 13u32..=99, d in 1u32..=28) {
            let text = format!("{y:04}-{m:02}-{d:02}");
            prop_assert!(matches!(parse_date(&text), Err(ScrapeError::Format(_))));
        }
    }
}
