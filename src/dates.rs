//! Date specifiers for range queries.
//!
//! A specifier is a prefix of the `YYMMDD.HHMMSS` timestamp format:
//!
//! | length | example         | covers        |
//! |--------|-----------------|---------------|
//! | 2      | `24`            | a year        |
//! | 4      | `2402`          | a month       |
//! | 6      | `240215`        | a day         |
//! | 9      | `240215.13`     | an hour       |
//! | 11     | `240215.1330`   | a minute      |
//! | 13     | `240215.133005` | one second    |
use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::{NoteError, Result, TIMESTAMP_FORMAT};

/// Inclusive range of `YYMMDD.HHMMSS` timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    /// Expands one specifier, or joins two using the first's start and the
    /// second's end.
    pub fn parse(first: &str, second: Option<&str>) -> Result<Self> {
        let (start, mut end) = expand_date_spec(first)?;
        if let Some(second) = second {
            let (_, second_end) = expand_date_spec(second)?;
            end = second_end;
        }

        if start > end {
            return Err(NoteError::InvalidDateSpec {
                spec: format!("{}..{}", first, second.unwrap_or(first)),
                reason: "range starts after it ends".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Fixed width, zero padded timestamps compare correctly as strings.
    pub fn contains(&self, timestamp: &str) -> bool {
        !timestamp.is_empty() && self.start.as_str() <= timestamp && timestamp <= self.end.as_str()
    }
}

/// Expands a specifier into the first and last timestamp it covers.
pub fn expand_date_spec(spec: &str) -> Result<(String, String)> {
    let invalid = |reason: &str| NoteError::InvalidDateSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    if !spec.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid("only digits and '.' are allowed"));
    }
    let dot_ok = spec
        .char_indices()
        .all(|(i, c)| (c == '.') == (i == 6));
    if !dot_ok {
        return Err(invalid("'.' must separate the date from the time"));
    }

    let (start, end) = match spec.len() {
        2 => {
            let year = 2000 + parse_field(&spec[0..2]);
            let last = last_day_of_month(year, 12).ok_or_else(|| invalid("bad year"))?;
            (format!("{}0101.000000", spec), format!("{}12{:02}.235959", spec, last))
        }
        4 => {
            let year = 2000 + parse_field(&spec[0..2]);
            let month = parse_field(&spec[2..4]) as u32;
            let last = last_day_of_month(year, month).ok_or_else(|| invalid("no such month"))?;
            (format!("{}01.000000", spec), format!("{}{:02}.235959", spec, last))
        }
        6 => (format!("{}.000000", spec), format!("{}.235959", spec)),
        9 => (format!("{}0000", spec), format!("{}5959", spec)),
        11 => (format!("{}00", spec), format!("{}59", spec)),
        13 => (spec.to_string(), spec.to_string()),
        _ => return Err(invalid("length must be 2, 4, 6, 9, 11 or 13")),
    };

    for bound in [&start, &end] {
        NaiveDateTime::parse_from_str(bound, TIMESTAMP_FORMAT)
            .map_err(|_| invalid("not a real date or time"))?;
    }
    Ok((start, end))
}

fn parse_field(digits: &str) -> i32 {
    digits.parse().unwrap_or(0)
}

/// Last day of `month` in `year`, `None` for a month outside 1..=12.
fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    next.pred_opt().map(|d| d.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(spec: &str) -> (String, String) {
        expand_date_spec(spec).unwrap()
    }

    #[test]
    fn year_covers_whole_year() {
        assert_eq!(
            expand("24"),
            ("240101.000000".to_string(), "241231.235959".to_string())
        );
    }

    #[test]
    fn february_respects_leap_years() {
        assert_eq!(expand("2402").1, "240229.235959");
        assert_eq!(expand("2502").1, "250228.235959");
        // 2000 is divisible by 400
        assert_eq!(expand("0002").1, "000229.235959");
        assert_eq!(expand("2404").1, "240430.235959");
    }

    #[test]
    fn finer_specifiers() {
        assert_eq!(
            expand("240215"),
            ("240215.000000".to_string(), "240215.235959".to_string())
        );
        assert_eq!(
            expand("240215.13"),
            ("240215.130000".to_string(), "240215.135959".to_string())
        );
        assert_eq!(
            expand("240215.1330"),
            ("240215.133000".to_string(), "240215.133059".to_string())
        );
        assert_eq!(
            expand("240215.133005"),
            ("240215.133005".to_string(), "240215.133005".to_string())
        );
    }

    #[test]
    fn malformed_specifiers_are_rejected() {
        let specs = [
            "", "2", "241", "2413", "240230", "2402151", "240215x13", "24.215", "240215.25",
        ];
        for spec in specs {
            assert!(expand_date_spec(spec).is_err(), "spec {:?}", spec);
        }
    }

    #[test]
    fn two_specifiers_join_into_one_range() {
        let range = DateRange::parse("2401", Some("2403")).unwrap();
        assert_eq!(range.start, "240101.000000");
        assert_eq!(range.end, "240331.235959");

        assert!(range.contains("240229.120000"));
        assert!(range.contains("240331.235959"));
        assert!(!range.contains("240401.000000"));
        assert!(!range.contains(""));

        assert!(DateRange::parse("2403", Some("2401")).is_err());
    }
}
