//! Post dates and the chronological sort key.
//!
//! Dates come from the `date:` header field. Only the calendar part is used;
//! a trailing time (`2020-05-02 10:30:00`) is accepted and ignored.
//!
//! The sort key concatenates the zero-padded date with the slug, so plain
//! string ordering is chronological with the slug as tie-break:
//!
//! ```text
//! 2020-05-02, "first-post"  →  "20200502first-post"
//! ```

use chrono::NaiveDate;
use thiserror::Error;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    Invalid(String),
}

/// A validated calendar date with its English month name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub month_name: &'static str,
}

impl PostDate {
    /// `2020-05-02`, as used in `<lastmod>` and `<time datetime>`.
    pub fn iso(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Human-readable form, e.g. `2nd May 2020`.
    pub fn display(&self) -> String {
        format!(
            "{}{} {} {}",
            self.day,
            day_suffix(self.day),
            self.month_name,
            self.year
        )
    }
}

fn day_suffix(day: u8) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Parse the calendar part of a `date:` header value.
pub fn parse_date(value: &str) -> Result<PostDate, DateError> {
    let invalid = || DateError::Invalid(value.to_string());

    let calendar = value.split_whitespace().next().ok_or_else(invalid)?;
    let mut parts = calendar.split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(y, 4, 4) || !digits(m, 1, 2) || !digits(d, 1, 2) {
        return Err(invalid());
    }

    let year: u16 = y.parse().map_err(|_| invalid())?;
    let month: u8 = m.parse().map_err(|_| invalid())?;
    let day: u8 = d.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year.into(), month.into(), day.into()).ok_or_else(invalid)?;
    let month_name = *MONTHS
        .get(usize::from(month).wrapping_sub(1))
        .ok_or_else(invalid)?;

    Ok(PostDate {
        year,
        month,
        day,
        month_name,
    })
}

/// Chronological sort key: `YYYYMMDD` followed by the slug.
pub fn sort_key(date: &PostDate, slug: &str) -> String {
    format!("{:04}{:02}{:02}{}", date.year, date.month, date.day, slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_date() {
        let date = parse_date("2020-05-02").unwrap();
        assert_eq!((date.year, date.month, date.day), (2020, 5, 2));
        assert_eq!(date.month_name, "May");
    }

    #[test]
    fn ignores_time_component() {
        let date = parse_date("2019-12-31 23:59:59").unwrap();
        assert_eq!((date.year, date.month, date.day), (2019, 12, 31));
        assert_eq!(date.month_name, "December");
    }

    #[test]
    fn accepts_single_digit_month_and_day() {
        let date = parse_date("2021-1-7").unwrap();
        assert_eq!(date.iso(), "2021-01-07");
        assert_eq!(date.month_name, "January");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parse_date("  2020-05-02  ").unwrap().iso(), "2020-05-02");
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(parse_date("2020-13-01").is_err());
        assert!(parse_date("2020-00-10").is_err());
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        assert!(parse_date("2021-02-29").is_err());
        assert!(parse_date("2020-04-31").is_err());
        assert!(parse_date("2020-02-29").is_ok());
    }

    #[test]
    fn rejects_malformed_input() {
        let inputs = [
            "",
            "   ",
            "yesterday",
            "2020/05/02",
            "20-05-02",
            "2020-05",
            "2020-05-02-01",
            "2020-005-02",
            "2020-+5-02",
        ];
        for input in inputs {
            assert_eq!(
                parse_date(input),
                Err(DateError::Invalid(input.to_string())),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn sort_key_zero_pads_and_appends_slug() {
        let date = parse_date("2020-5-2").unwrap();
        assert_eq!(sort_key(&date, "first-post"), "20200502first-post");
    }

    #[test]
    fn sort_keys_order_chronologically() {
        let older = sort_key(&parse_date("2020-04-30").unwrap(), "zeta");
        let newer = sort_key(&parse_date("2020-05-01").unwrap(), "alpha");
        assert!(older < newer);
    }

    #[test]
    fn display_uses_ordinal_suffix() {
        let cases = [
            ("2020-05-01", "1st May 2020"),
            ("2020-05-02", "2nd May 2020"),
            ("2020-05-03", "3rd May 2020"),
            ("2020-05-04", "4th May 2020"),
            ("2020-05-11", "11th May 2020"),
            ("2020-05-12", "12th May 2020"),
            ("2020-05-13", "13th May 2020"),
            ("2020-05-21", "21st May 2020"),
            ("2020-05-22", "22nd May 2020"),
            ("2020-05-23", "23rd May 2020"),
            ("2020-05-31", "31st May 2020"),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_date(input).unwrap().display(), expected);
        }
    }
}
