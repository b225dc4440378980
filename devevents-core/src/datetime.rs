//! Date and time normalization for event schedules
//!
//! Dates are stored as `YYYY-MM-DD` and times as 24-hour `HH:MM`. Input is
//! accepted from an explicit whitelist of formats so the result never depends
//! on the host locale.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::validation::ValidationError;

/// Calendar-date formats, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
    "%A %B %d %Y",
];

/// Date-time formats without an offset; only the calendar date is kept.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// `H[H]:MM` with an optional AM/PM suffix.
static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([0-9]{1,2}):([0-9]{2})(?:\s*(AM|PM))?$").expect("invalid time regex")
});

fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
    {
        return Some(date);
    }

    // Timestamps with an offset resolve to the UTC calendar day.
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(input) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.date())
}

/// Normalize a free-form date to `YYYY-MM-DD`.
///
/// # Example
/// ```
/// use devevents_core::datetime::normalize_date;
///
/// assert_eq!(normalize_date("October 15, 2023").unwrap(), "2023-10-15");
/// assert!(normalize_date("next tuesday").is_err());
/// ```
pub fn normalize_date(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let date = parse_calendar_date(trimmed).ok_or(ValidationError::InvalidFormat {
        field: "date",
        reason: "invalid date format",
    })?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Normalize `H[H]:MM` or `H[H]:MM AM|PM` to 24-hour `HH:MM`.
///
/// # Example
/// ```
/// use devevents_core::datetime::normalize_time;
///
/// assert_eq!(normalize_time("12:00 AM").unwrap(), "00:00");
/// assert_eq!(normalize_time("01:30 pm").unwrap(), "13:30");
/// assert!(normalize_time("9:5 AM").is_err());
/// ```
pub fn normalize_time(input: &str) -> Result<String, ValidationError> {
    let caps = TIME_RE
        .captures(input.trim())
        .ok_or(ValidationError::InvalidFormat {
            field: "time",
            reason: "invalid time format",
        })?;

    let invalid_value = ValidationError::InvalidFormat {
        field: "time",
        reason: "invalid time value",
    };
    let mut hours: u32 = caps[1].parse().map_err(|_| invalid_value.clone())?;
    let minutes: u32 = caps[2].parse().map_err(|_| invalid_value.clone())?;

    match caps.get(3).map(|m| m.as_str().to_ascii_uppercase()).as_deref() {
        Some("PM") if hours != 12 => hours += 12,
        Some("AM") if hours == 12 => hours = 0,
        _ => {}
    }

    if hours > 23 || minutes > 59 {
        return Err(invalid_value);
    }

    Ok(format!("{:02}:{:02}", hours, minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_equivalent_inputs_agree() {
        for input in [
            "2023-10-15",
            "2023/10/15",
            "10/15/2023",
            "October 15, 2023",
            "Oct 15, 2023",
            "october 15 2023",
            "15 October 2023",
            "Sunday, October 15, 2023",
            "2023-10-15T09:00:00Z",
            "2023-10-15T09:00:00+02:00",
            "2023-10-15 18:30",
            "Sun, 15 Oct 2023 10:00:00 +0000",
            "  2023-10-15  ",
        ] {
            assert_eq!(normalize_date(input).unwrap(), "2023-10-15", "input: {input}");
        }
    }

    #[test]
    fn date_with_offset_uses_utc_day() {
        assert_eq!(
            normalize_date("2023-10-15T23:30:00-05:00").unwrap(),
            "2023-10-16"
        );
    }

    #[test]
    fn date_rejects_garbage() {
        for input in ["", "tomorrow", "2023-13-01", "2023-02-30", "15/10/2023"] {
            let err = normalize_date(input).unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidFormat {
                    field: "date",
                    reason: "invalid date format"
                },
                "input: {input}"
            );
        }
    }

    #[test]
    fn date_rejects_wrong_weekday() {
        assert!(normalize_date("Monday, October 15, 2023").is_err());
    }

    #[test]
    fn time_twelve_hour_conversion() {
        assert_eq!(normalize_time("12:00 AM").unwrap(), "00:00");
        assert_eq!(normalize_time("12:00 PM").unwrap(), "12:00");
        assert_eq!(normalize_time("01:30 PM").unwrap(), "13:30");
        assert_eq!(normalize_time("09:05 AM").unwrap(), "09:05");
        assert_eq!(normalize_time("9:05am").unwrap(), "09:05");
        assert_eq!(normalize_time("11:59 pm").unwrap(), "23:59");
    }

    #[test]
    fn time_twenty_four_hour_passthrough() {
        assert_eq!(normalize_time("18:45").unwrap(), "18:45");
        assert_eq!(normalize_time("0:00").unwrap(), "00:00");
        assert_eq!(normalize_time(" 7:15 ").unwrap(), "07:15");
    }

    #[test]
    fn time_rejects_bad_format() {
        for input in ["9:5 AM", "0905", "9 AM", "09:05 XM", "09:05:00", ""] {
            let err = normalize_time(input).unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidFormat {
                    field: "time",
                    reason: "invalid time format"
                },
                "input: {input}"
            );
        }
    }

    #[test]
    fn time_rejects_out_of_range() {
        for input in ["24:00", "13:00 PM", "10:60", "99:99"] {
            let err = normalize_time(input).unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidFormat {
                    field: "time",
                    reason: "invalid time value"
                },
                "input: {input}"
            );
        }
    }
}
