use devevents_core::{normalize_date, normalize_time, slugify};
use proptest::prelude::*;

proptest! {
    /// Property: slug derivation is idempotent
    #[test]
    fn prop_slug_idempotent(title in ".{0,120}") {
        let once = slugify(&title);
        prop_assert_eq!(slugify(&once), once);
    }

    /// Property: slugs only contain [a-z0-9-] with no leading, trailing or doubled hyphens
    #[test]
    fn prop_slug_shape(title in "[ -~]{0,80}") {
        let slug = slugify(&title);
        prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
    }

    /// Property: 12-hour input converts to the textbook 24-hour value
    #[test]
    fn prop_twelve_hour_conversion(
        hour in 1u32..=12,
        minute in 0u32..=59,
        pm in any::<bool>(),
        lower in any::<bool>(),
        space in any::<bool>(),
    ) {
        let period = match (pm, lower) {
            (true, true) => "pm",
            (true, false) => "PM",
            (false, true) => "am",
            (false, false) => "AM",
        };
        let sep = if space { " " } else { "" };
        let input = format!("{hour}:{minute:02}{sep}{period}");

        let expected = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };

        let out = normalize_time(&input).unwrap();
        prop_assert_eq!(out, format!("{expected:02}:{minute:02}"));
        prop_assert!(expected <= 23);
    }

    /// Property: valid 24-hour input is only zero-padded
    #[test]
    fn prop_twenty_four_hour_passthrough(hour in 0u32..=23, minute in 0u32..=59) {
        let out = normalize_time(&format!("{hour}:{minute:02}")).unwrap();
        prop_assert_eq!(out, format!("{hour:02}:{minute:02}"));
    }

    /// Property: ISO and long-form spellings of one day agree
    #[test]
    fn prop_date_spellings_agree(year in 1970i32..2100, month in 1u32..=12, day in 1u32..=28) {
        let date = chrono::NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let iso = date.format("%Y-%m-%d").to_string();
        let long = date.format("%B %-d, %Y").to_string();
        let us = date.format("%m/%d/%Y").to_string();

        prop_assert_eq!(normalize_date(&iso).unwrap(), iso.clone());
        prop_assert_eq!(normalize_date(&long).unwrap(), iso.clone());
        prop_assert_eq!(normalize_date(&us).unwrap(), iso);
    }
}
