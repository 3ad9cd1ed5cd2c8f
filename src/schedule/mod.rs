//! Draw-date scheduling
//!
//! Lotto Max draws take place every Tuesday and Friday. The results page only
//! serves one draw date at a time, so a scrape run is planned up front as the
//! ordered list of draw dates inside the requested range. Everything here is
//! pure: no clock reads, no I/O.

use crate::{Result, ScrapeError};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Generates all draw dates (Tuesday and Friday) in `[start, end]` inclusive
///
/// # Arguments
///
/// * `start` - First day of the range
/// * `end` - Last day of the range
///
/// # Returns
///
/// Draw dates in strictly increasing order. An inverted range (`start > end`)
/// yields an empty list, as does a single-day range on a non-draw weekday.
pub fn generate_draw_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;

    while current <= end {
        if is_draw_day(current) {
            dates.push(current);
        }
        current += Duration::days(1);
    }

    dates
}

/// Generates all draw dates for a calendar year
///
/// Equivalent to `generate_draw_dates(Jan 1, Dec 31)` for that year. A year
/// outside chrono's representable range yields an empty list.
pub fn generate_year_dates(year: i32) -> Vec<NaiveDate> {
    match (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) {
        (Some(start), Some(end)) => generate_draw_dates(start, end),
        _ => Vec::new(),
    }
}

/// Returns true if the given date is a scheduled draw day
pub fn is_draw_day(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Tue | Weekday::Fri)
}

/// Resolves a range spec string into `(start, end)` bounds
///
/// Named specs are anchored at `today`, which the caller supplies so this
/// stays deterministic:
///
/// * `last_7_days`, `last_30_days`, `last_90_days` - trailing windows
/// * `year_to_date` - January 1 of today's year through today
/// * `YYYY-MM-DD:YYYY-MM-DD` - explicit inclusive bounds
pub fn resolve_range(spec: &str, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    match spec {
        "last_7_days" => Ok((today - Duration::days(7), today)),
        "last_30_days" => Ok((today - Duration::days(30), today)),
        "last_90_days" => Ok((today - Duration::days(90), today)),
        "year_to_date" => {
            let jan_first = NaiveDate::from_ymd_opt(today.year(), 1, 1)
                .ok_or_else(|| ScrapeError::DateRange(format!("year {} out of range", today.year())))?;
            Ok((jan_first, today))
        }
        _ => {
            let (start_str, end_str) = spec.split_once(':').ok_or_else(|| {
                ScrapeError::DateRange(format!("unrecognized range spec '{}'", spec))
            })?;

            let start = parse_iso_date(start_str.trim())?;
            let end = parse_iso_date(end_str.trim())?;

            if start > end {
                return Err(ScrapeError::DateRange(format!(
                    "range start {} is after range end {}",
                    start, end
                )));
            }

            Ok((start, end))
        }
    }
}

fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ScrapeError::DateParse(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_only_tuesdays_and_fridays() {
        let dates = generate_draw_dates(date(2025, 1, 1), date(2025, 3, 31));
        assert!(!dates.is_empty());
        for d in &dates {
            assert!(
                matches!(d.weekday(), Weekday::Tue | Weekday::Fri),
                "{} is not a draw day",
                d
            );
        }
    }

    #[test]
    fn test_strictly_increasing_no_duplicates() {
        let dates = generate_draw_dates(date(2025, 1, 1), date(2025, 12, 31));
        for pair in dates.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_two_draws_per_full_week() {
        // Four full Monday-to-Sunday weeks
        let dates = generate_draw_dates(date(2025, 1, 6), date(2025, 2, 2));
        assert_eq!(dates.len(), 8);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert!(generate_draw_dates(date(2025, 6, 1), date(2025, 1, 1)).is_empty());
    }

    #[test]
    fn test_single_wednesday_is_empty() {
        // 2025-01-01 is a Wednesday
        assert!(generate_draw_dates(date(2025, 1, 1), date(2025, 1, 1)).is_empty());
    }

    #[test]
    fn test_single_friday_is_included() {
        // 2025-01-03 is a Friday
        let dates = generate_draw_dates(date(2025, 1, 3), date(2025, 1, 3));
        assert_eq!(dates, vec![date(2025, 1, 3)]);
    }

    #[test]
    fn test_saturday_never_generated() {
        // 2025-01-04 is a Saturday
        let dates = generate_draw_dates(date(2025, 1, 1), date(2025, 1, 7));
        assert!(!dates.contains(&date(2025, 1, 4)));
        assert_eq!(dates, vec![date(2025, 1, 3), date(2025, 1, 7)]);
    }

    #[test]
    fn test_generate_year_dates() {
        let dates = generate_year_dates(2025);
        assert_eq!(dates.first(), Some(&date(2025, 1, 3)));
        assert!(dates.iter().all(|d| d.year() == 2025));
        // 52 weeks and change, two draws per week
        assert!(dates.len() >= 104 && dates.len() <= 106);
    }

    #[test]
    fn test_resolve_named_ranges() {
        let today = date(2025, 6, 15);

        let (start, end) = resolve_range("last_7_days", today).unwrap();
        assert_eq!(start, date(2025, 6, 8));
        assert_eq!(end, today);

        let (start, end) = resolve_range("year_to_date", today).unwrap();
        assert_eq!(start, date(2025, 1, 1));
        assert_eq!(end, today);
    }

    #[test]
    fn test_resolve_explicit_range() {
        let today = date(2025, 6, 15);
        let (start, end) = resolve_range("2025-01-01:2025-01-31", today).unwrap();
        assert_eq!(start, date(2025, 1, 1));
        assert_eq!(end, date(2025, 1, 31));
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        let today = date(2025, 6, 15);
        assert!(resolve_range("next_week", today).is_err());
        assert!(resolve_range("2025-01-31:2025-01-01", today).is_err());
        assert!(resolve_range("2025-01-01:not-a-date", today).is_err());
    }
}
