//! Calendar week arithmetic
//!
//! Every function takes the reference instant explicitly; nothing here reads
//! the wall clock.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::types::{DateRange, WeekStart};

pub const DAYS_PER_WEEK: i64 = 7;

/// Start of the calendar week containing `instant`: the most recent
/// occurrence of the anchor weekday on or before the instant's UTC date.
///
/// Clamps to the earliest representable date when that weekday falls
/// before the calendar's lower bound.
pub fn week_start_of(instant: DateTime<Utc>, week_start: WeekStart) -> NaiveDate {
    week_start_of_date(instant.date_naive(), week_start).unwrap_or(NaiveDate::MIN)
}

/// `None` when the week would start before the earliest representable date
pub fn week_start_of_date(date: NaiveDate, week_start: WeekStart) -> Option<NaiveDate> {
    let today = i64::from(date.weekday().num_days_from_monday());
    let anchor = i64::from(week_start.0.num_days_from_monday());
    let offset = (today - anchor).rem_euclid(DAYS_PER_WEEK);
    date.checked_sub_signed(Duration::days(offset))
}

/// `[week start, next week start)` for the week containing `instant`
pub fn current_week(instant: DateTime<Utc>, week_start: WeekStart) -> DateRange {
    week_beginning(week_start_of(instant, week_start))
}

/// The week immediately before `week`
pub fn previous_week(week: DateRange) -> DateRange {
    let start = week
        .start
        .checked_sub_signed(Duration::days(DAYS_PER_WEEK))
        .unwrap_or(NaiveDate::MIN);
    week_beginning(start)
}

/// The seven-day range starting on `start`, cut off at the last
/// representable date
pub fn week_beginning(start: NaiveDate) -> DateRange {
    let end = start
        .checked_add_signed(Duration::days(DAYS_PER_WEEK))
        .unwrap_or(NaiveDate::MAX);
    DateRange::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_mid_week() {
        // Wednesday 2026-10-14
        let instant = Utc.with_ymd_and_hms(2026, 10, 14, 15, 30, 0).unwrap();
        assert_eq!(week_start_of(instant, WeekStart::default()), date(2026, 10, 11));
        assert_eq!(
            week_start_of(instant, WeekStart(Weekday::Mon)),
            date(2026, 10, 12)
        );
    }

    #[test]
    fn test_week_start_on_anchor_day() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 11, 0, 0, 0).unwrap();
        assert_eq!(week_start_of(instant, WeekStart::default()), date(2026, 10, 11));
    }

    #[test]
    fn test_week_start_day_before_anchor() {
        // Saturday belongs to the week that started six days earlier
        let instant = Utc.with_ymd_and_hms(2026, 10, 17, 23, 59, 59).unwrap();
        assert_eq!(week_start_of(instant, WeekStart::default()), date(2026, 10, 11));
    }

    #[test]
    fn test_week_start_crosses_year() {
        let instant = Utc.with_ymd_and_hms(2027, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(week_start_of(instant, WeekStart::default()), date(2026, 12, 27));
    }

    #[test]
    fn test_current_and_previous_week() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();
        let current = current_week(instant, WeekStart::default());
        assert_eq!(current.start, date(2026, 10, 11));
        assert_eq!(current.end, date(2026, 10, 18));
        assert!(current.contains(date(2026, 10, 17)));
        assert!(!current.contains(date(2026, 10, 18)));

        let previous = previous_week(current);
        assert_eq!(previous.start, date(2026, 10, 4));
        assert_eq!(previous.end, current.start);
    }

    #[test]
    fn test_week_start_at_calendar_bounds() {
        let anchors = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        let starts: Vec<_> = anchors
            .iter()
            .map(|&anchor| week_start_of_date(NaiveDate::MIN, WeekStart(anchor)))
            .collect();

        // Only the earliest date's own weekday has a week start in range
        assert_eq!(starts.iter().filter(|s| s.is_some()).count(), 1);
        assert!(starts.contains(&Some(NaiveDate::MIN)));

        let last = week_beginning(NaiveDate::MAX);
        assert_eq!(last.end, NaiveDate::MAX);
        let first = previous_week(week_beginning(NaiveDate::MIN));
        assert_eq!(first.start, NaiveDate::MIN);
    }

    #[test]
    fn test_parse_week_start() {
        assert_eq!("sunday".parse::<WeekStart>().unwrap(), WeekStart(Weekday::Sun));
        assert_eq!("Mon".parse::<WeekStart>().unwrap(), WeekStart(Weekday::Mon));
        assert!("someday".parse::<WeekStart>().is_err());
    }

    proptest! {
        #[test]
        fn prop_week_start_is_anchor_within_six_days(
            days in 0i64..20_000,
            anchor in 0u8..7,
        ) {
            let date = date(1990, 1, 1) + Duration::days(days);
            let week_start = WeekStart(Weekday::try_from(anchor).unwrap());
            let start = week_start_of_date(date, week_start).unwrap();

            prop_assert_eq!(start.weekday(), week_start.0);
            prop_assert!(start <= date);
            prop_assert!(date - start < Duration::days(DAYS_PER_WEEK));
        }
    }
}
