use crate::domain::RangeError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Format used for entry dates everywhere: on the command line, in storage
/// keys and in rendered output.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

pub fn parse_date(input: &str) -> Result<NaiveDate, RangeError> {
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|source| RangeError::InvalidDateFormat {
        input: input.to_string(),
        source,
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Monday of the week containing `date`.
pub fn beginning_of_week(date: NaiveDate) -> NaiveDate {
    let days_since_monday = match date.weekday() {
        Weekday::Sun => 6,
        other => i64::from(other.number_from_monday()) - 1,
    };
    date - Duration::days(days_since_monday)
}

/// The window flags of the day view. They are mutually exclusive in
/// practice; when several are set the first in declaration order wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeSelection {
    pub week: bool,
    pub month: bool,
    pub history: i64,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, RangeError> {
        if to < from {
            return Err(RangeError::RangeInverted { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn day(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    pub fn select(selection: &RangeSelection, today: NaiveDate) -> Result<Self, RangeError> {
        let (from, to) = if selection.week {
            (beginning_of_week(today), today)
        } else if selection.month {
            (today.with_day(1).unwrap_or(today), today)
        } else if selection.history != 0 {
            let amount = selection.history.unsigned_abs();
            let from = i64::try_from(amount)
                .ok()
                .and_then(Duration::try_days)
                .and_then(|back| today.checked_sub_signed(back))
                .ok_or(RangeError::HistoryOutOfRange(amount))?;
            (from, today)
        } else if let Some(date) = selection.date.as_deref().filter(|d| !d.is_empty()) {
            let parsed = parse_date(date)?;
            (parsed, parsed)
        } else {
            (today, today)
        };

        Self::new(from, to)
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Number of calendar-day slots covered, both ends inclusive.
    pub fn day_count(&self) -> u64 {
        (self.to - self.from).num_days().unsigned_abs() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let from = self.from;
        (0..=(self.to - from).num_days()).map(move |i| from + Duration::days(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-03-12 is a Tuesday
        assert_eq!(beginning_of_week(date(2024, 3, 12)), date(2024, 3, 11));
        assert_eq!(beginning_of_week(date(2024, 3, 11)), date(2024, 3, 11));
        assert_eq!(beginning_of_week(date(2024, 3, 16)), date(2024, 3, 11));
    }

    #[test]
    fn sunday_belongs_to_the_previous_monday() {
        assert_eq!(beginning_of_week(date(2024, 3, 17)), date(2024, 3, 11));
    }

    #[test]
    fn week_selection_runs_from_monday_to_today() {
        let today = date(2024, 3, 14);
        let selection = RangeSelection {
            week: true,
            ..Default::default()
        };
        let range = DateRange::select(&selection, today).unwrap();
        assert_eq!(range.from(), date(2024, 3, 11));
        assert_eq!(range.to(), today);
        assert_eq!(range.day_count(), 4);
    }

    #[test]
    fn month_selection_starts_on_the_first() {
        let today = date(2024, 2, 29);
        let selection = RangeSelection {
            month: true,
            ..Default::default()
        };
        let range = DateRange::select(&selection, today).unwrap();
        assert_eq!(range.from(), date(2024, 2, 1));
        assert_eq!(range.to(), today);
    }

    #[test]
    fn history_ignores_sign() {
        let today = date(2024, 3, 14);
        let back = RangeSelection {
            history: 5,
            ..Default::default()
        };
        let negative = RangeSelection {
            history: -5,
            ..Default::default()
        };
        let a = DateRange::select(&back, today).unwrap();
        let b = DateRange::select(&negative, today).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.from(), date(2024, 3, 9));
        assert_eq!(a.day_count(), 6);
    }

    #[test]
    fn history_beyond_calendar_is_rejected() {
        let selection = RangeSelection {
            history: i64::MIN,
            ..Default::default()
        };
        let err = DateRange::select(&selection, date(2024, 3, 14)).unwrap_err();
        assert!(matches!(err, RangeError::HistoryOutOfRange(_)));
    }

    #[test]
    fn week_takes_priority_over_other_flags() {
        let today = date(2024, 3, 14);
        let selection = RangeSelection {
            week: true,
            month: true,
            history: 30,
            date: Some("01.01.2020".to_string()),
        };
        let range = DateRange::select(&selection, today).unwrap();
        assert_eq!(range.from(), date(2024, 3, 11));
    }

    #[test]
    fn explicit_date_selects_a_single_day() {
        let selection = RangeSelection {
            date: Some("02.01.2016".to_string()),
            ..Default::default()
        };
        let range = DateRange::select(&selection, date(2024, 3, 14)).unwrap();
        assert_eq!(range, DateRange::day(date(2016, 1, 2)));
        assert_eq!(range.day_count(), 1);
    }

    #[test]
    fn malformed_date_is_rejected() {
        let selection = RangeSelection {
            date: Some("bla".to_string()),
            ..Default::default()
        };
        let err = DateRange::select(&selection, date(2024, 3, 14)).unwrap_err();
        assert!(matches!(err, RangeError::InvalidDateFormat { .. }));
        assert!(err.to_string().contains("please use dd.mm.yyyy"));
    }

    #[test]
    fn no_flags_means_today() {
        let today = date(2024, 3, 14);
        let range = DateRange::select(&RangeSelection::default(), today).unwrap();
        assert_eq!(range, DateRange::day(today));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = DateRange::new(date(2024, 3, 14), date(2024, 3, 13)).unwrap_err();
        assert!(matches!(err, RangeError::RangeInverted { .. }));
    }

    #[test]
    fn days_iterates_inclusively() {
        let range = DateRange::new(date(2024, 2, 27), date(2024, 3, 1)).unwrap();
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], date(2024, 2, 29));
        assert_eq!(days.last(), Some(&date(2024, 3, 1)));
        assert_eq!(range.day_count(), 4);
    }

    #[test]
    fn dates_round_trip_through_the_display_format() {
        let parsed = parse_date("02.01.2016").unwrap();
        assert_eq!(parsed, date(2016, 1, 2));
        assert_eq!(format_date(parsed), "02.01.2016");
    }
}
