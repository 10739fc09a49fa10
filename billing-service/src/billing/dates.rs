//! Day-granularity date arithmetic. All calendar math in this service is
//! UTC-based.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Last second of the given calendar day, as a UTC instant.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let end = NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is a valid wall-clock time");
    date.and_time(end).and_utc()
}

/// Calendar date `days` whole days after `date`.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Whole calendar days from `from` to `to`, time-of-day ignored.
/// Negative when `to` precedes `from`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
