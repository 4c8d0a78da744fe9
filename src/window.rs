//! Time windows over `created_at`.

use crate::error::ReportError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// A time range over issuance timestamps. Always includes `start`; includes
/// `end` only when `end_inclusive` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub end_inclusive: bool,
}

impl TimeWindow {
    /// Half-open window `[start, end)`.
    pub fn half_open(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            end_inclusive: false,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if instant < self.start {
            return false;
        }
        if self.end_inclusive {
            instant <= self.end
        } else {
            instant < self.end
        }
    }
}

/// `[first of previous month 00:00, first of reference month 00:00)`.
pub fn last_calendar_month(reference: DateTime<Utc>) -> TimeWindow {
    let this_month = first_of_month(reference.year(), reference.month());
    let (year, month) = if reference.month() == 1 {
        (reference.year() - 1, 12)
    } else {
        (reference.year(), reference.month() - 1)
    };
    let last_month = first_of_month(year, month);
    TimeWindow::half_open(midnight_utc(last_month), midnight_utc(this_month))
}

/// `[reference - n days, reference]`. Fails when the start falls outside the
/// representable date range.
pub fn last_n_days(reference: DateTime<Utc>, n: u32) -> Result<TimeWindow, ReportError> {
    let start = reference
        .checked_sub_signed(Duration::days(i64::from(n)))
        .ok_or_else(|| {
            ReportError::Configuration(format!("{n} days before {reference} is out of range"))
        })?;
    Ok(TimeWindow {
        start,
        end: reference,
        end_inclusive: true,
    })
}

/// Month name and year of the window's start, e.g. "March 2024".
pub fn month_label(window: &TimeWindow) -> String {
    window.start.format("%B %Y").to_string()
}

/// "last N days".
pub fn days_label(n: u32) -> String {
    format!("last {n} days")
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // day 1 exists in every month
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}
