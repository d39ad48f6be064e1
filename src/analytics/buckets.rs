/// Calendar buckets used by the charts
///
/// Weeks follow ISO-8601: a week belongs to the year that owns its Thursday
/// and years have 52 or 53 weeks. Months are plain calendar months.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use chrono::{Datelike, NaiveDate, Weekday};
use crate::domain::DomainError;

/// A calendar period that can be derived from a date and stepped forward
///
/// Ordering must be chronological so that ranges can be walked with `next`.
pub trait CalendarBucket: Copy + Ord + fmt::Debug {
    /// Bucket containing the given day
    fn of(date: NaiveDate) -> Self;

    /// The bucket right after this one
    fn next(self) -> Self;

    /// Year the bucket is attributed to
    fn year(&self) -> i32;

    /// Short, unpadded label (week number or month number)
    fn label(&self) -> String;
}

/// ISO week of an ISO week-numbering year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearWeek {
    pub year: i32,
    pub week: u32,
}

impl YearWeek {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }
}

impl CalendarBucket for YearWeek {
    fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self::new(iso.year(), iso.week())
    }

    fn next(self) -> Self {
        if self.week >= weeks_in_iso_year(self.year) {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.week + 1)
        }
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn label(&self) -> String {
        self.week.to_string()
    }
}

impl fmt::Display for YearWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Calendar month of a year, `month` in 1..=12
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// First day of the month, `None` if the month number is out of range
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl CalendarBucket for YearMonth {
    fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    fn next(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn label(&self) -> String {
        self.month.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = DomainError;

    /// Parse `YYYY-MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidDate(format!("Expected YYYY-MM, got '{}'", s));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        Ok(Self::new(year, month))
    }
}

/// Number of ISO weeks (52 or 53) in an ISO week-numbering year
pub fn weeks_in_iso_year(year: i32) -> u32 {
    if NaiveDate::from_isoywd_opt(year, 53, Weekday::Mon).is_some() {
        53
    } else {
        52
    }
}

pub fn week_bucket(date: NaiveDate) -> YearWeek {
    YearWeek::of(date)
}

pub fn month_bucket(date: NaiveDate) -> YearMonth {
    YearMonth::of(date)
}

/// Every bucket from `start` to `end`, both inclusive
///
/// Returns an empty list when `start` is after `end`.
pub fn sequence_between<B: CalendarBucket>(start: B, end: B) -> Vec<B> {
    let mut buckets = Vec::new();
    let mut current = start;

    while current <= end {
        buckets.push(current);
        current = current.next();
    }

    buckets
}

pub fn sequence_of_weeks_between(start: YearWeek, end: YearWeek) -> Vec<YearWeek> {
    sequence_between(start, end)
}

pub fn sequence_of_months_between(start: YearMonth, end: YearMonth) -> Vec<YearMonth> {
    sequence_between(start, end)
}
