//! Calendar utilities. Every boundary is computed in UTC so that month keys
//! never drift with the caller's local offset.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FolioError;

/// 00:00:00.000 UTC on the day of `dt`.
pub fn start_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    midnight(dt.date_naive())
}

/// 23:59:59.999 UTC on the day of `dt`.
pub fn end_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    midnight(dt.date_naive() + Days::new(1)) - TimeDelta::milliseconds(1)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Closed interval `[start, end]` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, FolioError> {
        if start > end {
            return Err(FolioError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whole days from the start of `first`'s day to the end of `last`'s day.
    pub fn covering_days(first: DateTime<Utc>, last: DateTime<Utc>) -> Self {
        Self {
            start: start_of_day(first),
            end: end_of_day(last),
        }
    }

    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt <= self.end
    }
}

/// A `YYYY-MM` calendar month, always anchored on the first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    first_day: NaiveDate,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, FolioError> {
        if !(0..=9999).contains(&year) {
            return Err(FolioError::MalformedMonthKey(format!("{year}-{month:02}")));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| FolioError::MalformedMonthKey(format!("{year:04}-{month:02}")))
    }

    /// The month containing `dt`, in UTC.
    pub fn of(dt: DateTime<Utc>) -> Self {
        let date = dt.date_naive();
        Self {
            first_day: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn previous(&self) -> Self {
        Self {
            first_day: self.first_day - Months::new(1),
        }
    }

    /// First millisecond to last millisecond of the month.
    pub fn bounds(&self) -> DateRange {
        DateRange {
            start: midnight(self.first_day),
            end: midnight(self.first_day + Months::new(1)) - TimeDelta::milliseconds(1),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthKey {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || FolioError::MalformedMonthKey(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(malformed());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Self::new(year, month).map_err(|_| malformed())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = FolioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}
