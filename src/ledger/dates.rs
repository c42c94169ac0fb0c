//! Calendar arithmetic and the `Month` value type.
//!
//! Dates cross the engine boundary as `YYYY-MM-DD` strings and months as
//! `YYYY-MM`; both are parsed into comparable value types here so that no
//! ordering or range check ever happens on raw strings.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{EngineError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| EngineError::InvalidDate(input.to_string()))
}

/// Formats a date back into its boundary representation.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Advances a date by whole months, clamping the day-of-month to the last
/// valid day of the target month (Jan 31 + 1 month = Feb 28/29).
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    let mut day = date.day();
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    day = day.min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap()
}

/// Advances a date by whole years with the same day-clamping rule
/// (Feb 29 + 1 year = Feb 28).
pub fn shift_year(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    let day = date.day().min(days_in_month(year, date.month()));
    NaiveDate::from_ymd_opt(year, date.month(), day).unwrap()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

/// A calendar month, the granularity at which budgets, overrides, and
/// opening-balance snapshots are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidMonth(format!("{year}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// The month a given date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    pub fn last_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day_count()).unwrap()
    }

    pub fn day_count(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = EngineError;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidMonth(input.to_string());
        let (year, month) = input.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Month::new(year, month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(EngineError::InvalidDate(format!(
                "range end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Everything up to and including `end`.
    pub fn up_to(end: NaiveDate) -> Self {
        Self {
            start: NaiveDate::MIN,
            end,
        }
    }

    /// The full span of a single month.
    pub fn month(month: Month) -> Self {
        Self {
            start: month.first_day(),
            end: month.last_day(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    /// Months touched by the range, earliest first.
    pub fn months(&self) -> Vec<Month> {
        let mut months = Vec::new();
        let mut current = Month::containing(self.start);
        let last = Month::containing(self.end);
        while current <= last {
            months.push(current);
            current = current.next();
        }
        months
    }
}

/// An inclusive span of months, used when fetching budget overrides.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthSpan {
    pub start: Month,
    pub end: Month,
}

impl MonthSpan {
    pub fn new(start: Month, end: Month) -> Result<Self> {
        if end < start {
            return Err(EngineError::InvalidMonth(format!(
                "span end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(month: Month) -> Self {
        Self {
            start: month,
            end: month,
        }
    }

    pub fn contains(&self, month: Month) -> bool {
        month >= self.start && month <= self.end
    }
}
