//! Reference months and calendar month arithmetic.
//!
//! Invoices, budgets and reports are attributed to a month of a year rather
//! than to a day, written on the wire as `YYYY-MM`.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::{Date, Month};

use crate::Error;

/// A month of a specific year, e.g. 2025-03.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferenceMonth {
    // Field order matters for the derived ordering.
    year: i32,
    month: u8,
}

impl ReferenceMonth {
    /// Create a reference month, `month` is 1-based.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `month` is not in 1..=12 or `year` is
    /// not a four digit year.
    pub fn new(year: i32, month: u8) -> Result<Self, Error> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(Error::InvalidMonth(format!("{year:04}-{month:02}")));
        }

        Ok(Self { year, month })
    }

    /// The month that `date` falls in.
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The 1-based month number.
    pub fn month(&self) -> u8 {
        self.month
    }

    /// The month `months` months after this one (or before, if negative).
    pub fn offset(&self, months: i32) -> Self {
        let zero_based = self.year * 12 + (self.month as i32 - 1) + months;

        Self {
            year: zero_based.div_euclid(12),
            month: (zero_based.rem_euclid(12) + 1) as u8,
        }
    }

    /// The first day of the month.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if the year is out of the supported date range.
    pub fn first_day(&self) -> Result<Date, Error> {
        self.date(1)
    }

    /// The last day of the month.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if the year is out of the supported date range.
    pub fn last_day(&self) -> Result<Date, Error> {
        self.offset(1)
            .first_day()?
            .previous_day()
            .ok_or_else(|| Error::InvalidMonth(self.to_string()))
    }

    /// The date for `day` in this month, clamped to the month's last day so
    /// that e.g. day 31 of February gives the 28th or 29th.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if the year is out of the supported date range.
    pub fn day_clamped(&self, day: u8) -> Result<Date, Error> {
        let last_day = self.last_day()?.day();

        self.date(day.clamp(1, last_day))
    }

    fn date(&self, day: u8) -> Result<Date, Error> {
        let month =
            Month::try_from(self.month).map_err(|_| Error::InvalidMonth(self.to_string()))?;

        Date::from_calendar_date(self.year, month, day)
            .map_err(|_| Error::InvalidMonth(self.to_string()))
    }
}

impl Display for ReferenceMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ReferenceMonth {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMonth(text.to_owned());

        let (year, month) = text.split_once('-').ok_or_else(invalid)?;

        if year.len() != 4
            || month.len() != 2
            || !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;

        Self::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for ReferenceMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReferenceMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        text.parse().map_err(de::Error::custom)
    }
}

impl ToSql for ReferenceMonth {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.to_string().into())
    }
}

impl FromSql for ReferenceMonth {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Add `months` calendar months to `date`, keeping the day of the month where
/// possible and clamping it to the end of shorter months.
///
/// # Errors
/// Returns [Error::InvalidMonth] if the result is out of the supported date range.
pub fn add_months(date: Date, months: i32) -> Result<Date, Error> {
    ReferenceMonth::of(date)
        .offset(months)
        .day_clamped(date.day())
}
