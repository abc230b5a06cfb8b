//! Calendar policy types: granularity, week start, bucket descriptors, query windows

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{Result, RollupError};

/// Calendar bucketing granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl FromStr for Granularity {
    type Err = RollupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(RollupError::InvalidGranularity(s.to_string())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First day of a calendar week. Always passed explicitly, never read from locale.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    /// Days between the week start and `weekday` (0..=6)
    pub fn offset_of(&self, weekday: Weekday) -> u32 {
        match self {
            Self::Monday => weekday.num_days_from_monday(),
            Self::Sunday => weekday.num_days_from_sunday(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Sunday => "sunday",
        }
    }
}

impl FromStr for WeekStart {
    type Err = RollupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(Self::Monday),
            "sunday" | "sun" => Ok(Self::Sunday),
            _ => Err(RollupError::InvalidWeekStart(s.to_string())),
        }
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bucket derived from a date at some granularity.
/// `start..=end` is the full bucket; membership is never clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketDescriptor {
    pub granularity: Granularity,
    pub key: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

/// Inclusive date range an aggregation request is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(RollupError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The calendar month containing `date`. The final representable
    /// month ends at `NaiveDate::MAX`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    /// The seven-day week containing `date` under `week_start`, clamped
    /// to the representable date range
    pub fn week_of(date: NaiveDate, week_start: WeekStart) -> Self {
        let back = week_start.offset_of(date.weekday()) as u64;
        let start = date
            .checked_sub_days(Days::new(back))
            .unwrap_or(NaiveDate::MIN);
        let end = date
            .checked_add_days(Days::new(6 - back))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    /// Whether the window covers exactly one calendar month
    pub fn is_calendar_month(&self) -> bool {
        *self == Self::month_of(self.start)
    }

    /// Parse a `YYYY-MM` month into its window
    pub fn parse_month(year_month: &str) -> Result<Self> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", year_month.trim()), "%Y-%m-%d")
            .map_err(|_| {
                RollupError::Parse(format!("invalid month {:?}, expected YYYY-MM", year_month))
            })?;
        Ok(Self::month_of(first))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day in the window, ascending
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}
