//! Calendar bucketing
//!
//! Derives day, week and month bucket keys for a date under an explicit
//! week-start policy. Week membership always follows the policy-aligned
//! calendar week; the week-of-month index is a display label only.

use chrono::{Datelike, Days, NaiveDate};

use crate::types::{BucketDescriptor, Granularity, WeekStart, Window};

/// Compute the bucket containing `date` at `granularity`
pub fn bucket_key(
    date: NaiveDate,
    granularity: Granularity,
    week_start: WeekStart,
) -> BucketDescriptor {
    match granularity {
        Granularity::Day => BucketDescriptor {
            granularity,
            key: day_key(date),
            start: date,
            end: date,
            label: date.format("%a %d %b %Y").to_string(),
        },
        Granularity::Week => {
            let week = Window::week_of(date, week_start);
            BucketDescriptor {
                granularity,
                key: day_key(week.start),
                start: week.start,
                end: week.end,
                label: week_label(week.start, week_start),
            }
        }
        Granularity::Month => {
            let month = Window::month_of(date);
            BucketDescriptor {
                granularity,
                key: month_key(date),
                start: month.start,
                end: month.end,
                label: date.format("%B %Y").to_string(),
            }
        }
    }
}

/// Day bucket key (`YYYY-MM-DD`)
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Week bucket key: the ISO date of the week's first day
pub fn week_key(date: NaiveDate, week_start: WeekStart) -> String {
    day_key(Window::week_of(date, week_start).start)
}

/// Month bucket key (`YYYY-MM`)
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// 1-based week index of `date` within its month:
/// `ceil((day_of_month + first_weekday_offset) / 7)`.
pub fn week_of_month(date: NaiveDate, week_start: WeekStart) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    let offset = week_start.offset_of(first.weekday());
    (date.day() + offset).div_ceil(7)
}

/// Display label for the week starting on `start`, e.g. `"Mar 2024 W2"`
pub fn week_label(start: NaiveDate, week_start: WeekStart) -> String {
    format!(
        "{} W{}",
        start.format("%b %Y"),
        week_of_month(start, week_start)
    )
}

/// Week buckets intersecting `window`, ascending by start
pub fn weeks_in(window: &Window, week_start: WeekStart) -> Vec<BucketDescriptor> {
    let mut weeks = Vec::new();
    let mut cursor = window.start;
    while cursor <= window.end {
        let bucket = bucket_key(cursor, Granularity::Week, week_start);
        match bucket.end.checked_add_days(Days::new(1)) {
            Some(next) => cursor = next,
            None => {
                weeks.push(bucket);
                break;
            }
        }
        weeks.push(bucket);
    }
    weeks
}

/// Month buckets intersecting `window`, ascending
pub fn months_in(window: &Window) -> Vec<BucketDescriptor> {
    let mut months = Vec::new();
    let mut cursor = window.start;
    while cursor <= window.end {
        let bucket = bucket_key(cursor, Granularity::Month, WeekStart::default());
        match bucket.end.succ_opt() {
            Some(next) => cursor = next,
            None => {
                months.push(bucket);
                break;
            }
        }
        months.push(bucket);
    }
    months
}
