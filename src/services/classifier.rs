//! Workload and performance classification of aggregate totals

use crate::types::{AggregateNode, Granularity, Label, PerformanceRating, WorkloadBand};

/// Hours at or above which a day is "good"
pub const DAY_GOOD_HOURS: f64 = 8.0;
/// Hours at or above which a day is "warning" rather than "low"
pub const DAY_WARNING_HOURS: f64 = 4.0;

pub const WEEK_GOOD_HOURS: f64 = 40.0;
pub const WEEK_OK_HOURS: f64 = 30.0;
pub const WEEK_WARNING_HOURS: f64 = 20.0;

pub const MONTH_EXCELLENT_HOURS: f64 = 160.0;
pub const MONTH_GOOD_HOURS: f64 = 120.0;
pub const MONTH_AVERAGE_HOURS: f64 = 80.0;

/// Classify a node's total hours at `granularity`
pub fn classify(node: &AggregateNode, granularity: Granularity) -> Label {
    classify_hours(node.total_hours, granularity)
}

pub fn classify_hours(hours: f64, granularity: Granularity) -> Label {
    match granularity {
        Granularity::Day => Label::Workload(day_band(hours)),
        Granularity::Week => Label::Workload(week_band(hours)),
        Granularity::Month => Label::Performance(month_rating(hours)),
    }
}

pub fn day_band(hours: f64) -> WorkloadBand {
    if hours >= DAY_GOOD_HOURS {
        WorkloadBand::Good
    } else if hours >= DAY_WARNING_HOURS {
        WorkloadBand::Warning
    } else {
        WorkloadBand::Low
    }
}

pub fn week_band(hours: f64) -> WorkloadBand {
    if hours >= WEEK_GOOD_HOURS {
        WorkloadBand::Good
    } else if hours >= WEEK_OK_HOURS {
        WorkloadBand::Ok
    } else if hours >= WEEK_WARNING_HOURS {
        WorkloadBand::Warning
    } else {
        WorkloadBand::Low
    }
}

pub fn month_rating(hours: f64) -> PerformanceRating {
    if hours >= MONTH_EXCELLENT_HOURS {
        PerformanceRating::Excellent
    } else if hours >= MONTH_GOOD_HOURS {
        PerformanceRating::Good
    } else if hours >= MONTH_AVERAGE_HOURS {
        PerformanceRating::Average
    } else {
        PerformanceRating::BelowAverage
    }
}
