//! Rollup types: the shared accumulator and the report it builds

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{PerformanceRating, ReportRecord, WeekStart, Window, WorkloadBand};

/// Accumulator used at every granularity and every dimension
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateNode {
    pub total_hours: f64,
    pub report_count: u64,
    pub project_ids: BTreeSet<String>,
    pub employee_ids: BTreeSet<String>,
}

impl AggregateNode {
    pub fn add(&mut self, record: &ReportRecord) {
        self.total_hours += record.hours_worked;
        self.report_count = self.report_count.saturating_add(1);
        if !self.project_ids.contains(&record.project.id) {
            self.project_ids.insert(record.project.id.clone());
        }
        if !self.employee_ids.contains(&record.employee.id) {
            self.employee_ids.insert(record.employee.id.clone());
        }
    }

    /// Combine two nodes covering disjoint sets of records
    pub fn merge(&mut self, other: AggregateNode) {
        self.total_hours += other.total_hours;
        self.report_count = self.report_count.saturating_add(other.report_count);
        self.project_ids.extend(other.project_ids);
        self.employee_ids.extend(other.employee_ids);
    }

    pub fn is_empty(&self) -> bool {
        self.report_count == 0
    }
}

/// Optional entity filters applied before grouping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, record: &ReportRecord) -> bool {
        self.project_id
            .as_deref()
            .map_or(true, |id| record.project.id == id)
            && self
                .employee_id
                .as_deref()
                .map_or(true, |id| record.employee.id == id)
    }
}

/// Parameters of one aggregation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub window: Window,
    pub week_starts_on: WeekStart,
    pub filter: ReportFilter,
}

impl ReportQuery {
    pub fn new(window: Window, week_starts_on: WeekStart) -> Self {
        Self {
            window,
            week_starts_on,
            filter: ReportFilter::default(),
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.filter.project_id = Some(project_id.into());
        self
    }

    pub fn with_employee(mut self, employee_id: impl Into<String>) -> Self {
        self.filter.employee_id = Some(employee_id.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayRollup {
    #[serde(flatten)]
    pub node: AggregateNode,
    pub workload: WorkloadBand,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekRollup {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Week bounds clamped to the query window, for display only
    pub display_start: NaiveDate,
    pub display_end: NaiveDate,
    /// 1-based week index within the month of `start`, for display only
    pub week_of_month: u32,
    pub label: String,
    #[serde(flatten)]
    pub node: AggregateNode,
    pub workload: WorkloadBand,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthRollup {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
    #[serde(flatten)]
    pub node: AggregateNode,
    /// Employee id → rating over the employee's hours in this month
    pub ratings: BTreeMap<String, PerformanceRating>,
}

/// Breakdown entry for one project or one employee
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityRollup {
    pub name: String,
    #[serde(flatten)]
    pub node: AggregateNode,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Employees only, and only when the window is one calendar month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<PerformanceRating>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindowTotals {
    pub total_hours: f64,
    pub total_reports: u64,
    pub active_days: u64,
    pub average_daily_hours: f64,
}

/// Complete rollup for one window. Ordered maps keep serialization stable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RollupReport {
    pub window: Window,
    pub week_starts_on: WeekStart,
    pub filter: ReportFilter,
    pub totals: WindowTotals,
    pub daily: BTreeMap<String, DayRollup>,
    pub weekly: BTreeMap<String, WeekRollup>,
    pub monthly: BTreeMap<String, MonthRollup>,
    pub projects: BTreeMap<String, EntityRollup>,
    pub employees: BTreeMap<String, EntityRollup>,
}
