//! Aggregator service for computing work-report rollups

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::services::bucketer::{self, day_key, month_key, week_key};
use crate::services::classifier::{day_band, month_rating, week_band};
use crate::types::{
    AggregateNode, BucketDescriptor, DayRollup, EntityRef, EntityRollup, MonthRollup,
    ReportQuery, ReportRecord, Result, RollupReport, WeekRollup, WeekStart, Window,
    WindowTotals,
};

/// Aggregator for computing rollups over a query window
pub struct Aggregator;

impl Aggregator {
    /// Fold `records` into daily, weekly, monthly, project and employee
    /// rollups for `query.window` (inclusive), after applying the query's
    /// project/employee filters.
    pub fn aggregate(records: &[ReportRecord], query: &ReportQuery) -> Result<RollupReport> {
        let window = Window::new(query.window.start, query.window.end)?;
        let week_start = query.week_starts_on;
        let weeks = bucketer::weeks_in(&window, week_start);
        let months = bucketer::months_in(&window);

        let acc = records
            .iter()
            .filter(|r| window.contains(r.date) && query.filter.matches(r))
            .fold(Accumulator::new(&window, &weeks, &months), |acc, r| {
                acc.absorb(r, week_start)
            });

        let report = acc.finish(query, &weeks, &months);
        tracing::debug!(
            start = %window.start,
            end = %window.end,
            reports = report.totals.total_reports,
            hours = report.totals.total_hours,
            projects = report.projects.len(),
            employees = report.employees.len(),
            "aggregated window"
        );
        Ok(report)
    }
}

struct EntityAccumulator {
    name: String,
    node: AggregateNode,
    first_date: NaiveDate,
    last_date: NaiveDate,
}

impl EntityAccumulator {
    fn new(entity: &EntityRef, date: NaiveDate) -> Self {
        Self {
            name: entity.name.clone(),
            node: AggregateNode::default(),
            first_date: date,
            last_date: date,
        }
    }

    fn add(&mut self, record: &ReportRecord) {
        self.node.add(record);
        self.first_date = self.first_date.min(record.date);
        self.last_date = self.last_date.max(record.date);
    }

    fn into_rollup(self, rated: bool) -> EntityRollup {
        let rating = rated.then(|| month_rating(self.node.total_hours));
        EntityRollup {
            name: self.name,
            node: self.node,
            first_date: self.first_date,
            last_date: self.last_date,
            rating,
        }
    }
}

#[derive(Default)]
struct MonthAccumulator {
    node: AggregateNode,
    employee_hours: BTreeMap<String, f64>,
}

/// Per-request running state. Zero-valued buckets for every day, week and
/// month in the window exist from the start.
struct Accumulator {
    total: AggregateNode,
    daily: BTreeMap<String, AggregateNode>,
    weekly: BTreeMap<String, AggregateNode>,
    monthly: BTreeMap<String, MonthAccumulator>,
    projects: BTreeMap<String, EntityAccumulator>,
    employees: BTreeMap<String, EntityAccumulator>,
}

impl Accumulator {
    fn new(window: &Window, weeks: &[BucketDescriptor], months: &[BucketDescriptor]) -> Self {
        Self {
            total: AggregateNode::default(),
            daily: window
                .days()
                .map(|d| (day_key(d), AggregateNode::default()))
                .collect(),
            weekly: weeks
                .iter()
                .map(|w| (w.key.clone(), AggregateNode::default()))
                .collect(),
            monthly: months
                .iter()
                .map(|m| (m.key.clone(), MonthAccumulator::default()))
                .collect(),
            projects: BTreeMap::new(),
            employees: BTreeMap::new(),
        }
    }

    fn absorb(mut self, record: &ReportRecord, week_start: WeekStart) -> Self {
        self.total.add(record);
        self.daily
            .entry(day_key(record.date))
            .or_default()
            .add(record);
        self.weekly
            .entry(week_key(record.date, week_start))
            .or_default()
            .add(record);

        let month = self.monthly.entry(month_key(record.date)).or_default();
        month.node.add(record);
        *month
            .employee_hours
            .entry(record.employee.id.clone())
            .or_insert(0.0) += record.hours_worked;

        self.projects
            .entry(record.project.id.clone())
            .or_insert_with(|| EntityAccumulator::new(&record.project, record.date))
            .add(record);
        self.employees
            .entry(record.employee.id.clone())
            .or_insert_with(|| EntityAccumulator::new(&record.employee, record.date))
            .add(record);
        self
    }

    fn finish(
        self,
        query: &ReportQuery,
        weeks: &[BucketDescriptor],
        months: &[BucketDescriptor],
    ) -> RollupReport {
        let window = query.window;
        let week_start = query.week_starts_on;
        // Rating thresholds are monthly quotas
        let rate_employees = window.is_calendar_month();

        let active_days = self.daily.values().filter(|n| !n.is_empty()).count() as u64;
        let average_daily_hours = if active_days > 0 {
            self.total.total_hours / active_days as f64
        } else {
            0.0
        };
        let totals = WindowTotals {
            total_hours: self.total.total_hours,
            total_reports: self.total.report_count,
            active_days,
            average_daily_hours,
        };

        let daily = self
            .daily
            .into_iter()
            .map(|(key, node)| {
                let workload = day_band(node.total_hours);
                (key, DayRollup { node, workload })
            })
            .collect();

        let mut weekly_nodes = self.weekly;
        let weekly = weeks
            .iter()
            .map(|week| {
                let node = weekly_nodes.remove(&week.key).unwrap_or_default();
                let rollup = WeekRollup {
                    start: week.start,
                    end: week.end,
                    display_start: week.start.max(window.start),
                    display_end: week.end.min(window.end),
                    week_of_month: bucketer::week_of_month(week.start, week_start),
                    label: week.label.clone(),
                    workload: week_band(node.total_hours),
                    node,
                };
                (week.key.clone(), rollup)
            })
            .collect();

        let mut monthly_nodes = self.monthly;
        let monthly = months
            .iter()
            .map(|month| {
                let acc = monthly_nodes.remove(&month.key).unwrap_or_default();
                let ratings = acc
                    .employee_hours
                    .into_iter()
                    .map(|(id, hours)| (id, month_rating(hours)))
                    .collect();
                let rollup = MonthRollup {
                    start: month.start,
                    end: month.end,
                    label: month.label.clone(),
                    node: acc.node,
                    ratings,
                };
                (month.key.clone(), rollup)
            })
            .collect();

        RollupReport {
            window,
            week_starts_on: week_start,
            filter: query.filter.clone(),
            totals,
            daily,
            weekly,
            monthly,
            projects: self
                .projects
                .into_iter()
                .map(|(id, acc)| (id, acc.into_rollup(false)))
                .collect(),
            employees: self
                .employees
                .into_iter()
                .map(|(id, acc)| (id, acc.into_rollup(rate_employees)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PerformanceRating, WorkloadBand};
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_record(
        year: i32,
        month: u32,
        day: u32,
        project: &str,
        employee: &str,
        hours: f64,
    ) -> ReportRecord {
        ReportRecord {
            id: format!("{}-{}-{}-{}", project, employee, month, day),
            date: date(year, month, day),
            project: EntityRef::new(project, format!("Project {}", project)),
            employee: EntityRef::new(employee, format!("Employee {}", employee)),
            hours_worked: hours,
            details: String::new(),
        }
    }

    fn march_query() -> ReportQuery {
        ReportQuery::new(Window::parse_month("2024-03").unwrap(), WeekStart::Monday)
    }

    fn week_query() -> ReportQuery {
        ReportQuery::new(
            Window::week_of(date(2024, 3, 4), WeekStart::Monday),
            WeekStart::Monday,
        )
    }

    fn assert_hours(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {} hours, got {}",
            expected,
            actual
        );
    }

    // ========== Empty input ==========

    #[test]
    fn test_aggregate_empty_month() {
        let report = Aggregator::aggregate(&[], &march_query()).unwrap();

        assert_hours(report.totals.total_hours, 0.0);
        assert_eq!(report.totals.total_reports, 0);
        assert_eq!(report.totals.active_days, 0);
        assert_hours(report.totals.average_daily_hours, 0.0);
        assert_eq!(report.daily.len(), 31);
        assert!(report.daily.values().all(|d| d.node.total_hours == 0.0));
        assert!(report.daily.values().all(|d| d.workload == WorkloadBand::Low));
        assert_eq!(report.weekly.len(), 5);
        assert_eq!(report.monthly.len(), 1);
        assert!(report.projects.is_empty());
        assert!(report.employees.is_empty());
    }

    // ========== Worked example ==========

    #[test]
    fn test_aggregate_single_day_two_projects() {
        let records = vec![
            make_record(2024, 3, 4, "P1", "E1", 5.0),
            make_record(2024, 3, 4, "P2", "E1", 3.0),
        ];

        let report = Aggregator::aggregate(&records, &week_query()).unwrap();

        let day = &report.daily["2024-03-04"];
        assert_hours(day.node.total_hours, 8.0);
        assert_eq!(day.workload, WorkloadBand::Good);
        assert_eq!(report.daily.len(), 7);

        assert_eq!(report.weekly.len(), 1);
        assert_hours(report.weekly["2024-03-04"].node.total_hours, 8.0);

        assert_hours(report.projects["P1"].node.total_hours, 5.0);
        assert_hours(report.projects["P2"].node.total_hours, 3.0);
        assert_eq!(report.projects["P1"].name, "Project P1");
        assert_eq!(report.employees.len(), 1);
        assert_hours(report.employees["E1"].node.total_hours, 8.0);
        assert_hours(report.totals.total_hours, 8.0);
        assert_eq!(report.totals.total_reports, 2);
    }

    // ========== Window filtering ==========

    #[test]
    fn test_aggregate_window_inclusive_endpoints() {
        let records = vec![
            make_record(2024, 2, 29, "P1", "E1", 1.0),
            make_record(2024, 3, 1, "P1", "E1", 2.0),
            make_record(2024, 3, 31, "P1", "E1", 4.0),
            make_record(2024, 4, 1, "P1", "E1", 8.0),
        ];

        let report = Aggregator::aggregate(&records, &march_query()).unwrap();

        assert_hours(report.totals.total_hours, 6.0);
        assert_eq!(report.totals.total_reports, 2);
        assert_eq!(report.projects["P1"].first_date, date(2024, 3, 1));
        assert_eq!(report.projects["P1"].last_date, date(2024, 3, 31));
    }

    #[test]
    fn test_aggregate_rejects_inverted_window() {
        let mut query = march_query();
        query.window = Window {
            start: date(2024, 3, 31),
            end: date(2024, 3, 1),
        };
        assert!(Aggregator::aggregate(&[], &query).is_err());
    }

    // ========== Weekly buckets ==========

    #[test]
    fn test_aggregate_week_spanning_month_end() {
        // Week of Mon 2024-03-25 runs to Sun 2024-03-31 entirely inside March;
        // week of Mon 2024-02-26 starts in February but is clamped for display.
        let records = vec![
            make_record(2024, 3, 1, "P1", "E1", 8.0),
            make_record(2024, 3, 29, "P1", "E1", 6.0),
            make_record(2024, 3, 30, "P1", "E1", 2.0),
            make_record(2024, 3, 31, "P1", "E1", 1.0),
        ];

        let report = Aggregator::aggregate(&records, &march_query()).unwrap();

        let first = &report.weekly["2024-02-26"];
        assert_eq!(first.start, date(2024, 2, 26));
        assert_eq!(first.display_start, date(2024, 3, 1));
        assert_eq!(first.display_end, date(2024, 3, 3));
        assert_hours(first.node.total_hours, 8.0);

        let last = &report.weekly["2024-03-25"];
        assert_hours(last.node.total_hours, 9.0);
        assert_eq!(last.week_of_month, 5);
        assert_eq!(last.workload, WorkloadBand::Low);
    }

    #[test]
    fn test_aggregate_sunday_week_start_regroups() {
        let records = vec![
            make_record(2024, 3, 9, "P1", "E1", 4.0),  // Saturday
            make_record(2024, 3, 10, "P1", "E1", 4.0), // Sunday
        ];
        let monday = Aggregator::aggregate(&records, &march_query()).unwrap();
        let sunday = Aggregator::aggregate(
            &records,
            &ReportQuery::new(Window::parse_month("2024-03").unwrap(), WeekStart::Sunday),
        )
        .unwrap();

        assert_hours(monday.weekly["2024-03-04"].node.total_hours, 8.0);
        assert_hours(sunday.weekly["2024-03-03"].node.total_hours, 4.0);
        assert_hours(sunday.weekly["2024-03-10"].node.total_hours, 4.0);
        assert_eq!(sunday.weekly.len(), 6);
    }

    #[test]
    fn test_aggregate_week_band_full_week() {
        let records: Vec<ReportRecord> = (4..=8)
            .map(|d| make_record(2024, 3, d, "P1", "E1", 8.0))
            .collect();
        let report = Aggregator::aggregate(&records, &week_query()).unwrap();
        assert_eq!(report.weekly["2024-03-04"].workload, WorkloadBand::Good);
        assert_eq!(report.totals.active_days, 5);
        assert_hours(report.totals.average_daily_hours, 8.0);
    }

    // ========== Monthly buckets and ratings ==========

    #[test]
    fn test_aggregate_monthly_ratings_per_employee() {
        let mut records: Vec<ReportRecord> = (1..=20)
            .map(|d| make_record(2024, 3, d, "P1", "E1", 8.0))
            .collect();
        records.push(make_record(2024, 3, 5, "P1", "E2", 10.0));

        let report = Aggregator::aggregate(&records, &march_query()).unwrap();

        let month = &report.monthly["2024-03"];
        assert_hours(month.node.total_hours, 170.0);
        assert_eq!(month.ratings["E1"], PerformanceRating::Excellent);
        assert_eq!(month.ratings["E2"], PerformanceRating::BelowAverage);
        assert_eq!(report.employees["E1"].rating, Some(PerformanceRating::Excellent));
        assert_eq!(report.projects["P1"].rating, None);
    }

    #[test]
    fn test_aggregate_week_window_leaves_employees_unrated() {
        let records: Vec<ReportRecord> = (4..=8)
            .map(|d| make_record(2024, 3, d, "P1", "E1", 8.0))
            .collect();

        let report = Aggregator::aggregate(&records, &week_query()).unwrap();

        assert_eq!(report.weekly["2024-03-04"].workload, WorkloadBand::Good);
        assert_eq!(report.employees["E1"].rating, None);
        assert_eq!(
            report.monthly["2024-03"].ratings["E1"],
            PerformanceRating::BelowAverage
        );
    }

    #[test]
    fn test_aggregate_year_window_leaves_employees_unrated() {
        let records: Vec<ReportRecord> = (0..30)
            .map(|i| make_record(2024, 1 + i % 12, 1 + i / 12, "P1", "E1", 6.0))
            .collect();
        let query = ReportQuery::new(
            Window::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap(),
            WeekStart::Monday,
        );

        let report = Aggregator::aggregate(&records, &query).unwrap();

        assert_hours(report.employees["E1"].node.total_hours, 180.0);
        assert_eq!(report.employees["E1"].rating, None);
        assert_eq!(report.monthly.len(), 12);
    }

    #[test]
    fn test_aggregate_last_representable_month() {
        let last_month = NaiveDate::MAX.with_day(1).unwrap();
        let record = ReportRecord {
            date: NaiveDate::MAX,
            ..make_record(2024, 3, 4, "P1", "E1", 5.0)
        };
        let query = ReportQuery::new(
            Window::new(last_month, NaiveDate::MAX).unwrap(),
            WeekStart::Monday,
        );

        let report = Aggregator::aggregate(&[record], &query).unwrap();

        assert_eq!(report.monthly.len(), 1);
        let monthly: f64 = report.monthly.values().map(|m| m.node.total_hours).sum();
        assert_hours(monthly, 5.0);
        let weekly: f64 = report.weekly.values().map(|w| w.node.total_hours).sum();
        assert_hours(weekly, 5.0);
        assert_hours(report.totals.total_hours, 5.0);
    }

    #[test]
    fn test_aggregate_multi_month_window() {
        let records = vec![
            make_record(2024, 1, 31, "P1", "E1", 3.0),
            make_record(2024, 2, 1, "P1", "E1", 5.0),
        ];
        let query = ReportQuery::new(
            Window::new(date(2024, 1, 15), date(2024, 2, 15)).unwrap(),
            WeekStart::Monday,
        );

        let report = Aggregator::aggregate(&records, &query).unwrap();

        assert_eq!(report.monthly.len(), 2);
        assert_hours(report.monthly["2024-01"].node.total_hours, 3.0);
        assert_hours(report.monthly["2024-02"].node.total_hours, 5.0);
        // Mon 2024-01-29 week straddles both months and holds both records
        assert_hours(report.weekly["2024-01-29"].node.total_hours, 8.0);
    }

    // ========== Filters ==========

    #[test]
    fn test_aggregate_project_filter() {
        let records = vec![
            make_record(2024, 3, 4, "P1", "E1", 5.0),
            make_record(2024, 3, 4, "P2", "E1", 3.0),
            make_record(2024, 3, 5, "P1", "E2", 2.0),
        ];

        let report = Aggregator::aggregate(&records, &week_query().with_project("P1")).unwrap();

        assert_hours(report.totals.total_hours, 7.0);
        assert_eq!(report.projects.len(), 1);
        assert_eq!(report.employees.len(), 2);
        assert_eq!(report.filter.project_id.as_deref(), Some("P1"));
    }

    #[test]
    fn test_aggregate_employee_filter() {
        let records = vec![
            make_record(2024, 3, 4, "P1", "E1", 5.0),
            make_record(2024, 3, 5, "P1", "E2", 2.0),
        ];
        let report = Aggregator::aggregate(&records, &week_query().with_employee("E2")).unwrap();
        assert_hours(report.totals.total_hours, 2.0);
        assert!(report.employees.contains_key("E2"));
        assert!(!report.employees.contains_key("E1"));
    }

    // ========== Unknown references ==========

    #[test]
    fn test_aggregate_unknown_project_counted() {
        let mut orphan = make_record(2024, 3, 4, "P1", "E1", 4.0);
        orphan.project = EntityRef::unknown_project();
        let records = vec![orphan, make_record(2024, 3, 4, "P1", "E1", 4.0)];

        let report = Aggregator::aggregate(&records, &week_query()).unwrap();

        assert_hours(report.totals.total_hours, 8.0);
        assert_eq!(report.projects["unknown"].name, "No Project");
        assert!(report.daily["2024-03-04"].node.project_ids.contains("unknown"));
    }

    // ========== Invariants ==========

    #[test]
    fn test_aggregate_child_buckets_sum_to_total() {
        let records = vec![
            make_record(2024, 3, 1, "P1", "E1", 2.5),
            make_record(2024, 3, 12, "P2", "E2", 7.25),
            make_record(2024, 3, 12, "P1", "E2", 0.75),
            make_record(2024, 3, 31, "P3", "E1", 4.0),
        ];

        let report = Aggregator::aggregate(&records, &march_query()).unwrap();

        let daily: f64 = report.daily.values().map(|d| d.node.total_hours).sum();
        let weekly: f64 = report.weekly.values().map(|w| w.node.total_hours).sum();
        assert_hours(daily, report.totals.total_hours);
        assert_hours(weekly, report.totals.total_hours);

        let mut union = AggregateNode::default();
        for week in report.weekly.values() {
            union.merge(week.node.clone());
        }
        assert_eq!(union.project_ids, report.monthly["2024-03"].node.project_ids);
        assert_eq!(union.employee_ids, report.monthly["2024-03"].node.employee_ids);
    }

    #[test]
    fn test_aggregate_order_independent() {
        let mut records = vec![
            make_record(2024, 3, 1, "P1", "E1", 2.5),
            make_record(2024, 3, 12, "P2", "E2", 7.25),
            make_record(2024, 3, 20, "P1", "E2", 0.75),
        ];
        let forward = Aggregator::aggregate(&records, &march_query()).unwrap();
        records.reverse();
        let backward = Aggregator::aggregate(&records, &march_query()).unwrap();

        assert_eq!(forward, backward);
    }
}
