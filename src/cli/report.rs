//! `timesheet-rollup report` subcommand

use std::fmt;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Args;

use timesheet_rollup::services::settings::{offset_from_minutes, Settings, SettingsStore};
use timesheet_rollup::services::{rollup, RecordSource, RollupOutput};
use timesheet_rollup::types::{ReportQuery, Result, RollupError, WeekStart, Window};

/// Aggregate work reports over a date window
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Report export to read (.json array/envelope or .jsonl)
    #[arg(long, short, value_name = "FILE")]
    pub input: PathBuf,

    /// Calendar month to report on (YYYY-MM)
    #[arg(long, conflicts_with_all = ["week", "since"])]
    pub month: Option<String>,

    /// Report on the week containing this date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "since")]
    pub week: Option<String>,

    /// First day of a custom window (YYYY-MM-DD)
    #[arg(long, requires = "until")]
    pub since: Option<String>,

    /// Last day of a custom window, inclusive (YYYY-MM-DD)
    #[arg(long, requires = "since")]
    pub until: Option<String>,

    /// Reference "today" used when no window is given (YYYY-MM-DD)
    #[arg(long)]
    pub now: Option<String>,

    /// First day of the week (overrides config)
    #[arg(long, value_enum)]
    pub week_start: Option<WeekStart>,

    /// Reference timezone offset from UTC in minutes (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<i32>,

    /// Only count reports for this project id
    #[arg(long)]
    pub project: Option<String>,

    /// Only count reports for this employee id
    #[arg(long)]
    pub employee: Option<String>,

    /// Settings file (defaults to ~/.timesheet-rollup/config.json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.load_settings()?;
        let week_start = self.week_start.unwrap_or(settings.week_starts_on);
        let offset = match self.utc_offset {
            Some(minutes) => offset_from_minutes(minutes)?,
            None => settings.offset()?,
        };

        let today = match self.now.as_deref() {
            Some(s) => parse_date_arg("--now", s)?,
            None => Local::now().date_naive(),
        };
        let window = self.resolve_window(week_start, today)?;

        let mut query = ReportQuery::new(window, week_start);
        query.filter.project_id = self.project.clone();
        query.filter.employee_id = self.employee.clone();

        let raw = RecordSource::from_path(&self.input).load()?;
        let output = rollup(&raw, &query, offset)?;

        if self.json {
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| RollupError::Parse(e.to_string()))?;
            println!("{}", json);
        } else {
            print!("{}", TextReport(&output));
        }
        Ok(())
    }

    fn load_settings(&self) -> Result<Settings> {
        match &self.config {
            Some(path) => SettingsStore::with_path(path.clone()).load(),
            None => match SettingsStore::new() {
                Ok(store) => store.load(),
                Err(e) => {
                    tracing::warn!(error = %e, "using default settings");
                    Ok(Settings::default())
                }
            },
        }
    }

    /// Explicit range, then month, then week, else the month containing `today`
    fn resolve_window(&self, week_start: WeekStart, today: NaiveDate) -> Result<Window> {
        if let (Some(since), Some(until)) = (self.since.as_deref(), self.until.as_deref()) {
            return Window::new(
                parse_date_arg("--since", since)?,
                parse_date_arg("--until", until)?,
            );
        }
        if let Some(month) = self.month.as_deref() {
            return Window::parse_month(month);
        }
        if let Some(week) = self.week.as_deref() {
            return Ok(Window::week_of(parse_date_arg("--week", week)?, week_start));
        }
        Ok(Window::month_of(today))
    }
}

pub fn parse_date_arg(flag: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        RollupError::Parse(format!("invalid {} {:?}, expected YYYY-MM-DD", flag, value))
    })
}

/// Plain-text rendering of a rollup
pub struct TextReport<'a>(pub &'a RollupOutput);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let output = self.0;
        let report = &output.report;

        writeln!(
            f,
            "Work report {} .. {} (weeks start {})",
            report.window.start, report.window.end, report.week_starts_on
        )?;
        writeln!(
            f,
            "Total: {:.2}h across {} reports, {} active days, {:.2}h/day average",
            report.totals.total_hours,
            report.totals.total_reports,
            report.totals.active_days,
            report.totals.average_daily_hours
        )?;

        writeln!(f, "\nDaily")?;
        for (key, day) in &report.daily {
            writeln!(
                f,
                "  {}  {:>7.2}h  {:>3} reports  {}",
                key,
                day.node.total_hours,
                day.node.report_count,
                day.workload.as_str()
            )?;
        }

        writeln!(f, "\nWeekly")?;
        for week in report.weekly.values() {
            writeln!(
                f,
                "  {} ({} .. {})  {:>7.2}h  {}",
                week.label,
                week.display_start,
                week.display_end,
                week.node.total_hours,
                week.workload.as_str()
            )?;
        }

        if !report.projects.is_empty() {
            writeln!(f, "\nProjects")?;
            for (id, project) in &report.projects {
                writeln!(
                    f,
                    "  {:<24} {:>7.2}h  {} employees  [{}]",
                    project.name,
                    project.node.total_hours,
                    project.node.employee_ids.len(),
                    id
                )?;
            }
        }

        if !report.employees.is_empty() {
            writeln!(f, "\nEmployees")?;
            for (id, employee) in &report.employees {
                let rating = employee.rating.map(|r| r.as_str()).unwrap_or("-");
                writeln!(
                    f,
                    "  {:<24} {:>7.2}h  {} projects  {}  [{}]",
                    employee.name,
                    employee.node.total_hours,
                    employee.node.project_ids.len(),
                    rating,
                    id
                )?;
            }
        }

        if !output.skipped.is_empty() {
            writeln!(f, "\nSkipped {} invalid records", output.skipped.len())?;
        }
        Ok(())
    }
}
