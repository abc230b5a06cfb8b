mod report;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use timesheet_rollup::services::{bucket_key, classifier};
use timesheet_rollup::types::{Granularity, WeekStart};

use report::{parse_date_arg, ReportArgs};

/// Daily, weekly and monthly rollups of employee work reports
#[derive(Parser)]
#[command(name = "timesheet-rollup")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate reports over a window
    Report(ReportArgs),

    /// Show the bucket a date falls into
    Bucket {
        /// Date to bucket (YYYY-MM-DD)
        date: String,

        #[arg(long, short, value_enum, default_value_t = Granularity::Week)]
        granularity: Granularity,

        #[arg(long, value_enum, default_value_t = WeekStart::Monday)]
        week_start: WeekStart,
    },

    /// Classify an hours total
    Classify {
        /// Hours worked (non-negative)
        hours: f64,

        #[arg(long, short, value_enum, default_value_t = Granularity::Day)]
        granularity: Granularity,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Report(args) => args.run()?,
            Commands::Bucket {
                date,
                granularity,
                week_start,
            } => {
                let date: NaiveDate = parse_date_arg("date", &date)?;
                let bucket = bucket_key(date, granularity, week_start);
                println!("{}", serde_json::to_string_pretty(&bucket)?);
            }
            Commands::Classify { hours, granularity } => {
                if !(hours >= 0.0 && hours.is_finite()) {
                    anyhow::bail!("hours must be a non-negative number, got {}", hours);
                }
                println!("{}", classifier::classify_hours(hours, granularity));
            }
        }
        Ok(())
    }
}
