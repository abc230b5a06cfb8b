use chrono::NaiveDate;
use thiserror::Error;

/// timesheet-rollup error types
#[derive(Error, Debug)]
pub enum RollupError {
    /// Failed to parse JSON/JSONL or a date argument
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Granularity other than day/week/month
    #[error("invalid granularity: {0:?} (expected day, week or month)")]
    InvalidGranularity(String),

    /// Week start other than monday/sunday
    #[error("invalid week start: {0:?} (expected monday or sunday)")]
    InvalidWeekStart(String),

    /// Window whose start falls after its end
    #[error("invalid window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
}

/// Result type alias for timesheet-rollup
pub type Result<T> = std::result::Result<T, RollupError>;
