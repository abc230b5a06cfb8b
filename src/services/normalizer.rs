//! Report normalization service
//!
//! Validates raw records from the report store and coerces them into
//! canonical [`ReportRecord`]s. Records that cannot contribute to totals
//! (bad date, bad or negative hours) are skipped and reported, never fatal.
//! Missing project/employee references become the "unknown" sentinel so
//! their hours are still counted.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::Serialize;

use crate::types::{EntityRef, RawRecord, ReportRecord, Scalar};

/// Why a raw record was excluded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum SkipReason {
    MissingDate,
    InvalidDate(String),
    MissingHours,
    InvalidHours(String),
    NonFiniteHours,
    NegativeHours(f64),
}

/// A raw record excluded from aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    /// Position in the raw input
    pub index: usize,
    pub id: Option<String>,
    pub reason: SkipReason,
}

/// Normalizer output: canonical records in input order plus skip diagnostics
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<ReportRecord>,
    pub skipped: Vec<SkippedRecord>,
}

impl Normalized {
    pub fn skip_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Normalize raw records, taking calendar dates in the `offset` timezone.
pub fn normalize(raw: &[RawRecord], offset: FixedOffset) -> Normalized {
    let results: Vec<std::result::Result<ReportRecord, SkippedRecord>> = raw
        .par_iter()
        .enumerate()
        .map(|(index, record)| normalize_record(index, record, offset))
        .collect();

    let mut normalized = Normalized {
        records: Vec::with_capacity(results.len()),
        skipped: Vec::new(),
    };
    for result in results {
        match result {
            Ok(record) => normalized.records.push(record),
            Err(skipped) => {
                tracing::warn!(
                    index = skipped.index,
                    id = skipped.id.as_deref().unwrap_or("-"),
                    reason = ?skipped.reason,
                    "skipping report record"
                );
                normalized.skipped.push(skipped);
            }
        }
    }
    normalized
}

fn normalize_record(
    index: usize,
    raw: &RawRecord,
    offset: FixedOffset,
) -> std::result::Result<ReportRecord, SkippedRecord> {
    let raw_id = raw.id.as_ref().and_then(Scalar::as_key);
    let skip = |reason| SkippedRecord {
        index,
        id: raw_id.clone(),
        reason,
    };

    let date = match raw.date.as_deref() {
        None => return Err(skip(SkipReason::MissingDate)),
        Some(s) if s.trim().is_empty() => return Err(skip(SkipReason::MissingDate)),
        Some(s) => parse_report_date(s, offset)
            .ok_or_else(|| skip(SkipReason::InvalidDate(s.to_string())))?,
    };

    let hours = match raw.hours_worked.as_ref() {
        None => return Err(skip(SkipReason::MissingHours)),
        Some(value) => value.as_hours().ok_or_else(|| {
            skip(SkipReason::InvalidHours(
                value.as_key().unwrap_or_default(),
            ))
        })?,
    };
    if !hours.is_finite() {
        return Err(skip(SkipReason::NonFiniteHours));
    }
    if hours < 0.0 {
        return Err(skip(SkipReason::NegativeHours(hours)));
    }

    Ok(ReportRecord {
        id: raw_id.clone().unwrap_or_else(|| format!("record-{}", index)),
        date,
        project: resolve_entity(
            raw.project_id.as_ref(),
            raw.project_name.as_deref(),
            EntityRef::unknown_project,
        ),
        employee: resolve_entity(
            raw.employee_id.as_ref(),
            raw.employee_name.as_deref(),
            EntityRef::unknown_employee,
        ),
        // -0.0 would render as "-0" in JSON
        hours_worked: hours + 0.0,
        details: raw.details.clone().unwrap_or_default(),
    })
}

/// Parse a report date as a calendar date in the `offset` timezone.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (converted into `offset`),
/// and naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps (taken as already local).
pub fn parse_report_date(s: &str, offset: FixedOffset) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&offset).date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

fn resolve_entity(
    id: Option<&Scalar>,
    name: Option<&str>,
    unknown: fn() -> EntityRef,
) -> EntityRef {
    match id.and_then(Scalar::as_key) {
        Some(id) => {
            let name = name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from)
                .unwrap_or_else(|| id.clone());
            EntityRef { id, name }
        }
        None => unknown(),
    }
}
