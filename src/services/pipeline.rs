//! End-to-end rollup: raw records in, annotated report out

use chrono::FixedOffset;
use serde::Serialize;

use crate::services::normalizer::{self, SkippedRecord};
use crate::services::Aggregator;
use crate::types::{RawRecord, ReportQuery, Result, RollupReport};

/// Report plus the raw records that could not be counted
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupOutput {
    pub report: RollupReport,
    pub skipped: Vec<SkippedRecord>,
}

/// Normalize `raw` in the `offset` timezone and aggregate it for `query`
pub fn rollup(raw: &[RawRecord], query: &ReportQuery, offset: FixedOffset) -> Result<RollupOutput> {
    let normalized = normalizer::normalize(raw, offset);
    if normalized.skip_count() > 0 {
        tracing::info!(
            skipped = normalized.skip_count(),
            total = raw.len(),
            "some report records were skipped"
        );
    }
    let report = Aggregator::aggregate(&normalized.records, query)?;
    Ok(RollupOutput {
        report,
        skipped: normalized.skipped,
    })
}
