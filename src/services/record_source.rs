//! File-backed report store adapter
//!
//! Loads raw report records from a JSON export (`[...]` or
//! `{"reports": [...]}`) or a JSON Lines file, one record per line.
//! Elements that are not report objects are logged and skipped.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::types::{RawRecord, Result, RollupError};

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    List(Vec<Value>),
    Envelope { reports: Vec<Value> },
}

/// Source of raw report records backed by a file
pub struct RecordSource {
    path: PathBuf,
}

impl RecordSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_json_lines(&self) -> bool {
        matches!(
            self.path.extension().and_then(|e| e.to_str()),
            Some("jsonl") | Some("ndjson")
        )
    }

    /// Read every raw record in the file
    pub fn load(&self) -> Result<Vec<RawRecord>> {
        let mut bytes = fs::read(&self.path)?;
        let records = if self.is_json_lines() {
            self.parse_lines(&mut bytes)
        } else {
            self.parse_document(&mut bytes)?
        };
        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            "loaded report records"
        );
        Ok(records)
    }

    fn parse_document(&self, bytes: &mut [u8]) -> Result<Vec<RawRecord>> {
        let payload: Payload = simd_json::from_slice(bytes).map_err(|e| {
            RollupError::Parse(format!(
                "{}: expected an array of reports or {{\"reports\": [...]}}: {}",
                self.path.display(),
                e
            ))
        })?;
        let elements = match payload {
            Payload::List(elements) => elements,
            Payload::Envelope { reports } => reports,
        };

        let mut records = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            match serde_json::from_value::<RawRecord>(element) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    index,
                    error = %e,
                    "skipping element that is not a report"
                ),
            }
        }
        Ok(records)
    }

    /// Parse JSON Lines; unparsable lines are logged and skipped
    fn parse_lines(&self, bytes: &mut [u8]) -> Vec<RawRecord> {
        let mut records = Vec::new();
        for (line_no, line) in bytes.split_mut(|b| *b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match simd_json::from_slice::<RawRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = line_no + 1,
                    error = %e,
                    "skipping unparsable line"
                ),
            }
        }
        records
    }
}
