//! Presentation labels derived from aggregate totals

use std::fmt;

use serde::{Deserialize, Serialize};

/// Workload color band for a day or week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadBand {
    Good,
    /// Only produced at week granularity
    Ok,
    Warning,
    Low,
}

impl WorkloadBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Low => "low",
        }
    }
}

/// Monthly performance rating for an employee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceRating {
    Excellent,
    Good,
    Average,
    #[serde(rename = "Below Average")]
    BelowAverage,
}

impl PerformanceRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::BelowAverage => "Below Average",
        }
    }
}

/// Label produced by the classifier for a node at some granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Workload(WorkloadBand),
    Performance(PerformanceRating),
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workload(band) => band.as_str(),
            Self::Performance(rating) => rating.as_str(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&WorkloadBand::Warning).unwrap(),
            "\"warning\""
        );
    }

    #[test]
    fn test_rating_serializes_display_text() {
        assert_eq!(
            serde_json::to_string(&PerformanceRating::BelowAverage).unwrap(),
            "\"Below Average\""
        );
    }

    #[test]
    fn test_label_untagged_roundtrip_text() {
        let label = Label::Performance(PerformanceRating::Excellent);
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"Excellent\"");
        assert_eq!(label.to_string(), "Excellent");
    }
}
