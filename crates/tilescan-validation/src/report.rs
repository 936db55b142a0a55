use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::{EvaluationReport, RunMetrics};

/// Metrics of the resubstitution sanity check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineSection {
    pub metrics: RunMetrics,
}

/// Output of one diagnostics run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub baseline: BaselineSection,
    /// Leave-one-image-out evaluation with augmented training data.
    pub augmented: EvaluationReport,
}

/// Result of a diagnostics run that was not interrupted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DiagnosticsOutcome {
    /// The dataset had no evaluable image.
    NoData,
    Report(Box<DiagnosticsReport>),
}

impl DiagnosticsOutcome {
    #[must_use]
    pub fn report(&self) -> Option<&DiagnosticsReport> {
        match self {
            Self::NoData => None,
            Self::Report(report) => Some(report),
        }
    }

    #[must_use]
    pub fn into_report(self) -> Option<DiagnosticsReport> {
        match self {
            Self::NoData => None,
            Self::Report(report) => Some(*report),
        }
    }
}
