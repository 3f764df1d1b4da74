//! Inputs and outputs of an analysis run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagnostics::DiagnosticReport;
use crate::fetch::RegionOfInterest;
use crate::periods::{CustomPeriodInput, PeriodBatch};

/// Analyze the stages a crop has reached since planting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenologyRequest {
    /// Crop reference id.
    #[serde(alias = "cropType")]
    pub crop_id: String,
    /// `YYYY-MM-DD`.
    #[serde(alias = "startDate")]
    pub planting_date: String,
    /// Field geometry.
    pub roi: RegionOfInterest,
}

impl PhenologyRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(
        crop_id: impl Into<String>,
        planting_date: impl Into<String>,
        roi: RegionOfInterest,
    ) -> Self {
        Self {
            crop_id: crop_id.into(),
            planting_date: planting_date.into(),
            roi,
        }
    }
}

/// Analyze caller-chosen windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRequest {
    /// Rows as entered; incomplete rows are dropped.
    pub periods: Vec<CustomPeriodInput>,
    /// Field geometry.
    pub roi: RegionOfInterest,
}

impl CustomRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(periods: Vec<CustomPeriodInput>, roi: RegionOfInterest) -> Self {
        Self { periods, roi }
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Identifier shared with the report and the logs.
    pub run_id: Uuid,
    /// The periods that were requested.
    pub periods: PeriodBatch,
    /// The diagnostic report.
    pub report: DiagnosticReport,
    /// Wall-clock duration of the run.
    pub duration_ms: f64,
}

impl AnalysisResult {
    /// Stable key of the requested windows.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        self.periods.fingerprint()
    }
}
