//! Report assembly.
//!
//! Zips a period batch with its merged observations into one entry per
//! period. The two sequences must agree in length and ordinals; anything
//! else is a bug upstream and is reported as a `MergeInconsistencyError`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::classifier::classify_against;
use super::format::{
    format_expected_range, format_optional, ClimateSummary, CUSTOM_NDVI_DECIMALS,
    PHENOLOGY_NDVI_DECIMALS,
};
use super::status::{NdviBand, VigorStatus};
use crate::crops::NdviRange;
use crate::errors::MergeInconsistencyError;
use crate::observations::Observation;
use crate::periods::Period;
use crate::utils::generate_run_id;

/// What kind of analysis produced a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Stage-derived periods for a crop.
    Phenology {
        /// Crop the periods were derived from.
        crop_id: String,
    },
    /// Caller-supplied periods.
    Custom,
}

impl AnalysisMode {
    /// NDVI decimals used when rendering this kind of report.
    #[must_use]
    pub fn ndvi_decimals(&self) -> usize {
        match self {
            Self::Phenology { .. } => PHENOLOGY_NDVI_DECIMALS,
            Self::Custom => CUSTOM_NDVI_DECIMALS,
        }
    }
}

/// One row of a diagnostic report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    /// Period ordinal.
    pub ordinal: usize,
    /// Stage code, or `Period N` for custom periods.
    pub label: String,
    /// Stage description; absent for custom periods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// First day of the window.
    pub start_date: NaiveDate,
    /// Last day of the window.
    pub end_date: NaiveDate,
    /// Observed mean NDVI.
    pub observed_ndvi: Option<f64>,
    /// Expected window; absent for custom periods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_ndvi: Option<NdviRange>,
    /// Classification of the observed value.
    pub status: VigorStatus,
    /// Coarse band, set only for custom periods with an observed value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ndvi_band: Option<NdviBand>,
    /// Climate values for the window.
    pub climate: ClimateSummary,
    /// Imagery reference, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<serde_json::Value>,
}

impl DiagnosticEntry {
    /// Builds the entry for one aligned period/observation pair.
    #[must_use]
    pub fn from_pair(period: &Period, observation: &Observation) -> Self {
        let expected_ndvi = period.expected_ndvi();
        let observed_ndvi = observation.ndvi_mean;
        let ndvi_band = match expected_ndvi {
            Some(_) => None,
            None => observed_ndvi.map(NdviBand::from_ndvi),
        };

        Self {
            ordinal: period.ordinal,
            label: period.label(),
            description: period.stage_description().map(str::to_string),
            start_date: period.start_date,
            end_date: period.end_date,
            observed_ndvi,
            expected_ndvi,
            status: classify_against(observed_ndvi, expected_ndvi),
            ndvi_band,
            climate: ClimateSummary::new(
                observation.temperature_mean_celsius,
                observation.precipitation_sum,
            ),
            tile: observation.tile.clone(),
        }
    }

    /// Name of the map layer for this period.
    #[must_use]
    pub fn layer_name(&self) -> &str {
        &self.label
    }

    /// Observed NDVI rendered with `decimals`, or `N/D`.
    #[must_use]
    pub fn observed_ndvi_text(&self, decimals: usize) -> String {
        format_optional(self.observed_ndvi, decimals)
    }

    /// Expected range rendered as `min - max`, or `N/D`.
    #[must_use]
    pub fn expected_range_text(&self) -> String {
        format_expected_range(self.expected_ndvi)
    }

    /// Climate summary text.
    #[must_use]
    pub fn climate_text(&self) -> String {
        self.climate.to_string()
    }
}

/// Zips periods and observations into report entries.
///
/// # Errors
///
/// - `LengthMismatch` if the sequences differ in length
/// - `OrdinalMismatch` if a pair disagrees on its ordinal
pub fn assemble_entries(
    periods: &[Period],
    observations: &[Observation],
) -> Result<Vec<DiagnosticEntry>, MergeInconsistencyError> {
    if periods.len() != observations.len() {
        return Err(MergeInconsistencyError::LengthMismatch {
            periods: periods.len(),
            observations: observations.len(),
        });
    }

    periods
        .iter()
        .zip(observations)
        .enumerate()
        .map(|(position, (period, observation))| {
            if period.ordinal == observation.ordinal {
                Ok(DiagnosticEntry::from_pair(period, observation))
            } else {
                Err(MergeInconsistencyError::OrdinalMismatch {
                    position,
                    expected: period.ordinal,
                    found: observation.ordinal,
                })
            }
        })
        .collect()
}

/// Parallel series for plotting a report. Gaps stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// X-axis labels.
    pub labels: Vec<String>,
    /// Observed NDVI.
    pub observed_ndvi: Vec<Option<f64>>,
    /// Precipitation sum.
    pub precipitation_sum: Vec<Option<f64>>,
    /// Mean temperature.
    pub temperature_mean_celsius: Vec<Option<f64>>,
    /// Lower edge of the expected window.
    pub expected_min: Vec<Option<f64>>,
    /// Upper edge of the expected window.
    pub expected_max: Vec<Option<f64>>,
}

/// Ordered diagnostic entries for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// Identifier of the run.
    pub run_id: Uuid,
    /// What produced the report.
    pub mode: AnalysisMode,
    /// Date the periods were evaluated against.
    pub generated_on: NaiveDate,
    /// One entry per period, in period order.
    pub entries: Vec<DiagnosticEntry>,
    /// Non-fatal data problems seen while merging.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DiagnosticReport {
    /// Assembles a report with a freshly generated run id.
    ///
    /// # Errors
    ///
    /// See [`assemble_entries`].
    pub fn assemble(
        mode: AnalysisMode,
        generated_on: NaiveDate,
        periods: &[Period],
        observations: &[Observation],
    ) -> Result<Self, MergeInconsistencyError> {
        Ok(Self {
            run_id: generate_run_id(),
            mode,
            generated_on,
            entries: assemble_entries(periods, observations)?,
            warnings: Vec::new(),
        })
    }

    /// Sets the run id.
    #[must_use]
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    /// Attaches non-fatal warnings.
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the report has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry count per status.
    #[must_use]
    pub fn status_counts(&self) -> BTreeMap<VigorStatus, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.status).or_insert(0) += 1;
        }
        counts
    }

    /// Layer name per entry, in order.
    #[must_use]
    pub fn layer_names(&self) -> Vec<&str> {
        self.entries.iter().map(DiagnosticEntry::layer_name).collect()
    }

    /// Series for charting.
    #[must_use]
    pub fn chart_series(&self) -> ChartSeries {
        let mut series = ChartSeries::default();
        for entry in &self.entries {
            series.labels.push(entry.label.clone());
            series.observed_ndvi.push(entry.observed_ndvi);
            series.precipitation_sum.push(entry.climate.precipitation_sum);
            series
                .temperature_mean_celsius
                .push(entry.climate.temperature_mean_celsius);
            series.expected_min.push(entry.expected_ndvi.map(|r| r.min));
            series.expected_max.push(entry.expected_ndvi.map(|r| r.max));
        }
        series
    }

    /// Observed NDVI of an entry rendered with this report's precision.
    #[must_use]
    pub fn ndvi_text(&self, entry: &DiagnosticEntry) -> String {
        entry.observed_ndvi_text(self.mode.ndvi_decimals())
    }

    /// Converts to a JSON value.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periods::{build_custom_periods, derive_periods, CustomPeriodInput};
    use crate::testing::soybean_profile;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn soybean_periods() -> Vec<Period> {
        derive_periods(&soybean_profile(), date(2025, 1, 1), date(2025, 3, 1)).into_inner()
    }

    fn obs(ordinal: usize, ndvi: Option<f64>) -> Observation {
        Observation {
            ndvi_mean: ndvi,
            ..Observation::unavailable(ordinal)
        }
    }

    #[test]
    fn test_soybean_statuses() {
        let observations = vec![
            obs(1, Some(0.5)),
            obs(2, Some(0.6)),
            obs(3, Some(0.95)),
            obs(4, None),
        ];
        let entries = assemble_entries(&soybean_periods(), &observations).unwrap();

        let statuses: Vec<_> = entries.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                VigorStatus::Normal,
                VigorStatus::Normal,
                VigorStatus::Exceptional,
                VigorStatus::Unavailable,
            ]
        );
        assert_eq!(entries[3].observed_ndvi_text(2), "N/D");
        assert_eq!(entries[0].expected_range_text(), "0.30 - 0.90");
        assert!(entries.iter().all(|e| e.ndvi_band.is_none()));
    }

    #[test]
    fn test_custom_entries() {
        let periods = build_custom_periods(&[
            CustomPeriodInput::new("2024-01-01", "2024-01-15"),
            CustomPeriodInput::new("2024-02-01", "2024-02-15"),
        ])
        .unwrap();
        let observations = vec![obs(1, Some(0.72)), obs(2, None)];
        let entries = assemble_entries(periods.as_slice(), &observations).unwrap();

        assert_eq!(entries[0].label, "Period 1");
        assert_eq!(entries[0].description, None);
        assert_eq!(entries[0].expected_ndvi, None);
        assert_eq!(entries[0].status, VigorStatus::Informational);
        assert_eq!(entries[0].ndvi_band, Some(NdviBand::High));
        assert_eq!(entries[0].observed_ndvi_text(3), "0.720");
        assert_eq!(entries[1].status, VigorStatus::Unavailable);
        assert_eq!(entries[1].ndvi_band, None);
    }

    #[test]
    fn test_length_mismatch() {
        let err = assemble_entries(&soybean_periods(), &[obs(1, None)]).unwrap_err();
        assert_eq!(
            err,
            MergeInconsistencyError::LengthMismatch {
                periods: 4,
                observations: 1
            }
        );
    }

    #[test]
    fn test_ordinal_mismatch() {
        let observations = vec![obs(1, None), obs(3, None), obs(2, None), obs(4, None)];
        let err = assemble_entries(&soybean_periods(), &observations).unwrap_err();
        assert_eq!(
            err,
            MergeInconsistencyError::OrdinalMismatch {
                position: 1,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_empty_inputs_give_empty_report() {
        let report =
            DiagnosticReport::assemble(AnalysisMode::Custom, date(2025, 1, 1), &[], &[]).unwrap();
        assert!(report.is_empty());
        assert!(report.status_counts().is_empty());
    }

    #[test]
    fn test_chart_series_keeps_gaps() {
        let mut observations = vec![
            obs(1, Some(0.5)),
            obs(2, None),
            obs(3, Some(0.8)),
            obs(4, None),
        ];
        observations[0].precipitation_sum = Some(12.5);
        let report = DiagnosticReport::assemble(
            AnalysisMode::Phenology {
                crop_id: "glycine_max".to_string(),
            },
            date(2025, 3, 1),
            &soybean_periods(),
            &observations,
        )
        .unwrap();

        let series = report.chart_series();
        assert_eq!(series.labels, vec!["VE", "V1", "R1", "R5"]);
        assert_eq!(series.observed_ndvi, vec![Some(0.5), None, Some(0.8), None]);
        assert_eq!(series.precipitation_sum, vec![Some(12.5), None, None, None]);
        assert_eq!(series.expected_min, vec![Some(0.3); 4]);
        assert_eq!(report.layer_names(), vec!["VE", "V1", "R1", "R5"]);
    }

    #[test]
    fn test_status_counts_and_text() {
        let observations = vec![
            obs(1, Some(0.5)),
            obs(2, Some(0.6)),
            obs(3, Some(0.95)),
            obs(4, None),
        ];
        let report = DiagnosticReport::assemble(
            AnalysisMode::Phenology {
                crop_id: "glycine_max".to_string(),
            },
            date(2025, 3, 1),
            &soybean_periods(),
            &observations,
        )
        .unwrap();

        let counts = report.status_counts();
        assert_eq!(counts.get(&VigorStatus::Normal), Some(&2));
        assert_eq!(counts.get(&VigorStatus::Exceptional), Some(&1));
        assert_eq!(counts.get(&VigorStatus::Unavailable), Some(&1));
        assert_eq!(report.ndvi_text(&report.entries[0]), "0.50");

        let json = report.to_dict();
        assert_eq!(json["mode"]["kind"], "phenology");
        assert_eq!(json["entries"][2]["status"], "exceptional");
    }
}
