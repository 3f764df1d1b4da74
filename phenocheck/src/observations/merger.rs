//! Aligns fetched observations with the period batch.

use std::collections::BTreeMap;

use super::model::{ClimateResponse, NdviResponse, Observation};
use crate::errors::MergeInconsistencyError;
use crate::periods::{PeriodBatch, PeriodKey};

/// Result of merging observations onto a batch.
///
/// Always holds exactly one row per period, in period order. Keys in the
/// observation maps that match no period are collected as issues instead of
/// being dropped silently.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedObservations {
    rows: Vec<Observation>,
    issues: Vec<MergeInconsistencyError>,
}

impl MergedObservations {
    /// Rows in period order.
    #[must_use]
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// Key-alignment problems found while merging.
    #[must_use]
    pub fn issues(&self) -> &[MergeInconsistencyError] {
        &self.issues
    }

    /// Returns true if every observation key matched a period.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }

    /// Fails on the first alignment problem.
    ///
    /// # Errors
    ///
    /// Returns the first `MergeInconsistencyError` found, if any.
    pub fn check(&self) -> Result<(), MergeInconsistencyError> {
        match self.issues.first() {
            Some(issue) => Err(issue.clone()),
            None => Ok(()),
        }
    }

    /// Number of rows without an NDVI value.
    #[must_use]
    pub fn missing_ndvi_count(&self) -> usize {
        self.rows.iter().filter(|r| r.ndvi_mean.is_none()).count()
    }

    /// Unwraps the rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Observation> {
        self.rows
    }
}

/// Merges NDVI and climate responses onto `periods`.
///
/// Lookup is by period key only; the date windows are not re-checked. The
/// external fetch is trusted to have been issued with exactly this batch.
/// Missing keys and `null` values become unavailable fields, never errors.
#[must_use]
pub fn merge_observations(
    periods: &PeriodBatch,
    ndvi: &NdviResponse,
    climate: &ClimateResponse,
) -> MergedObservations {
    let rows: Vec<Observation> = periods
        .iter()
        .map(|period| {
            let key = period.key();
            Observation {
                ordinal: period.ordinal,
                ndvi_mean: ndvi.mean_for(key),
                temperature_mean_celsius: climate.temperature_for(key),
                precipitation_sum: climate.precipitation_for(key),
                tile: ndvi.tile_for(key).cloned(),
            }
        })
        .collect();

    let issues: Vec<MergeInconsistencyError> = [
        audit_keys("ndvi", &ndvi.ndvi, periods.len()),
        audit_keys("temperature", &climate.temperature, periods.len()),
        audit_keys("precipitation", &climate.precipitation, periods.len()),
    ]
    .into_iter()
    .flatten()
    .collect();

    tracing::debug!(
        period_count = periods.len(),
        missing_ndvi = rows.iter().filter(|r| r.ndvi_mean.is_none()).count(),
        issue_count = issues.len(),
        "Merged observations"
    );

    MergedObservations { rows, issues }
}

/// Collects keys that are not `period_<n>` with `1 <= n <= period_count`.
fn audit_keys<V>(
    source_name: &str,
    map: &BTreeMap<String, V>,
    period_count: usize,
) -> Option<MergeInconsistencyError> {
    let mut keys: Vec<String> = map
        .keys()
        .filter(|k| {
            PeriodKey::parse(k).map_or(true, |key| key.ordinal() > period_count)
        })
        .cloned()
        .collect();
    if keys.is_empty() {
        return None;
    }
    keys.sort();
    Some(MergeInconsistencyError::UnexpectedKeys {
        source_name: source_name.to_string(),
        keys,
    })
}
