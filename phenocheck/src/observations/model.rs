//! Observation payloads returned by the external services.
//!
//! Maps are keyed `period_<n>`. Any entry, and any numeric field inside an
//! entry, may be missing or `null`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::periods::PeriodKey;

/// NDVI statistics for one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NdviStats {
    /// Mean NDVI over the region of interest.
    #[serde(default, alias = "ndviMean")]
    pub ndvi_mean: Option<f64>,
}

/// Response of the vegetation-index service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NdviResponse {
    /// Per-period statistics.
    #[serde(default)]
    pub ndvi: BTreeMap<String, Option<NdviStats>>,
    /// Per-period imagery references, passed through untouched.
    #[serde(default, alias = "tiles")]
    pub ndvi_tiles: BTreeMap<String, serde_json::Value>,
}

impl NdviResponse {
    /// Mean NDVI for a period, if reported.
    #[must_use]
    pub fn mean_for(&self, key: PeriodKey) -> Option<f64> {
        self.ndvi
            .get(&key.to_string())
            .and_then(Option::as_ref)
            .and_then(|s| s.ndvi_mean)
    }

    /// Imagery reference for a period, if reported.
    #[must_use]
    pub fn tile_for(&self, key: PeriodKey) -> Option<&serde_json::Value> {
        self.ndvi_tiles
            .get(&key.to_string())
            .filter(|v| !v.is_null())
    }

    /// Inserts a mean value; used to assemble responses by hand.
    #[must_use]
    pub fn with_mean(mut self, key: PeriodKey, ndvi_mean: Option<f64>) -> Self {
        self.ndvi
            .insert(key.to_string(), Some(NdviStats { ndvi_mean }));
        self
    }
}

/// Mean temperature for one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStats {
    /// Mean air temperature in °C.
    #[serde(default, alias = "temperatureMeanCelsius")]
    pub temperature_mean_celsius: Option<f64>,
}

/// Accumulated precipitation for one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationStats {
    /// Total precipitation in mm.
    #[serde(default, alias = "precipitationSum")]
    pub precipitation_sum: Option<f64>,
}

/// Response of the climate service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateResponse {
    /// Per-period temperature.
    #[serde(default)]
    pub temperature: BTreeMap<String, Option<TemperatureStats>>,
    /// Per-period precipitation.
    #[serde(default)]
    pub precipitation: BTreeMap<String, Option<PrecipitationStats>>,
}

impl ClimateResponse {
    /// Mean temperature for a period, if reported.
    #[must_use]
    pub fn temperature_for(&self, key: PeriodKey) -> Option<f64> {
        self.temperature
            .get(&key.to_string())
            .and_then(Option::as_ref)
            .and_then(|s| s.temperature_mean_celsius)
    }

    /// Precipitation sum for a period, if reported.
    #[must_use]
    pub fn precipitation_for(&self, key: PeriodKey) -> Option<f64> {
        self.precipitation
            .get(&key.to_string())
            .and_then(Option::as_ref)
            .and_then(|s| s.precipitation_sum)
    }

    /// Inserts both climate values for a period.
    #[must_use]
    pub fn with_values(
        mut self,
        key: PeriodKey,
        temperature_mean_celsius: Option<f64>,
        precipitation_sum: Option<f64>,
    ) -> Self {
        self.temperature.insert(
            key.to_string(),
            Some(TemperatureStats {
                temperature_mean_celsius,
            }),
        );
        self.precipitation
            .insert(key.to_string(), Some(PrecipitationStats { precipitation_sum }));
        self
    }
}

/// Observations aligned to one period.
///
/// `None` means "unavailable"; it is never replaced by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Ordinal of the period these values belong to.
    pub ordinal: usize,
    /// Mean NDVI.
    pub ndvi_mean: Option<f64>,
    /// Mean temperature in °C.
    pub temperature_mean_celsius: Option<f64>,
    /// Precipitation sum in mm.
    pub precipitation_sum: Option<f64>,
    /// Imagery reference, opaque to the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<serde_json::Value>,
}

impl Observation {
    /// An observation with every value unavailable.
    #[must_use]
    pub fn unavailable(ordinal: usize) -> Self {
        Self {
            ordinal,
            ndvi_mean: None,
            temperature_mean_celsius: None,
            precipitation_sum: None,
            tile: None,
        }
    }

    /// Returns true if no numeric value is available.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ndvi_mean.is_none()
            && self.temperature_mean_celsius.is_none()
            && self.precipitation_sum.is_none()
    }
}
