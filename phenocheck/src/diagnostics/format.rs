//! Display formatting for report cells.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crops::NdviRange;

/// Placeholder shown for any unavailable value.
pub const UNAVAILABLE_MARKER: &str = "N/D";

/// Decimal places for NDVI in phenology reports.
pub const PHENOLOGY_NDVI_DECIMALS: usize = 2;

/// Decimal places for NDVI in custom-period reports.
pub const CUSTOM_NDVI_DECIMALS: usize = 3;

/// Formats an optional value with fixed decimals, or the unavailable marker.
#[must_use]
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(
        || UNAVAILABLE_MARKER.to_string(),
        |v| format!("{v:.decimals$}"),
    )
}

/// Formats an expected range as `min - max`.
#[must_use]
pub fn format_expected_range(range: Option<NdviRange>) -> String {
    range.map_or_else(|| UNAVAILABLE_MARKER.to_string(), |r| r.to_string())
}

/// Temperature and precipitation for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateSummary {
    /// Mean temperature in °C.
    pub temperature_mean_celsius: Option<f64>,
    /// Precipitation sum in mm.
    pub precipitation_sum: Option<f64>,
}

impl ClimateSummary {
    /// Creates a summary.
    #[must_use]
    pub fn new(temperature_mean_celsius: Option<f64>, precipitation_sum: Option<f64>) -> Self {
        Self {
            temperature_mean_celsius,
            precipitation_sum,
        }
    }

    /// Returns true if both values are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.temperature_mean_celsius.is_some() && self.precipitation_sum.is_some()
    }
}

impl fmt::Display for ClimateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.temperature_mean_celsius, self.precipitation_sum) {
            (Some(t), Some(p)) => write!(f, "{t:.1}°C / {p:.1}mm"),
            _ => f.write_str(UNAVAILABLE_MARKER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(0.6543), PHENOLOGY_NDVI_DECIMALS), "0.65");
        assert_eq!(format_optional(Some(0.6543), CUSTOM_NDVI_DECIMALS), "0.654");
        assert_eq!(format_optional(None, 2), "N/D");
    }

    #[test]
    fn test_expected_range() {
        let range = NdviRange { min: 0.3, max: 0.9 };
        assert_eq!(format_expected_range(Some(range)), "0.30 - 0.90");
        assert_eq!(format_expected_range(None), "N/D");
    }

    #[test]
    fn test_climate_summary_needs_both_values() {
        assert_eq!(ClimateSummary::new(Some(24.26), Some(80.0)).to_string(), "24.3°C / 80.0mm");
        assert_eq!(ClimateSummary::new(Some(24.0), None).to_string(), "N/D");
        assert_eq!(ClimateSummary::new(None, Some(12.0)).to_string(), "N/D");
        assert!(!ClimateSummary::default().is_complete());
    }
}
