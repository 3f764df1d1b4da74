//! Crop profiles and their growth stages.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ValidationError;

/// Expected NDVI window for a growth stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NdviRange {
    /// Lower bound, inclusive.
    pub min: f64,
    /// Upper bound, inclusive.
    pub max: f64,
}

impl NdviRange {
    /// Creates a range, checking `0 <= min <= max <= 1`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidNdviRange` when the bounds are not
    /// finite, fall outside `[0, 1]`, or are out of order.
    pub fn try_new(min: f64, max: f64) -> Result<Self, ValidationError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ValidationError::invalid_ndvi_range(min, max, "bounds must be finite"));
        }
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) {
            return Err(ValidationError::invalid_ndvi_range(min, max, "bounds must lie in [0, 1]"));
        }
        if min > max {
            return Err(ValidationError::invalid_ndvi_range(min, max, "min exceeds max"));
        }
        Ok(Self { min, max })
    }

    /// Width of the range.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Returns true if `value` lies within the inclusive bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl fmt::Display for NdviRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} - {:.2}", self.min, self.max)
    }
}

/// A phenological stage of a crop.
///
/// Field aliases accept the Portuguese keys of the reference document
/// (`codigo`, `descricao`, `dias_apos_semeadura_inicio`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthStage {
    /// Short stage label (e.g., "VE", "R1").
    #[serde(alias = "codigo")]
    pub code: String,
    /// Human-readable description.
    #[serde(alias = "descricao", default)]
    pub description: String,
    /// First day of the stage, counted from the planting date.
    #[serde(alias = "dias_apos_semeadura_inicio")]
    pub days_after_planting_start: i64,
    /// Last day of the stage, counted from the planting date.
    #[serde(alias = "dias_apos_semeadura_fim")]
    pub days_after_planting_end: i64,
    /// Lower bound of the expected NDVI.
    #[serde(alias = "ndvi_esperado_min")]
    pub expected_ndvi_min: f64,
    /// Upper bound of the expected NDVI.
    #[serde(alias = "ndvi_esperado_max")]
    pub expected_ndvi_max: f64,
}

impl GrowthStage {
    /// Creates a stage.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        days: (i64, i64),
        expected_ndvi: (f64, f64),
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            days_after_planting_start: days.0,
            days_after_planting_end: days.1,
            expected_ndvi_min: expected_ndvi.0,
            expected_ndvi_max: expected_ndvi.1,
        }
    }

    /// The expected NDVI bounds as a range.
    #[must_use]
    pub fn expected_range(&self) -> NdviRange {
        NdviRange {
            min: self.expected_ndvi_min,
            max: self.expected_ndvi_max,
        }
    }

    /// Offsets may be negative (stages before planting); only `start < end`
    /// is required of the window.
    fn check(&self, crop_id: &str) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::invalid_profile(crop_id, "stage code cannot be empty"));
        }
        if self.days_after_planting_start >= self.days_after_planting_end {
            return Err(ValidationError::invalid_profile(
                crop_id,
                format!(
                    "stage {} window {}..{} is empty or inverted",
                    self.code, self.days_after_planting_start, self.days_after_planting_end
                ),
            ));
        }
        NdviRange::try_new(self.expected_ndvi_min, self.expected_ndvi_max)
            .map(|_| ())
            .map_err(|e| ValidationError::invalid_profile(crop_id, format!("stage {}: {e}", self.code)))
    }
}

/// A crop and its ordered growth stages.
///
/// Stage order is chronological and defines the order of derived periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    /// Identifier (e.g., "glycine_max").
    pub id: String,
    /// Display name.
    #[serde(alias = "nome")]
    pub name: String,
    /// Ordered stages.
    #[serde(alias = "estagios")]
    pub stages: Vec<GrowthStage>,
}

impl CropProfile {
    /// Creates a profile.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, stages: Vec<GrowthStage>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stages,
        }
    }

    /// Looks up a stage by code.
    #[must_use]
    pub fn stage(&self, code: &str) -> Option<&GrowthStage> {
        self.stages.iter().find(|s| s.code == code)
    }

    /// Checks the profile invariants.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidProfile` if the id is blank or any
    /// stage has an empty window or out-of-range NDVI bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::invalid_profile(
                self.id.clone(),
                "crop id cannot be empty",
            ));
        }
        for stage in &self.stages {
            stage.check(&self.id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndvi_range_bounds() {
        assert!(NdviRange::try_new(0.3, 0.9).is_ok());
        assert!(NdviRange::try_new(0.5, 0.5).is_ok());
        assert!(NdviRange::try_new(0.9, 0.3).is_err());
        assert!(NdviRange::try_new(-0.1, 0.3).is_err());
        assert!(NdviRange::try_new(0.1, 1.2).is_err());
        assert!(NdviRange::try_new(f64::NAN, 0.3).is_err());
    }

    #[test]
    fn test_ndvi_range_error_is_typed() {
        let err = NdviRange::try_new(0.9, 0.3).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidNdviRange { ref min, ref max, .. } if min == "0.9" && max == "0.3"
        ));
        assert_eq!(err.error_info().code, "PHENO-VALIDATION-NDVI-RANGE");
    }

    #[test]
    fn test_ndvi_range_display() {
        let range = NdviRange::try_new(0.4, 0.8).unwrap();
        assert_eq!(range.to_string(), "0.40 - 0.80");
        assert!((range.span() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_stage_deserializes_reference_document_keys() {
        let json = serde_json::json!({
            "codigo": "VE",
            "descricao": "Emergência",
            "dias_apos_semeadura_inicio": 0,
            "dias_apos_semeadura_fim": 10,
            "ndvi_esperado_min": 0.2,
            "ndvi_esperado_max": 0.4
        });
        let stage: GrowthStage = serde_json::from_value(json).unwrap();
        assert_eq!(stage.code, "VE");
        assert_eq!(stage.days_after_planting_end, 10);
        assert_eq!(stage.expected_range(), NdviRange { min: 0.2, max: 0.4 });
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let profile = CropProfile::new(
            "x",
            "X",
            vec![GrowthStage::new("S1", "", (10, 10), (0.2, 0.4))],
        );
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidProfile { ref crop_id, .. } if crop_id == "x"));
    }

    #[test]
    fn test_validate_rejects_bad_ndvi() {
        let profile = CropProfile::new(
            "x",
            "X",
            vec![GrowthStage::new("S1", "", (0, 10), (0.6, 0.4))],
        );
        let err = profile.validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidProfile { ref crop_id, ref reason }
                if crop_id == "x" && reason.starts_with("stage S1:")
        ));
    }

    #[test]
    fn test_stage_before_planting_is_valid() {
        let profile = CropProfile::new(
            "x",
            "X",
            vec![
                GrowthStage::new("PRE", "", (-10, 5), (0.1, 0.3)),
                GrowthStage::new("VE", "", (5, 15), (0.2, 0.4)),
            ],
        );
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_stage_lookup_by_code() {
        let profile = CropProfile::new(
            "x",
            "X",
            vec![
                GrowthStage::new("A", "", (0, 5), (0.1, 0.2)),
                GrowthStage::new("B", "", (5, 9), (0.2, 0.3)),
            ],
        );
        assert!(profile.validate().is_ok());
        assert_eq!(profile.stage("B").map(|s| s.days_after_planting_start), Some(5));
        assert!(profile.stage("C").is_none());
    }
}
