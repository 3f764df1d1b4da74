//! Diagnostic classifier.

use super::status::VigorStatus;
use crate::crops::NdviRange;

/// Fraction of the expected range that offsets the attention threshold
/// from the expected minimum.
///
/// Fixed design constant, not exposed at call time.
pub const ATTENTION_BAND_FRACTION: f64 = 0.15;

/// Threshold separating `Attention` from `Low`: `min + 0.15 * (max - min)`.
#[must_use]
pub fn attention_threshold(expected: NdviRange) -> f64 {
    threshold_with_fraction(expected, ATTENTION_BAND_FRACTION)
}

/// Classifies an observed NDVI against an optional expected range.
///
/// - no observation: `Unavailable`
/// - no range (custom period): `Informational`
/// - `observed > max`: `Exceptional`
/// - `min <= observed <= max`: `Normal`
/// - `threshold <= observed < min`: `Attention`
/// - otherwise: `Low`
#[must_use]
pub fn classify(
    observed_ndvi: Option<f64>,
    expected_min: Option<f64>,
    expected_max: Option<f64>,
) -> VigorStatus {
    let expected = match (expected_min, expected_max) {
        (Some(min), Some(max)) => Some(NdviRange { min, max }),
        _ => None,
    };
    classify_against(observed_ndvi, expected)
}

/// Same as [`classify`], taking the range as one value.
#[must_use]
pub fn classify_against(observed_ndvi: Option<f64>, expected: Option<NdviRange>) -> VigorStatus {
    classify_with_fraction(observed_ndvi, expected, ATTENTION_BAND_FRACTION)
}

fn threshold_with_fraction(expected: NdviRange, fraction: f64) -> f64 {
    expected.min + fraction * expected.span()
}

fn classify_with_fraction(
    observed_ndvi: Option<f64>,
    expected: Option<NdviRange>,
    fraction: f64,
) -> VigorStatus {
    let Some(observed) = observed_ndvi else {
        return VigorStatus::Unavailable;
    };
    let Some(expected) = expected else {
        return VigorStatus::Informational;
    };
    let threshold = threshold_with_fraction(expected, fraction);

    if observed > expected.max {
        VigorStatus::Exceptional
    } else if observed >= expected.min {
        VigorStatus::Normal
    } else if observed >= threshold {
        VigorStatus::Attention
    } else {
        VigorStatus::Low
    }
}
