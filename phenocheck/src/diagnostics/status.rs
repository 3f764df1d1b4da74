//! Vigor status labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of comparing an observed NDVI with the expected range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VigorStatus {
    /// Above the expected maximum.
    Exceptional,
    /// Within the expected range.
    Normal,
    /// Slightly below expectations.
    Attention,
    /// Well below expectations.
    Low,
    /// No expected range to judge against (custom periods).
    Informational,
    /// No observed NDVI.
    Unavailable,
}

impl VigorStatus {
    /// Short machine-friendly name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exceptional => "exceptional",
            Self::Normal => "normal",
            Self::Attention => "attention",
            Self::Low => "low",
            Self::Informational => "informational",
            Self::Unavailable => "unavailable",
        }
    }

    /// Label shown in tables and exports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exceptional => "Exceptional vigor",
            Self::Normal => "Normal",
            Self::Attention => "Attention",
            Self::Low => "Low vigor",
            Self::Informational => "Informational",
            Self::Unavailable => super::UNAVAILABLE_MARKER,
        }
    }

    /// Returns true if the status is a pass/fail judgment against a range.
    #[must_use]
    pub fn is_judgment(&self) -> bool {
        matches!(
            self,
            Self::Exceptional | Self::Normal | Self::Attention | Self::Low
        )
    }
}

impl fmt::Display for VigorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse NDVI band for periods without an expected range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NdviBand {
    /// NDVI above 0.7.
    High,
    /// NDVI above 0.4, up to 0.7.
    Medium,
    /// NDVI of 0.4 or less.
    Low,
}

impl NdviBand {
    /// Lower bound (exclusive) of the high band.
    pub const HIGH_ABOVE: f64 = 0.7;
    /// Lower bound (exclusive) of the medium band.
    pub const MEDIUM_ABOVE: f64 = 0.4;

    /// Bands an observed NDVI value.
    #[must_use]
    pub fn from_ndvi(ndvi: f64) -> Self {
        if ndvi > Self::HIGH_ABOVE {
            Self::High
        } else if ndvi > Self::MEDIUM_ABOVE {
            Self::Medium
        } else {
            Self::Low
        }
    }
}
