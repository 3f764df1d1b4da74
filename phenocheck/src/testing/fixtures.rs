//! Reference data and canned observations for tests.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::crops::{CropProfile, CropStore, GrowthStage};
use crate::fetch::RegionOfInterest;
use crate::observations::{ClimateResponse, NdviResponse};
use crate::periods::PeriodKey;
use crate::utils::FixedClock;

/// Crop id of [`soybean_profile`].
pub const SOYBEAN_ID: &str = "glycine_max";

/// A four-stage soybean profile with every expected range at `0.30 - 0.90`.
///
/// | stage | days |
/// |---|---|
/// | VE | 0-10 |
/// | V1 | 10-20 |
/// | R1 | 20-35 |
/// | R5 | 35-50 |
#[must_use]
pub fn soybean_profile() -> CropProfile {
    CropProfile::new(
        SOYBEAN_ID,
        "Soybean",
        vec![
            GrowthStage::new("VE", "Emergence", (0, 10), (0.3, 0.9)),
            GrowthStage::new("V1", "First trifoliate", (10, 20), (0.3, 0.9)),
            GrowthStage::new("R1", "Beginning bloom", (20, 35), (0.3, 0.9)),
            GrowthStage::new("R5", "Beginning seed", (35, 50), (0.3, 0.9)),
        ],
    )
}

/// A store holding only [`soybean_profile`].
///
/// # Panics
///
/// Never; the fixture profile is valid.
#[must_use]
pub fn soybean_store() -> CropStore {
    CropStore::from_profiles(vec![soybean_profile()]).expect("soybean fixture is a valid profile")
}

/// A clock frozen on `y-m-d`.
///
/// # Panics
///
/// Panics if the date does not exist.
#[must_use]
pub fn fixed_clock(y: i32, m: u32, d: u32) -> Arc<FixedClock> {
    let date = NaiveDate::from_ymd_opt(y, m, d).expect("fixture date exists");
    Arc::new(FixedClock::new(date))
}

/// A small square field.
#[must_use]
pub fn sample_region() -> RegionOfInterest {
    RegionOfInterest::polygon(vec![
        [-47.0, -15.0],
        [-46.0, -15.0],
        [-46.0, -14.0],
        [-47.0, -14.0],
    ])
}

/// NDVI response with `means[i]` stored under `period_<i + 1>`.
#[must_use]
pub fn ndvi_response(means: &[Option<f64>]) -> NdviResponse {
    means
        .iter()
        .enumerate()
        .filter_map(|(i, mean)| PeriodKey::new(i + 1).map(|key| (key, *mean)))
        .fold(NdviResponse::default(), |response, (key, mean)| {
            response.with_mean(key, mean)
        })
}

/// Climate response with the same temperature and precipitation for
/// periods `1..=count`.
#[must_use]
pub fn uniform_climate_response(count: usize, temperature: f64, precipitation: f64) -> ClimateResponse {
    (1..=count)
        .filter_map(PeriodKey::new)
        .fold(ClimateResponse::default(), |response, key| {
            response.with_values(key, Some(temperature), Some(precipitation))
        })
}
