//! Observation merger.
//!
//! Vegetation-index and climate observations are fetched elsewhere; this
//! module only consumes them, tolerating missing entries and null values.

mod merger;
mod model;

pub use merger::{merge_observations, MergedObservations};
pub use model::{
    ClimateResponse, NdviResponse, NdviStats, Observation, PrecipitationStats, TemperatureStats,
};
