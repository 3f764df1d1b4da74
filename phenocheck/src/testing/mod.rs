//! Testing utilities.
//!
//! This module provides:
//! - Reference fixtures (a soybean profile, fixed clocks, canned responses)
//! - A scriptable observation source
//! - Assertions over period batches and reports

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_dense_ordinals, assert_stage_codes, assert_statuses};
pub use fixtures::{
    fixed_clock, ndvi_response, sample_region, soybean_profile, soybean_store,
    uniform_climate_response, SOYBEAN_ID,
};
pub use mocks::FakeObservationSource;
