//! Period calculator.
//!
//! Turns a crop and a planting date into one calendar window per growth
//! stage that has already started, or accepts arbitrary windows from the
//! caller. A period's 1-based ordinal is the key used to line it up with
//! externally fetched observations.

mod calculator;
mod custom;
mod model;

pub use calculator::{
    derive_periods, effective_planting_date, PeriodCalculator, PLANTING_DATE_CORRECTION_DAYS,
};
pub use custom::{build_custom_periods, CustomPeriodInput};
pub use model::{Period, PeriodBatch, PeriodKey, PeriodKind, StageBinding, PERIOD_KEY_PREFIX};
