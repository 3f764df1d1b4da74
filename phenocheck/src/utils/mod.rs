//! Utility functions for calendar dates and run identifiers.
//!
//! Dates throughout phenocheck are calendar dates without a time of day,
//! exchanged as ISO 8601 `YYYY-MM-DD` strings.

pub mod dates;
mod ids;

pub use dates::{
    add_days, format_day_month, format_iso_date, parse_iso_date, Clock, FixedClock, SystemClock,
};
pub use ids::{fingerprint, generate_run_id};
