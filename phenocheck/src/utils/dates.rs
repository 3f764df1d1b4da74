//! Calendar date utilities.

use chrono::{Days, Local, NaiveDate};
use std::fmt::Debug;

use crate::errors::ValidationError;

/// ISO 8601 date-only format used on every boundary.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "today" for stage inclusion.
///
/// Stage eligibility is recomputed on every request against the caller's
/// current date, so the clock is injected rather than read ad hoc.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current calendar date.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the local system time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    /// Creates a clock that always reports `date`.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Parses a `YYYY-MM-DD` string.
///
/// # Arguments
///
/// * `field` - Name of the input, echoed back in the error
/// * `value` - The raw string; surrounding whitespace is ignored
///
/// # Errors
///
/// Returns `ValidationError::InvalidDate` if the value is not a calendar date.
pub fn parse_iso_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .map_err(|_| ValidationError::invalid_date(field, trimmed))
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Formats a date as `DD/MM`, the short form used on timeline cards.
#[must_use]
pub fn format_day_month(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// Moves a date by a signed number of days, saturating at the calendar bounds.
#[must_use]
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.unwrap_or(if days >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}
