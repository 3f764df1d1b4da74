//! Derives calendar windows from growth stages and a planting date.

use chrono::NaiveDate;
use std::sync::Arc;

use super::custom::{build_custom_periods, CustomPeriodInput};
use super::model::{Period, PeriodBatch};
use crate::crops::{CropProfile, CropStore};
use crate::errors::{EmptyResultError, PhenocheckError, ValidationError};
use crate::utils::{add_days, parse_iso_date, Clock, SystemClock};

/// Days added to the planting date before stage offsets are applied.
///
/// Date-only strings used to be read as midnight UTC, which lands on the
/// previous day in negative-offset time zones. Every stored window was
/// computed with this +1 correction, so it stays part of the arithmetic.
pub const PLANTING_DATE_CORRECTION_DAYS: i64 = 1;

/// Applies the planting-date correction.
#[must_use]
pub fn effective_planting_date(planting_date: NaiveDate) -> NaiveDate {
    add_days(planting_date, PLANTING_DATE_CORRECTION_DAYS)
}

/// Computes the periods of every stage that has started by `today`.
///
/// Stage windows are `effective planting date + days_after_planting_*`.
/// A stage is included iff its start date is on or before `today`, so the
/// batch grows as calendar time passes. Ordinals are assigned to included
/// stages in profile order. The result may be empty.
#[must_use]
pub fn derive_periods(profile: &CropProfile, planting_date: NaiveDate, today: NaiveDate) -> PeriodBatch {
    let effective = effective_planting_date(planting_date);

    let periods: Vec<Period> = profile
        .stages
        .iter()
        .filter_map(|stage| {
            let start = add_days(effective, stage.days_after_planting_start);
            let end = add_days(effective, stage.days_after_planting_end);
            (start <= today).then_some((stage, start, end))
        })
        .enumerate()
        .map(|(i, (stage, start, end))| Period::derived(i + 1, start, end, stage.into()))
        .collect();

    tracing::debug!(
        crop_id = %profile.id,
        planting_date = %planting_date,
        %today,
        period_count = periods.len(),
        stage_count = profile.stages.len(),
        "Derived phenological periods"
    );

    PeriodBatch::from_ordered(periods)
}

/// Turns analysis inputs into period batches.
#[derive(Debug, Clone)]
pub struct PeriodCalculator {
    store: Arc<CropStore>,
    clock: Arc<dyn Clock>,
}

impl PeriodCalculator {
    /// Creates a calculator reading "today" from the local system clock.
    #[must_use]
    pub fn new(store: Arc<CropStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Creates a calculator with an explicit clock.
    #[must_use]
    pub fn with_clock(store: Arc<CropStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// A calculator over the same table with a different clock.
    #[must_use]
    pub fn using_clock(&self, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(Arc::clone(&self.store), clock)
    }

    /// The crop table backing this calculator.
    #[must_use]
    pub fn store(&self) -> &CropStore {
        &self.store
    }

    /// The current date as seen by this calculator.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Calculates the phenological periods for a crop planted on `planting_date`.
    ///
    /// # Arguments
    ///
    /// * `crop_id` - Identifier of a profile in the store
    /// * `planting_date` - `YYYY-MM-DD`
    ///
    /// # Errors
    ///
    /// - `ValidationError` if either input is blank or the date does not parse
    /// - `LookupError` if the crop is unknown
    /// - `EmptyResultError` if no stage has started yet
    pub fn phenology(&self, crop_id: &str, planting_date: &str) -> Result<PeriodBatch, PhenocheckError> {
        let crop_id = crop_id.trim();
        if crop_id.is_empty() {
            return Err(ValidationError::MissingCrop.into());
        }
        if planting_date.trim().is_empty() {
            return Err(ValidationError::MissingPlantingDate.into());
        }
        let planting = parse_iso_date("planting_date", planting_date)?;
        let profile = self.store.require(crop_id)?;

        let batch = derive_periods(profile, planting, self.clock.today());
        if batch.is_empty() {
            return Err(EmptyResultError::no_stages_reached().into());
        }
        Ok(batch)
    }

    /// Filters and numbers caller-supplied periods.
    ///
    /// See [`build_custom_periods`].
    pub fn custom(&self, inputs: &[CustomPeriodInput]) -> Result<PeriodBatch, PhenocheckError> {
        build_custom_periods(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EmptyReason;
    use crate::testing::{soybean_profile, soybean_store};
    use crate::utils::{format_iso_date, FixedClock};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calculator(today: NaiveDate) -> PeriodCalculator {
        PeriodCalculator::with_clock(Arc::new(soybean_store()), Arc::new(FixedClock::new(today)))
    }

    #[test]
    fn test_planting_date_correction_is_one_day() {
        assert_eq!(effective_planting_date(date(2024, 1, 1)), date(2024, 1, 2));
        assert_eq!(effective_planting_date(date(2024, 2, 29)), date(2024, 3, 1));
    }

    #[test]
    fn test_windows_include_correction() {
        let batch = derive_periods(&soybean_profile(), date(2024, 1, 1), date(2024, 12, 31));
        let first = &batch.as_slice()[0];
        // VE covers days 0..10 from the corrected date 2024-01-02.
        assert_eq!(format_iso_date(first.start_date), "2024-01-02");
        assert_eq!(format_iso_date(first.end_date), "2024-01-12");
        let last = &batch.as_slice()[3];
        assert_eq!(last.stage_code(), Some("R5"));
        assert_eq!(format_iso_date(last.start_date), "2024-02-06");
        assert_eq!(format_iso_date(last.end_date), "2024-02-21");
    }

    #[test]
    fn test_all_stages_reached_forty_days_after_planting() {
        let today = date(2025, 3, 15);
        let planting = add_days(today, -40);
        let batch = calculator(today)
            .phenology("glycine_max", &format_iso_date(planting))
            .unwrap();

        let codes: Vec<_> = batch.iter().filter_map(|p| p.stage_code()).collect();
        assert_eq!(codes, vec!["VE", "V1", "R1", "R5"]);
        let ordinals: Vec<_> = batch.iter().map(|p| p.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4]);
        for period in &batch {
            assert!(period.start_date <= today);
            assert!(period.start_date <= period.end_date);
        }
    }

    #[test]
    fn test_stage_starting_today_is_included() {
        // Effective planting = 2025-01-02; R1 starts 20 days later.
        let batch = derive_periods(&soybean_profile(), date(2025, 1, 1), date(2025, 1, 22));
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.as_slice()[2].stage_code(), Some("R1"));

        let batch = derive_periods(&soybean_profile(), date(2025, 1, 1), date(2025, 1, 21));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_future_planting_is_empty_result() {
        let err = calculator(date(2025, 3, 15))
            .phenology("glycine_max", "2025-04-01")
            .unwrap_err();
        match err {
            PhenocheckError::EmptyResult(e) => assert_eq!(e.reason, EmptyReason::NoStagesReached),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_planting_yesterday_reaches_first_stage() {
        // With the correction, planting yesterday puts VE's start at today.
        let calc = calculator(date(2025, 3, 15));
        assert_eq!(calc.phenology("glycine_max", "2025-03-14").unwrap().len(), 1);
        assert!(calc.phenology("glycine_max", "2025-03-15").is_err());
    }

    #[test]
    fn test_unknown_crop_is_lookup_error() {
        let err = calculator(date(2025, 3, 15))
            .phenology("oryza_sativa", "2025-01-01")
            .unwrap_err();
        assert!(matches!(err, PhenocheckError::Lookup(ref e) if e.crop_id == "oryza_sativa"));
    }

    #[test]
    fn test_missing_inputs_are_validation_errors() {
        let calc = calculator(date(2025, 3, 15));
        assert!(matches!(
            calc.phenology("", "2025-01-01"),
            Err(PhenocheckError::Validation(ValidationError::MissingCrop))
        ));
        assert!(matches!(
            calc.phenology("glycine_max", "  "),
            Err(PhenocheckError::Validation(ValidationError::MissingPlantingDate))
        ));
        assert!(matches!(
            calc.phenology("glycine_max", "2025-13-01"),
            Err(PhenocheckError::Validation(ValidationError::InvalidDate { .. }))
        ));
    }

    #[test]
    fn test_same_day_is_idempotent() {
        let calc = calculator(date(2025, 3, 15));
        let a = calc.phenology("glycine_max", "2025-01-10").unwrap();
        let b = calc.phenology("glycine_max", "2025-01-10").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_batch_grows_with_calendar_time() {
        let early = calculator(date(2025, 1, 15)).phenology("glycine_max", "2025-01-01").unwrap();
        let later = calculator(date(2025, 2, 15)).phenology("glycine_max", "2025-01-01").unwrap();
        assert_eq!(early.len(), 2);
        assert_eq!(later.len(), 4);
        assert_eq!(early.as_slice(), &later.as_slice()[..2]);
    }
}
