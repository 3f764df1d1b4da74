//! Caller-supplied analysis windows.

use serde::{Deserialize, Serialize};

use super::model::{Period, PeriodBatch};
use crate::errors::{EmptyResultError, PhenocheckError, ValidationError};
use crate::utils::parse_iso_date;

/// One row of a custom-period form. Either date may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPeriodInput {
    /// Start date, `YYYY-MM-DD`.
    #[serde(default, alias = "startDate")]
    pub start_date: Option<String>,
    /// End date, `YYYY-MM-DD`.
    #[serde(default, alias = "endDate")]
    pub end_date: Option<String>,
}

impl CustomPeriodInput {
    /// Creates a complete row.
    #[must_use]
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
        }
    }

    /// Returns true if both dates are present and non-blank.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let filled = |d: &Option<String>| d.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.start_date) && filled(&self.end_date)
    }
}

/// Builds a batch from custom rows.
///
/// Rows missing either date are dropped; the rest keep their order and are
/// numbered from 1.
///
/// # Errors
///
/// - `ValidationError::NoCustomPeriods` if `inputs` is empty
/// - `ValidationError::InvalidDate` if a kept row has an unparseable date
/// - `ValidationError::InvertedPeriod` if a kept row ends before it starts
/// - `EmptyResultError` if every row was dropped
pub fn build_custom_periods(inputs: &[CustomPeriodInput]) -> Result<PeriodBatch, PhenocheckError> {
    if inputs.is_empty() {
        return Err(ValidationError::NoCustomPeriods.into());
    }

    let mut periods = Vec::with_capacity(inputs.len());
    // Errors name the submitted row; kept periods are renumbered separately.
    for (index, input) in inputs.iter().enumerate().filter(|(_, i)| i.is_complete()) {
        let row = index + 1;
        let (Some(raw_start), Some(raw_end)) = (&input.start_date, &input.end_date) else {
            continue;
        };
        let start = parse_iso_date(&format!("start date in row {row}"), raw_start)?;
        let end = parse_iso_date(&format!("end date in row {row}"), raw_end)?;
        if start > end {
            return Err(ValidationError::InvertedPeriod {
                row,
                start: raw_start.trim().to_string(),
                end: raw_end.trim().to_string(),
            }
            .into());
        }
        periods.push(Period::custom(periods.len() + 1, start, end));
    }

    let dropped = inputs.len() - periods.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = periods.len(), "Dropped incomplete custom periods");
    }
    if periods.is_empty() {
        return Err(EmptyResultError::no_valid_custom_periods().into());
    }
    Ok(PeriodBatch::from_ordered(periods))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EmptyReason;
    use crate::periods::PeriodKind;

    fn partial(start: Option<&str>, end: Option<&str>) -> CustomPeriodInput {
        CustomPeriodInput {
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
        }
    }

    #[test]
    fn test_two_complete_periods() {
        let batch = build_custom_periods(&[
            CustomPeriodInput::new("2024-01-01", "2024-01-15"),
            CustomPeriodInput::new("2024-02-01", "2024-02-15"),
        ])
        .unwrap();

        assert_eq!(batch.len(), 2);
        let labels: Vec<_> = batch.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["Period 1", "Period 2"]);
        assert!(batch.iter().all(|p| p.kind() == PeriodKind::Custom));
    }

    #[test]
    fn test_incomplete_rows_are_dropped_and_renumbered() {
        let batch = build_custom_periods(&[
            partial(Some("2024-01-01"), None),
            partial(Some(""), Some("2024-01-20")),
            CustomPeriodInput::new("2024-03-01", "2024-03-10"),
            partial(None, None),
            CustomPeriodInput::new("2024-04-01", "2024-04-10"),
        ])
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.as_slice()[0].ordinal, 1);
        assert_eq!(batch.as_slice()[0].start_iso(), "2024-03-01");
        assert_eq!(batch.as_slice()[1].ordinal, 2);
        assert_eq!(batch.as_slice()[1].start_iso(), "2024-04-01");
    }

    #[test]
    fn test_all_rows_dropped_is_empty_result() {
        let err = build_custom_periods(&[partial(Some("2024-01-01"), Some("  "))]).unwrap_err();
        match err {
            PhenocheckError::EmptyResult(e) => {
                assert_eq!(e.reason, EmptyReason::NoValidCustomPeriods);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_no_rows_is_validation_error() {
        assert!(matches!(
            build_custom_periods(&[]),
            Err(PhenocheckError::Validation(ValidationError::NoCustomPeriods))
        ));
    }

    #[test]
    fn test_single_day_period_is_allowed() {
        let batch = build_custom_periods(&[CustomPeriodInput::new("2024-05-05", "2024-05-05")]).unwrap();
        assert_eq!(batch.as_slice()[0].duration_days(), 1);
    }

    #[test]
    fn test_inverted_period_rejected() {
        let err = build_custom_periods(&[CustomPeriodInput::new("2024-02-15", "2024-02-01")]).unwrap_err();
        assert!(matches!(
            err,
            PhenocheckError::Validation(ValidationError::InvertedPeriod { row: 1, .. })
        ));
    }

    #[test]
    fn test_errors_name_the_submitted_row() {
        let err = build_custom_periods(&[
            partial(Some("2024-01-01"), None),
            partial(None, Some("2024-01-20")),
            CustomPeriodInput::new("2024-02-15", "2024-02-01"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            PhenocheckError::Validation(ValidationError::InvertedPeriod { row: 3, .. })
        ));
        assert!(err.to_string().contains("row 3"));

        let err = build_custom_periods(&[
            partial(None, None),
            CustomPeriodInput::new("2024-02-01", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            PhenocheckError::Validation(ValidationError::InvalidDate { ref field, .. })
                if field == "end date in row 2"
        ));
    }

    #[test]
    fn test_unparseable_date_rejected() {
        let err = build_custom_periods(&[CustomPeriodInput::new("2024-02-01", "soon")]).unwrap_err();
        assert!(matches!(
            err,
            PhenocheckError::Validation(ValidationError::InvalidDate { ref value, .. }) if value == "soon"
        ));
    }

    #[test]
    fn test_camel_case_form_payload() {
        let rows: Vec<CustomPeriodInput> = serde_json::from_str(
            r#"[{"startDate": "2024-01-01", "endDate": "2024-01-15"}, {"startDate": ""}]"#,
        )
        .unwrap();
        assert!(rows[0].is_complete());
        assert!(!rows[1].is_complete());
    }
}
