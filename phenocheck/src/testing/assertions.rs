//! Assertions over batches and reports.

use crate::diagnostics::{DiagnosticReport, VigorStatus};
use crate::periods::PeriodBatch;

/// Asserts the stage codes of a batch, in order.
pub fn assert_stage_codes(batch: &PeriodBatch, expected: &[&str]) {
    let actual: Vec<&str> = batch.iter().filter_map(|p| p.stage_code()).collect();
    assert_eq!(actual, expected, "Unexpected stage codes");
}

/// Asserts the ordinals of a batch run `1..=len`.
pub fn assert_dense_ordinals(batch: &PeriodBatch) {
    for (i, period) in batch.iter().enumerate() {
        assert_eq!(
            period.ordinal,
            i + 1,
            "Period at position {i} has ordinal {}",
            period.ordinal
        );
    }
}

/// Asserts the status of every entry, in order.
pub fn assert_statuses(report: &DiagnosticReport, expected: &[VigorStatus]) {
    let actual: Vec<VigorStatus> = report.entries.iter().map(|e| e.status).collect();
    assert_eq!(actual, expected, "Unexpected statuses");
}
