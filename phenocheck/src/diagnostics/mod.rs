//! NDVI diagnostics: classification and report assembly.

mod classifier;
mod format;
mod report;
mod status;

pub use classifier::{attention_threshold, classify, classify_against, ATTENTION_BAND_FRACTION};
pub use format::{
    format_expected_range, format_optional, ClimateSummary, CUSTOM_NDVI_DECIMALS,
    PHENOLOGY_NDVI_DECIMALS, UNAVAILABLE_MARKER,
};
pub use report::{
    assemble_entries, AnalysisMode, ChartSeries, DiagnosticEntry, DiagnosticReport,
};
pub use status::{NdviBand, VigorStatus};
