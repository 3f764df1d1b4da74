//! Error types for phenocheck.
//!
//! Every condition the core can report is a typed error. The calling
//! orchestration layer decides whether a condition halts the run or is
//! rendered as partial data; the core itself never retries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The main error type for phenocheck operations.
#[derive(Debug, Error)]
pub enum PhenocheckError {
    /// Input was missing or malformed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A crop identifier did not resolve.
    #[error("{0}")]
    Lookup(#[from] LookupError),

    /// No periods were left to analyze.
    #[error("{0}")]
    EmptyResult(#[from] EmptyResultError),

    /// Observations do not line up with the period batch.
    #[error("{0}")]
    MergeInconsistency(#[from] MergeInconsistencyError),

    /// The external fetch collaborator failed.
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PhenocheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl PhenocheckError {
    /// Returns boundary-facing diagnostics for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        match self {
            Self::Validation(e) => e.error_info(),
            Self::Lookup(e) => e.error_info(),
            Self::EmptyResult(e) => e.error_info(),
            Self::MergeInconsistency(e) => e.error_info(),
            Self::Fetch(e) => e.error_info(),
            Self::Serialization(msg) => ErrorInfo::new("PHENO-SERIALIZATION", msg.clone()),
            Self::Io(e) => ErrorInfo::new("PHENO-IO", e.to_string()),
        }
    }

    /// Returns true if the error was raised before any fetch could start.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Lookup(_) | Self::EmptyResult(_)
        )
    }
}

/// Metadata about an error for boundary reporting.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "PHENO-LOOKUP-CROP").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info, attaching the default hint for `code` if one exists.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        let code = code.into();
        let fix_hint = ErrorSuggestions::get(&code).map(str::to_string);
        Self {
            code,
            summary: summary.into(),
            fix_hint,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code));
        map.insert("summary".to_string(), serde_json::json!(self.summary));
        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::json!(hint));
        }
        if !self.context.is_empty() {
            map.insert("context".to_string(), serde_json::json!(self.context));
        }
        map
    }
}

/// Missing or malformed input, detected before any fetch is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No crop was selected.
    #[error("No crop selected")]
    MissingCrop,

    /// No planting date was supplied.
    #[error("No planting date supplied")]
    MissingPlantingDate,

    /// A date string could not be parsed as `YYYY-MM-DD`.
    #[error("Invalid {field} '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// Which input carried the date.
        field: String,
        /// The raw value.
        value: String,
    },

    /// The custom-period list was empty.
    #[error("No custom periods supplied")]
    NoCustomPeriods,

    /// A custom period ends before it starts.
    #[error("Period in row {row} ends ({end}) before it starts ({start})")]
    InvertedPeriod {
        /// 1-based position of the row in the submitted list.
        row: usize,
        /// Start date as supplied.
        start: String,
        /// End date as supplied.
        end: String,
    },

    /// NDVI bounds are not finite, fall outside `[0, 1]`, or are out of order.
    #[error("Invalid NDVI range {min} - {max}: {reason}")]
    InvalidNdviRange {
        /// Lower bound as supplied.
        min: String,
        /// Upper bound as supplied.
        max: String,
        /// Which bound check failed.
        reason: String,
    },

    /// Crop reference data violates a profile invariant.
    #[error("Invalid crop profile '{crop_id}': {reason}")]
    InvalidProfile {
        /// The offending crop.
        crop_id: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ValidationError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidDate {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates an invalid NDVI range error.
    #[must_use]
    pub fn invalid_ndvi_range(min: f64, max: f64, reason: impl Into<String>) -> Self {
        Self::InvalidNdviRange {
            min: min.to_string(),
            max: max.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid profile error.
    #[must_use]
    pub fn invalid_profile(crop_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProfile {
            crop_id: crop_id.into(),
            reason: reason.into(),
        }
    }

    /// Returns boundary-facing diagnostics.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        let code = match self {
            Self::MissingCrop => "PHENO-VALIDATION-CROP",
            Self::MissingPlantingDate => "PHENO-VALIDATION-PLANTING-DATE",
            Self::InvalidDate { .. } => "PHENO-VALIDATION-DATE",
            Self::NoCustomPeriods => "PHENO-VALIDATION-CUSTOM-PERIODS",
            Self::InvertedPeriod { .. } => "PHENO-VALIDATION-INVERTED-PERIOD",
            Self::InvalidNdviRange { .. } => "PHENO-VALIDATION-NDVI-RANGE",
            Self::InvalidProfile { .. } => "PHENO-VALIDATION-PROFILE",
        };
        let info = ErrorInfo::new(code, self.to_string());
        match self {
            Self::InvalidDate { field, value } => info
                .with_context_entry("field", field.clone())
                .with_context_entry("value", value.clone()),
            Self::InvertedPeriod { row, .. } => info.with_context_entry("row", row.to_string()),
            Self::InvalidProfile { crop_id, .. } => info.with_context_entry("crop_id", crop_id.clone()),
            _ => info,
        }
    }
}

/// A crop identifier did not match any known profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Crop not found: {crop_id}")]
pub struct LookupError {
    /// The identifier that failed to resolve.
    pub crop_id: String,
}

impl LookupError {
    /// Creates a new lookup error.
    #[must_use]
    pub fn new(crop_id: impl Into<String>) -> Self {
        Self {
            crop_id: crop_id.into(),
        }
    }

    /// Returns boundary-facing diagnostics.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new("PHENO-LOOKUP-CROP", self.to_string())
            .with_context_entry("crop_id", self.crop_id.clone())
    }
}

/// Why a calculation produced no periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// No stage has started yet (planting date in the future or too recent).
    NoStagesReached,
    /// Every custom period was filtered out.
    NoValidCustomPeriods,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStagesReached => write!(f, "no growth stage has started yet"),
            Self::NoValidCustomPeriods => write!(f, "no valid custom periods"),
        }
    }
}

/// The calculator produced zero eligible periods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No periods to analyze: {reason}")]
pub struct EmptyResultError {
    /// Why the batch is empty.
    pub reason: EmptyReason,
}

impl EmptyResultError {
    /// No stage of the profile has started.
    #[must_use]
    pub fn no_stages_reached() -> Self {
        Self {
            reason: EmptyReason::NoStagesReached,
        }
    }

    /// All custom periods were filtered out.
    #[must_use]
    pub fn no_valid_custom_periods() -> Self {
        Self {
            reason: EmptyReason::NoValidCustomPeriods,
        }
    }

    /// Returns boundary-facing diagnostics.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::new("PHENO-EMPTY-PERIODS", self.to_string())
            .with_context_entry("reason", format!("{:?}", self.reason))
    }
}

/// Observation data does not align with the period batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeInconsistencyError {
    /// Periods and observation rows differ in count.
    #[error("Merge inconsistency: {periods} periods but {observations} observation rows")]
    LengthMismatch {
        /// Number of periods.
        periods: usize,
        /// Number of observation rows.
        observations: usize,
    },

    /// A row at a position carries a different ordinal than its period.
    #[error("Merge inconsistency at position {position}: expected ordinal {expected}, found {found}")]
    OrdinalMismatch {
        /// 0-based position in the batch.
        position: usize,
        /// Ordinal of the period.
        expected: usize,
        /// Ordinal of the observation row.
        found: usize,
    },

    /// An observation map has keys that match no period.
    #[error("Merge inconsistency: {source_name} has keys outside the period batch: {}", keys.join(", "))]
    UnexpectedKeys {
        /// Which observation map ("ndvi", "temperature", "precipitation").
        source_name: String,
        /// The offending keys, sorted.
        keys: Vec<String>,
    },
}

impl MergeInconsistencyError {
    /// Returns boundary-facing diagnostics.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        let code = match self {
            Self::LengthMismatch { .. } => "PHENO-MERGE-LENGTH",
            Self::OrdinalMismatch { .. } => "PHENO-MERGE-ORDINAL",
            Self::UnexpectedKeys { .. } => "PHENO-MERGE-KEYS",
        };
        ErrorInfo::new(code, self.to_string())
    }
}

/// Which external fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchTarget {
    /// The vegetation-index composite service.
    Ndvi,
    /// The climate statistics service.
    Climate,
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ndvi => write!(f, "ndvi"),
            Self::Climate => write!(f, "climate"),
        }
    }
}

/// Failures at the boundary with the external fetch collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The transport reported an error.
    #[error("{target} fetch failed: {source}")]
    Transport {
        /// Which fetch failed.
        target: FetchTarget,
        /// Underlying transport error.
        #[source]
        source: anyhow::Error,
    },

    /// The response body did not have the expected shape.
    #[error("{target} response could not be decoded: {message}")]
    Decode {
        /// Which fetch returned the body.
        target: FetchTarget,
        /// Decoder message.
        message: String,
    },

    /// The joint fetch did not finish in time.
    #[error("Observation fetch timed out after {seconds}s")]
    Timeout {
        /// The configured timeout.
        seconds: f64,
    },

    /// The region of interest cannot be turned into a request.
    #[error("Unusable region of interest: {0}")]
    InvalidRegion(String),
}

impl FetchError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(target: FetchTarget, source: impl Into<anyhow::Error>) -> Self {
        Self::Transport {
            target,
            source: source.into(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(target: FetchTarget, message: impl Into<String>) -> Self {
        Self::Decode {
            target,
            message: message.into(),
        }
    }

    /// Returns boundary-facing diagnostics.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        let (code, target) = match self {
            Self::Transport { target, .. } => ("PHENO-FETCH-TRANSPORT", Some(target)),
            Self::Decode { target, .. } => ("PHENO-FETCH-DECODE", Some(target)),
            Self::Timeout { .. } => ("PHENO-FETCH-TIMEOUT", None),
            Self::InvalidRegion(_) => ("PHENO-FETCH-REGION", None),
        };
        let info = ErrorInfo::new(code, self.to_string());
        match target {
            Some(t) => info.with_context_entry("target", t.to_string()),
            None => info,
        }
    }
}

/// Provides default suggestions for common error codes.
pub struct ErrorSuggestions;

impl ErrorSuggestions {
    /// Gets a suggestion for a given error code.
    #[must_use]
    pub fn get(code: &str) -> Option<&'static str> {
        match code {
            "PHENO-VALIDATION-CROP" => Some("Select a crop before running the analysis."),
            "PHENO-VALIDATION-PLANTING-DATE" | "PHENO-VALIDATION-DATE" => {
                Some("Dates must be calendar dates in YYYY-MM-DD format.")
            }
            "PHENO-VALIDATION-CUSTOM-PERIODS" => {
                Some("Add at least one period with both a start and an end date.")
            }
            "PHENO-LOOKUP-CROP" => Some(
                "Check the crop identifier against the crop reference table. \
                 No default crop is substituted.",
            ),
            "PHENO-EMPTY-PERIODS" => Some(
                "The planting date may be in the future; stages are only analyzed \
                 once they have started.",
            ),
            "PHENO-FETCH-TIMEOUT" => Some("Retry later or raise fetch_timeout_seconds."),
            _ => None,
        }
    }
}
