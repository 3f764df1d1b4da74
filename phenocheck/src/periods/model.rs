//! Period types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crops::{GrowthStage, NdviRange};
use crate::utils::{fingerprint, format_day_month, format_iso_date};

/// Prefix of the keys external services use for per-period results.
pub const PERIOD_KEY_PREFIX: &str = "period_";

/// The 1-based position of a period within its batch.
///
/// This is the join key with external observation maps, rendered as
/// `period_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey(usize);

impl PeriodKey {
    /// Creates a key; ordinals start at 1.
    #[must_use]
    pub fn new(ordinal: usize) -> Option<Self> {
        (ordinal >= 1).then_some(Self(ordinal))
    }

    /// Parses `period_<n>` with `n >= 1` and no leading zeros.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        let digits = key.strip_prefix(PERIOD_KEY_PREFIX)?;
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        digits.parse().ok().and_then(Self::new)
    }

    /// The 1-based ordinal.
    #[must_use]
    pub fn ordinal(self) -> usize {
        self.0
    }

    /// Request field carrying this period's start date.
    #[must_use]
    pub fn start_field(self) -> String {
        format!("start_date_{self}")
    }

    /// Request field carrying this period's end date.
    #[must_use]
    pub fn end_field(self) -> String {
        format!("end_date_{self}")
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PERIOD_KEY_PREFIX}{}", self.0)
    }
}

/// The growth stage a derived period is bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageBinding {
    /// Stage code.
    pub code: String,
    /// Stage description.
    pub description: String,
    /// Expected NDVI window for the stage.
    pub expected_ndvi: NdviRange,
}

impl From<&GrowthStage> for StageBinding {
    fn from(stage: &GrowthStage) -> Self {
        Self {
            code: stage.code.clone(),
            description: stage.description.clone(),
            expected_ndvi: stage.expected_range(),
        }
    }
}

/// Whether a period came from a crop stage or from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Computed from a growth stage and a planting date.
    Derived,
    /// Supplied directly by the caller.
    Custom,
}

/// A calendar window used to request and align observations.
///
/// Invariant: `start_date <= end_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// 1-based position within the batch.
    pub ordinal: usize,
    /// First day of the window.
    pub start_date: NaiveDate,
    /// Last day of the window.
    pub end_date: NaiveDate,
    /// Stage binding; absent for custom periods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<StageBinding>,
}

impl Period {
    /// Creates a period bound to a stage.
    #[must_use]
    pub(crate) fn derived(
        ordinal: usize,
        start_date: NaiveDate,
        end_date: NaiveDate,
        stage: StageBinding,
    ) -> Self {
        Self {
            ordinal,
            start_date,
            end_date,
            stage: Some(stage),
        }
    }

    /// Creates a period with no stage binding.
    #[must_use]
    pub(crate) fn custom(ordinal: usize, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            ordinal,
            start_date,
            end_date,
            stage: None,
        }
    }

    /// The join key for this period.
    #[must_use]
    pub fn key(&self) -> PeriodKey {
        PeriodKey(self.ordinal)
    }

    /// Derived or custom.
    #[must_use]
    pub fn kind(&self) -> PeriodKind {
        if self.stage.is_some() {
            PeriodKind::Derived
        } else {
            PeriodKind::Custom
        }
    }

    /// Stage code, if bound.
    #[must_use]
    pub fn stage_code(&self) -> Option<&str> {
        self.stage.as_ref().map(|s| s.code.as_str())
    }

    /// Stage description, if bound.
    #[must_use]
    pub fn stage_description(&self) -> Option<&str> {
        self.stage.as_ref().map(|s| s.description.as_str())
    }

    /// Expected NDVI window, if bound.
    #[must_use]
    pub fn expected_ndvi(&self) -> Option<NdviRange> {
        self.stage.as_ref().map(|s| s.expected_ndvi)
    }

    /// Display label: the stage code, or `Period N` for custom periods.
    #[must_use]
    pub fn label(&self) -> String {
        match self.stage {
            Some(ref stage) => stage.code.clone(),
            None => format!("Period {}", self.ordinal),
        }
    }

    /// Short window label, e.g. `05/01 - 15/01`.
    #[must_use]
    pub fn window_label(&self) -> String {
        format!(
            "{} - {}",
            format_day_month(self.start_date),
            format_day_month(self.end_date)
        )
    }

    /// Start date as `YYYY-MM-DD`.
    #[must_use]
    pub fn start_iso(&self) -> String {
        format_iso_date(self.start_date)
    }

    /// End date as `YYYY-MM-DD`.
    #[must_use]
    pub fn end_iso(&self) -> String {
        format_iso_date(self.end_date)
    }

    /// Number of calendar days covered, both ends included.
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// An ordered batch of periods produced by one calculation.
///
/// Ordinals run `1..=len` in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PeriodBatch {
    periods: Vec<Period>,
}

impl PeriodBatch {
    /// Wraps periods whose ordinals are already `1..=len`.
    pub(crate) fn from_ordered(periods: Vec<Period>) -> Self {
        debug_assert!(periods
            .iter()
            .enumerate()
            .all(|(i, p)| p.ordinal == i + 1 && p.start_date <= p.end_date));
        Self { periods }
    }

    /// The periods in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Period] {
        &self.periods
    }

    /// Iterates periods in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Period> {
        self.periods.iter()
    }

    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Returns true if the batch has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Looks up a period by its key.
    #[must_use]
    pub fn get(&self, key: PeriodKey) -> Option<&Period> {
        self.periods.get(key.ordinal() - 1)
    }

    /// Join keys in order.
    #[must_use]
    pub fn keys(&self) -> Vec<PeriodKey> {
        self.periods.iter().map(Period::key).collect()
    }

    /// `[start, end]` pairs as ISO strings, in order.
    #[must_use]
    pub fn date_windows(&self) -> Vec<[String; 2]> {
        self.periods
            .iter()
            .map(|p| [p.start_iso(), p.end_iso()])
            .collect()
    }

    /// Stable key over the date windows of the batch.
    ///
    /// Two calculations with the same crop and planting date on the same
    /// day produce the same fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let parts: Vec<String> = self
            .periods
            .iter()
            .map(|p| format!("{}/{}/{}", p.label(), p.start_iso(), p.end_iso()))
            .collect();
        let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
        fingerprint(&refs)
    }

    /// Unwraps the periods.
    #[must_use]
    pub fn into_inner(self) -> Vec<Period> {
        self.periods
    }
}

impl<'a> IntoIterator for &'a PeriodBatch {
    type Item = &'a Period;
    type IntoIter = std::slice::Iter<'a, Period>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.iter()
    }
}
