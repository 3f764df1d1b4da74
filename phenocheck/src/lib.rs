//! # Phenocheck
//!
//! Phenological period calculation and NDVI vigor diagnostics for crop fields.
//!
//! Phenocheck turns a crop and a planting date (or a list of hand-picked
//! date windows) into an ordered batch of analysis periods, and turns the
//! NDVI and climate observations fetched for those periods into a
//! diagnostic report:
//!
//! - **Crop reference data**: growth stages with day offsets and expected NDVI
//! - **Period calculation**: stages that have started by today, or custom windows
//! - **Observation merging**: per-period alignment by `period_<n>` key
//! - **Diagnostics**: vigor classification against the expected NDVI range
//! - **Orchestration**: concurrent all-or-nothing fetch through an [`fetch::ObservationSource`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use phenocheck::prelude::*;
//!
//! let source = HttpObservationSource::new(ApiConfig::default());
//! let analyzer = Analyzer::with_global_store(source)?;
//!
//! let request = PhenologyRequest::new("glycine_max", "2025-01-10", roi);
//! let result = analyzer.run_phenology(&request).await?;
//! for entry in &result.report.entries {
//!     println!("{} {}", entry.label, entry.status.label());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod analysis;
pub mod config;
pub mod crops;
pub mod diagnostics;
pub mod errors;
pub mod fetch;
pub mod observability;
pub mod observations;
pub mod periods;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analysis::{AnalysisResult, Analyzer, CustomRequest, PhenologyRequest};
    pub use crate::config::{AnalysisConfig, ApiConfig};
    pub use crate::crops::{global_store, CropProfile, CropStore, GrowthStage, NdviRange};
    pub use crate::diagnostics::{
        classify, AnalysisMode, DiagnosticEntry, DiagnosticReport, NdviBand, VigorStatus,
        UNAVAILABLE_MARKER,
    };
    pub use crate::errors::{
        EmptyResultError, FetchError, LookupError, MergeInconsistencyError, PhenocheckError,
        ValidationError,
    };
    #[cfg(feature = "http")]
    pub use crate::fetch::HttpObservationSource;
    pub use crate::fetch::{ObservationSource, RegionOfInterest};
    pub use crate::observations::{merge_observations, ClimateResponse, NdviResponse, Observation};
    pub use crate::periods::{CustomPeriodInput, Period, PeriodBatch, PeriodCalculator, PeriodKey};
    pub use crate::utils::{Clock, FixedClock, SystemClock};
}
