//! Orchestration of analysis runs.
//!
//! One run validates its inputs, derives the period batch, fetches NDVI and
//! climate observations concurrently, merges them by period key and
//! assembles the diagnostic report. A run fails as a whole if either fetch
//! fails.

mod analyzer;
mod integration_tests;
mod request;

pub use analyzer::Analyzer;
pub use request::{AnalysisResult, CustomRequest, PhenologyRequest};
