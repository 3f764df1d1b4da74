//! The analysis runner.

use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::crops::{global_store, CropStore};
use crate::diagnostics::{AnalysisMode, DiagnosticReport};
use crate::errors::{FetchError, PhenocheckError};
use crate::fetch::{ClimateRequest, NdviRequest, ObservationSource, RegionOfInterest};
use crate::observations::{merge_observations, ClimateResponse, NdviResponse};
use crate::observability::{
    LoggingTracingEmitter, RunSpanAttributes, SpanTimer, TracingEmitter,
};
use crate::periods::{PeriodBatch, PeriodCalculator};
use crate::utils::{generate_run_id, Clock};

use super::request::{AnalysisResult, CustomRequest, PhenologyRequest};

const RUN_SPAN: &str = "analysis.run";
const FETCH_SPAN: &str = "analysis.fetch";

/// Runs phenology and custom-period analyses against an observation source.
///
/// Runs share nothing but the read-only crop table, so one analyzer can
/// serve concurrent requests.
pub struct Analyzer<S> {
    source: S,
    calculator: PeriodCalculator,
    config: AnalysisConfig,
    emitter: Arc<dyn TracingEmitter>,
}

impl<S> std::fmt::Debug for Analyzer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("calculator", &self.calculator)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: ObservationSource> Analyzer<S> {
    /// Creates an analyzer over `store` using the system clock.
    #[must_use]
    pub fn new(source: S, store: Arc<CropStore>) -> Self {
        Self {
            source,
            calculator: PeriodCalculator::new(store),
            config: AnalysisConfig::default(),
            emitter: Arc::new(LoggingTracingEmitter),
        }
    }

    /// Creates an analyzer over the process-wide crop table.
    ///
    /// # Errors
    ///
    /// Fails if the bundled table cannot be loaded.
    pub fn with_global_store(source: S) -> Result<Self, PhenocheckError> {
        Ok(Self::new(source, global_store()?))
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the clock used to decide which stages have started.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.calculator = self.calculator.using_clock(clock);
        self
    }

    /// Sets the span emitter.
    #[must_use]
    pub fn with_emitter(mut self, emitter: Arc<dyn TracingEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The period calculator.
    #[must_use]
    pub fn calculator(&self) -> &PeriodCalculator {
        &self.calculator
    }

    /// The observation source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Analyzes every stage the crop has reached.
    ///
    /// # Errors
    ///
    /// - `Validation`, `Lookup` or `EmptyResult` before any fetch is issued
    /// - `Fetch` if either service fails or the joint fetch times out
    /// - `MergeInconsistency` if observations cannot be aligned
    pub async fn run_phenology(
        &self,
        request: &PhenologyRequest,
    ) -> Result<AnalysisResult, PhenocheckError> {
        let attrs = RunSpanAttributes::new()
            .with_mode("phenology")
            .with_crop_id(request.crop_id.trim());
        let batch = self
            .calculator
            .phenology(&request.crop_id, &request.planting_date)
            .map_err(|e| self.reject(&attrs, e))?;
        let mode = AnalysisMode::Phenology {
            crop_id: request.crop_id.trim().to_string(),
        };
        self.run(mode, batch, &request.roi, attrs).await
    }

    /// Analyzes caller-supplied windows.
    ///
    /// # Errors
    ///
    /// Same as [`Analyzer::run_phenology`], with custom-period validation
    /// in place of the crop lookup.
    pub async fn run_custom(&self, request: &CustomRequest) -> Result<AnalysisResult, PhenocheckError> {
        let attrs = RunSpanAttributes::new().with_mode("custom");
        let batch = self
            .calculator
            .custom(&request.periods)
            .map_err(|e| self.reject(&attrs, e))?;
        self.run(AnalysisMode::Custom, batch, &request.roi, attrs).await
    }

    fn reject(&self, attrs: &RunSpanAttributes, error: PhenocheckError) -> PhenocheckError {
        let info = error.error_info();
        tracing::warn!(code = %info.code, error = %error, "Analysis request rejected");
        self.emitter
            .span_error(RUN_SPAN, &error.to_string(), &attrs.to_attributes());
        error
    }

    async fn run(
        &self,
        mode: AnalysisMode,
        batch: PeriodBatch,
        roi: &RegionOfInterest,
        attrs: RunSpanAttributes,
    ) -> Result<AnalysisResult, PhenocheckError> {
        let run_id = generate_run_id();
        let attrs = attrs
            .with_run_id(run_id.to_string())
            .with_period_count(batch.len());
        let timer = SpanTimer::start(RUN_SPAN);
        self.emitter.span_start(RUN_SPAN, &attrs.to_attributes());

        match self.execute(mode, &batch, roi, &attrs).await {
            Ok(report) => {
                let duration_ms = timer.finish();
                let missing = report
                    .entries
                    .iter()
                    .filter(|e| e.observed_ndvi.is_none())
                    .count();
                let attrs = attrs.with_missing_ndvi(missing).with_status("completed");
                self.emitter
                    .span_end(RUN_SPAN, duration_ms, &attrs.to_attributes());
                tracing::info!(
                    %run_id,
                    period_count = batch.len(),
                    missing_ndvi = missing,
                    duration_ms,
                    "Analysis completed"
                );
                Ok(AnalysisResult {
                    run_id,
                    periods: batch,
                    report: report.with_run_id(run_id),
                    duration_ms,
                })
            }
            Err(error) => {
                let attrs = attrs.with_status("failed");
                self.emitter
                    .span_error(RUN_SPAN, &error.to_string(), &attrs.to_attributes());
                tracing::error!(
                    %run_id,
                    code = %error.error_info().code,
                    error = %error,
                    duration_ms = timer.finish(),
                    "Analysis failed"
                );
                Err(error)
            }
        }
    }

    async fn execute(
        &self,
        mode: AnalysisMode,
        batch: &PeriodBatch,
        roi: &RegionOfInterest,
        attrs: &RunSpanAttributes,
    ) -> Result<DiagnosticReport, PhenocheckError> {
        let ndvi_request = NdviRequest::new(roi.clone(), batch);
        let climate_request = ClimateRequest::new(roi, batch)?;

        let (ndvi, climate) = self
            .fetch(&ndvi_request, &climate_request, attrs)
            .await?;

        let merged = merge_observations(batch, &ndvi, &climate);
        if self.config.strict_merge {
            merged.check()?;
        }
        let warnings: Vec<String> = merged.issues().iter().map(ToString::to_string).collect();
        for warning in &warnings {
            tracing::warn!(warning = %warning, "Observation keys outside the period batch");
        }

        let report = DiagnosticReport::assemble(
            mode,
            self.calculator.today(),
            batch.as_slice(),
            merged.rows(),
        )?;
        Ok(report.with_warnings(warnings))
    }

    /// Issues both fetches concurrently; either failure or the timeout
    /// fails the pair.
    async fn fetch(
        &self,
        ndvi_request: &NdviRequest,
        climate_request: &ClimateRequest,
        attrs: &RunSpanAttributes,
    ) -> Result<(NdviResponse, ClimateResponse), FetchError> {
        let timer = SpanTimer::start(FETCH_SPAN);
        self.emitter.span_start(FETCH_SPAN, &attrs.to_attributes());

        let limit = self.config.fetch_timeout();
        let joint = futures::future::try_join(
            self.source.fetch_ndvi(ndvi_request),
            self.source.fetch_climate(climate_request),
        );
        let result = match tokio::time::timeout(limit, joint).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                seconds: limit.as_secs_f64(),
            }),
        };

        match result {
            Ok(responses) => {
                self.emitter
                    .span_end(FETCH_SPAN, timer.finish(), &attrs.to_attributes());
                Ok(responses)
            }
            Err(error) => {
                self.emitter
                    .span_error(FETCH_SPAN, &error.to_string(), &attrs.to_attributes());
                Err(error)
            }
        }
    }
}
