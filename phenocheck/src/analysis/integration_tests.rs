//! End-to-end tests for analysis runs.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::analysis::{Analyzer, CustomRequest, PhenologyRequest};
    use crate::config::AnalysisConfig;
    use crate::diagnostics::{AnalysisMode, NdviBand, VigorStatus};
    use crate::errors::{FetchError, FetchTarget, MergeInconsistencyError, PhenocheckError, ValidationError};
    use crate::fetch::MockObservationSource;
    use crate::observations::{ClimateResponse, NdviResponse};
    use crate::observability::NoOpTracingEmitter;
    use crate::periods::{CustomPeriodInput, PeriodKey};
    use crate::testing::{
        assert_stage_codes, assert_statuses, fixed_clock, ndvi_response, sample_region,
        soybean_store, uniform_climate_response, FakeObservationSource, SOYBEAN_ID,
    };
    use pretty_assertions::assert_eq;

    fn key(n: usize) -> PeriodKey {
        PeriodKey::new(n).unwrap()
    }

    fn analyzer(source: Arc<FakeObservationSource>) -> Analyzer<Arc<FakeObservationSource>> {
        Analyzer::new(source, Arc::new(soybean_store()))
            .with_clock(fixed_clock(2025, 3, 1))
            .with_emitter(Arc::new(NoOpTracingEmitter))
    }

    fn soybean_request() -> PhenologyRequest {
        PhenologyRequest::new(SOYBEAN_ID, "2025-01-01", sample_region())
    }

    fn custom_request() -> CustomRequest {
        CustomRequest::new(
            vec![
                CustomPeriodInput::new("2024-01-01", "2024-01-15"),
                CustomPeriodInput::new("2024-02-01", "2024-02-15"),
                CustomPeriodInput::new("2024-03-01", "2024-03-15"),
            ],
            sample_region(),
        )
    }

    #[tokio::test]
    async fn test_soybean_run_end_to_end() {
        let source = Arc::new(
            FakeObservationSource::new()
                .with_ndvi(ndvi_response(&[Some(0.5), Some(0.6), Some(0.95), None]))
                .with_climate(uniform_climate_response(4, 24.0, 80.0)),
        );
        let result = analyzer(Arc::clone(&source))
            .run_phenology(&soybean_request())
            .await
            .unwrap();

        assert_stage_codes(&result.periods, &["VE", "V1", "R1", "R5"]);
        assert_statuses(
            &result.report,
            &[
                VigorStatus::Normal,
                VigorStatus::Normal,
                VigorStatus::Exceptional,
                VigorStatus::Unavailable,
            ],
        );
        assert_eq!(
            result.report.mode,
            AnalysisMode::Phenology {
                crop_id: SOYBEAN_ID.to_string()
            }
        );
        assert_eq!(result.report.run_id, result.run_id);
        assert_eq!(result.report.generated_on.to_string(), "2025-03-01");
        assert_eq!(result.report.entries[0].climate_text(), "24.0°C / 80.0mm");
        assert!(result.report.warnings.is_empty());

        let ndvi_requests = source.ndvi_requests();
        assert_eq!(ndvi_requests.len(), 1);
        assert_eq!(ndvi_requests[0].period_count(), 4);
        assert_eq!(
            ndvi_requests[0].windows.get("start_date_period_1").map(String::as_str),
            Some("2025-01-02")
        );
        let climate_requests = source.climate_requests();
        assert_eq!(climate_requests[0].date_periods.len(), 4);
        assert_eq!(climate_requests[0].point.coordinates, [-46.5, -14.5]);
    }

    #[tokio::test]
    async fn test_custom_run() {
        let source = Arc::new(
            FakeObservationSource::new().with_ndvi(ndvi_response(&[Some(0.75), Some(0.5), Some(0.2)])),
        );
        let result = analyzer(source).run_custom(&custom_request()).await.unwrap();

        assert_eq!(result.report.mode, AnalysisMode::Custom);
        assert_eq!(result.report.layer_names(), vec!["Period 1", "Period 2", "Period 3"]);
        assert!(result
            .report
            .entries
            .iter()
            .all(|e| e.status == VigorStatus::Informational && e.expected_ndvi.is_none()));
        let bands: Vec<_> = result.report.entries.iter().map(|e| e.ndvi_band).collect();
        assert_eq!(
            bands,
            vec![Some(NdviBand::High), Some(NdviBand::Medium), Some(NdviBand::Low)]
        );
        assert_eq!(result.report.ndvi_text(&result.report.entries[1]), "0.500");
        assert_eq!(result.report.entries[0].climate_text(), "N/D");
    }

    #[tokio::test]
    async fn test_missing_period_key_is_unavailable() {
        let ndvi = NdviResponse::default()
            .with_mean(key(1), Some(0.5))
            .with_mean(key(3), Some(0.7));
        let source = Arc::new(FakeObservationSource::new().with_ndvi(ndvi));
        let result = analyzer(source).run_custom(&custom_request()).await.unwrap();

        let entries = &result.report.entries;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].status, VigorStatus::Unavailable);
        assert_eq!(entries[1].observed_ndvi_text(3), "N/D");
        assert_eq!(entries[2].observed_ndvi, Some(0.7));
        assert_eq!(
            result.report.chart_series().observed_ndvi,
            vec![Some(0.5), None, Some(0.7)]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_the_run() {
        let source = Arc::new(
            FakeObservationSource::new()
                .with_ndvi(ndvi_response(&[Some(0.5)]))
                .failing_climate("503 Service Unavailable"),
        );
        let err = analyzer(source)
            .run_phenology(&soybean_request())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PhenocheckError::Fetch(FetchError::Transport {
                target: FetchTarget::Climate,
                ..
            })
        ));
        assert_eq!(err.error_info().code, "PHENO-FETCH-TRANSPORT");
    }

    #[tokio::test]
    async fn test_joint_fetch_timeout() {
        let source = Arc::new(FakeObservationSource::new().with_delay(Duration::from_millis(500)));
        let err = analyzer(source)
            .with_config(AnalysisConfig::new().with_fetch_timeout(0.05))
            .run_custom(&custom_request())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PhenocheckError::Fetch(FetchError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_input_errors_issue_no_fetch() {
        let source = Arc::new(FakeObservationSource::new());
        let analyzer = analyzer(Arc::clone(&source));

        let err = analyzer
            .run_phenology(&PhenologyRequest::new("", "2025-01-01", sample_region()))
            .await
            .unwrap_err();
        assert!(matches!(err, PhenocheckError::Validation(ValidationError::MissingCrop)));

        let err = analyzer
            .run_phenology(&PhenologyRequest::new("oryza_sativa", "2025-01-01", sample_region()))
            .await
            .unwrap_err();
        assert!(matches!(err, PhenocheckError::Lookup(_)));

        let err = analyzer
            .run_phenology(&PhenologyRequest::new(SOYBEAN_ID, "2025-06-01", sample_region()))
            .await
            .unwrap_err();
        assert!(matches!(err, PhenocheckError::EmptyResult(_)));
        assert!(err.is_input_error());

        let err = analyzer
            .run_custom(&CustomRequest::new(Vec::new(), sample_region()))
            .await
            .unwrap_err();
        assert!(matches!(err, PhenocheckError::Validation(ValidationError::NoCustomPeriods)));

        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unusable_region_issues_no_fetch() {
        let source = Arc::new(FakeObservationSource::new());
        let request = PhenologyRequest::new(
            SOYBEAN_ID,
            "2025-01-01",
            crate::fetch::RegionOfInterest::polygon(Vec::new()),
        );
        let err = analyzer(Arc::clone(&source))
            .run_phenology(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, PhenocheckError::Fetch(FetchError::InvalidRegion(_))));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unexpected_keys_warn_by_default() {
        let ndvi = ndvi_response(&[Some(0.5), Some(0.5), Some(0.5), Some(0.9)]);
        let source = Arc::new(FakeObservationSource::new().with_ndvi(ndvi));
        let result = analyzer(source).run_custom(&custom_request()).await.unwrap();

        assert_eq!(result.report.len(), 3);
        assert_eq!(result.report.warnings.len(), 1);
        assert!(result.report.warnings[0].contains("period_4"));
    }

    #[tokio::test]
    async fn test_unexpected_keys_fail_in_strict_mode() {
        let ndvi = ndvi_response(&[Some(0.5), Some(0.5), Some(0.5), Some(0.9)]);
        let source = Arc::new(FakeObservationSource::new().with_ndvi(ndvi));
        let err = analyzer(source)
            .with_config(AnalysisConfig::new().with_strict_merge(true))
            .run_custom(&custom_request())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PhenocheckError::MergeInconsistency(MergeInconsistencyError::UnexpectedKeys { .. })
        ));
    }

    #[tokio::test]
    async fn test_runs_are_independent() {
        let source = Arc::new(FakeObservationSource::new().with_ndvi(ndvi_response(&[Some(0.5)])));
        let analyzer = analyzer(source);
        let first = soybean_request();
        let second = soybean_request();

        let (a, b) = tokio::join!(analyzer.run_phenology(&first), analyzer.run_phenology(&second));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.run_id, b.run_id);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.report.entries, b.report.entries);
    }

    #[tokio::test]
    async fn test_tiles_reach_the_report() {
        let mut ndvi = ndvi_response(&[Some(0.5), Some(0.6), Some(0.7)]);
        ndvi.ndvi_tiles.insert(
            "period_2".to_string(),
            serde_json::json!({ "tile_url": "https://tiles.example/{z}/{x}/{y}" }),
        );
        let source = Arc::new(FakeObservationSource::new().with_ndvi(ndvi));
        let result = analyzer(source).run_custom(&custom_request()).await.unwrap();

        assert!(result.report.entries[0].tile.is_none());
        assert_eq!(
            result.report.entries[1].tile.as_ref().and_then(|t| t["tile_url"].as_str()),
            Some("https://tiles.example/{z}/{x}/{y}")
        );
    }

    #[tokio::test]
    async fn test_each_service_is_called_once() {
        let mut mock = MockObservationSource::new();
        mock.expect_fetch_ndvi()
            .withf(|request| request.period_count() == 4)
            .times(1)
            .returning(|_| Ok(ndvi_response(&[Some(0.4), Some(0.4), Some(0.4), Some(0.4)])));
        mock.expect_fetch_climate()
            .withf(|request| request.date_periods.len() == 4)
            .times(1)
            .returning(|_| Ok(ClimateResponse::default()));

        let result = Analyzer::new(mock, Arc::new(soybean_store()))
            .with_clock(fixed_clock(2025, 3, 1))
            .run_phenology(&soybean_request())
            .await
            .unwrap();

        assert_eq!(result.report.status_counts().get(&VigorStatus::Normal), Some(&4));
    }
}
