#[cfg(test)]
mod integration_tests {
    use crate::debug::{BadRequestReason, DebugHandler, DebugOutcome};
    use crate::prediction::{
        FileJobStore, PredictorManager, RecordedPredictor, TargetRefSelectorFetcher,
    };
    use crate::router::create_router;
    use crate::schemas::{AppState, ErrorResponse, HealthResponse};
    use crate::test_utils::test_utils::{
        init_test_tracing, sample_signals, setup_test_app, setup_test_context,
        setup_test_context_with, test_jobs, CountingJobStore, EngineBehaviour, FakeEngine,
        ARIMA_JOB_YAML,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use common::{AlgorithmType, Signal};
    use std::sync::Arc;
    use std::time::Duration;

    const DEBUG_PATH: &str = "/api/v1/prediction/debug";

    #[tokio::test]
    async fn test_health_check() {
        let _guard = init_test_tracing();
        let server = TestServer::new(setup_test_app()).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.predictors, vec!["dsp"]);
    }

    #[tokio::test]
    async fn test_debug_page_is_rendered() {
        let _guard = init_test_tracing();
        let context = setup_test_context(EngineBehaviour::Signals(sample_signals()));
        let server = TestServer::new(context.app).unwrap();

        let response = server.get(&format!("{DEBUG_PATH}/default/web-cpu")).await;

        response.assert_status(StatusCode::OK);
        let content_type = response.header("content-type");
        assert_eq!(content_type.to_str().unwrap(), "text/html; charset=utf-8");

        let html = response.text();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert_eq!(html.matches("<svg ").count(), 2);
        assert!(html.contains("<h2>history</h2>"));
        assert!(html.contains("<h2>actual/forecasted</h2>"));
        assert!(html.find("<h2>history</h2>") < html.find("<h2>actual/forecasted</h2>"));
        assert_eq!(context.engine.calls(), 1);
    }

    #[tokio::test]
    async fn test_debug_page_is_deterministic() {
        let context = setup_test_context(EngineBehaviour::Signals(sample_signals()));
        let server = TestServer::new(context.app).unwrap();

        let first = server.get(&format!("{DEBUG_PATH}/default/web-cpu")).await.text();
        let second = server.get(&format!("{DEBUG_PATH}/default/web-cpu")).await.text();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unsupported_algorithm_is_bad_request_without_engine_call() {
        let context = setup_test_context(EngineBehaviour::Signals(sample_signals()));
        let engine = context.engine.clone();
        let server = TestServer::new(context.app).unwrap();

        let response = server.get(&format!("{DEBUG_PATH}/default/web-p99")).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().is_empty());
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_jobs_are_bad_requests() {
        let context = setup_test_context(EngineBehaviour::Signals(sample_signals()));
        let engine = context.engine.clone();
        let server = TestServer::new(context.app).unwrap();

        for name in ["missing", "web-empty", "web-nodsp", "web-arima"] {
            let response = server.get(&format!("{DEBUG_PATH}/default/{name}")).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert!(response.text().is_empty(), "body for {name} should be empty");
        }
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_request_reasons() {
        let context = setup_test_context(EngineBehaviour::Signals(sample_signals()));
        let handler = &context.handler;

        let cases = [
            ("missing", BadRequestReason::JobNotFound),
            ("web-empty", BadRequestReason::NoMetrics),
            ("web-nodsp", BadRequestReason::MissingAlgorithmConfig),
            (
                "web-p99",
                BadRequestReason::UnsupportedAlgorithm(AlgorithmType::Percentile),
            ),
            (
                "web-arima",
                BadRequestReason::UnsupportedAlgorithm(AlgorithmType::Unsupported),
            ),
        ];
        for (name, reason) in cases {
            assert_eq!(
                handler.display("default", name).await.unwrap(),
                DebugOutcome::BadRequest(reason)
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_algorithm_family_from_job_file_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("default")).unwrap();
        std::fs::write(dir.path().join("default/web-arima.yaml"), ARIMA_JOB_YAML).unwrap();

        let engine = Arc::new(FakeEngine::new(EngineBehaviour::Signals(sample_signals())));
        let predictors = PredictorManager::new().with_predictor(
            AlgorithmType::Dsp,
            Arc::new(RecordedPredictor::new(dir.path().join("history"))),
        );
        let handler = Arc::new(DebugHandler::new(
            Arc::new(FileJobStore::new(dir.path())),
            Arc::new(predictors),
            Arc::new(TargetRefSelectorFetcher),
            engine.clone(),
        ));
        let server = TestServer::new(create_router(AppState {
            debug: handler,
            request_timeout: Duration::from_secs(30),
        }))
        .unwrap();

        let response = server.get(&format!("{DEBUG_PATH}/default/web-arima")).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().is_empty());
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_identifiers_skip_job_lookup() {
        let context = setup_test_context(EngineBehaviour::Signals(sample_signals()));

        for (namespace, name) in [("", "web-cpu"), ("default", ""), ("", "")] {
            let outcome = context.handler.display(namespace, name).await.unwrap();
            assert_eq!(
                outcome,
                DebugOutcome::BadRequest(BadRequestReason::MissingIdentifier)
            );
        }
        assert_eq!(context.store.calls(), 0);
        assert_eq!(context.engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_structured_error() {
        let context = setup_test_context_with(
            CountingJobStore::failing(),
            EngineBehaviour::Signals(sample_signals()),
            Duration::from_secs(5),
        );
        let server = TestServer::new(context.app).unwrap();

        let response = server.get(&format!("{DEBUG_PATH}/default/web-cpu")).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "JOB_LOOKUP_ERROR");
        assert!(!body.success);
        assert_eq!(context.engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_metric_config_is_structured_error() {
        let context = setup_test_context(EngineBehaviour::Signals(sample_signals()));
        let server = TestServer::new(context.app).unwrap();

        let response = server.get(&format!("{DEBUG_PATH}/default/web-bad")).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "METRIC_CONTEXT_ERROR");
        assert!(body.error.contains("soon"));
    }

    #[tokio::test]
    async fn test_engine_failure_is_structured_error() {
        let context = setup_test_context(EngineBehaviour::Fail);
        let server = TestServer::new(context.app).unwrap();

        let response = server.get(&format!("{DEBUG_PATH}/default/web-cpu")).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "ENGINE_ERROR");
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_engine_timeout_is_gateway_timeout() {
        let context = setup_test_context_with(
            CountingJobStore::new(test_jobs()),
            EngineBehaviour::Sleep(Duration::from_secs(10)),
            Duration::from_millis(50),
        );
        let server = TestServer::new(context.app).unwrap();

        let response = server.get(&format!("{DEBUG_PATH}/default/web-cpu")).await;

        response.assert_status(StatusCode::GATEWAY_TIMEOUT);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "ENGINE_TIMEOUT");
    }

    #[tokio::test]
    async fn test_misaligned_signals_are_chart_error() {
        let mut signals = sample_signals();
        signals.estimate = Signal::new(vec![1.0, 2.0], 1.0).unwrap();
        let context = setup_test_context(EngineBehaviour::Signals(signals));
        let server = TestServer::new(context.app).unwrap();

        let response = server.get(&format!("{DEBUG_PATH}/default/web-cpu")).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "CHART_RENDER_ERROR");
    }

    #[tokio::test]
    async fn test_rendered_page_matches_direct_call() {
        let context = setup_test_context(EngineBehaviour::Signals(sample_signals()));
        let direct = match context.handler.display("default", "web-cpu").await.unwrap() {
            DebugOutcome::Rendered(page) => page.to_html().unwrap(),
            other => panic!("expected a rendered page, got {:?}", other),
        };
        let server = TestServer::new(context.app).unwrap();

        let served = server.get(&format!("{DEBUG_PATH}/default/web-cpu")).await.text();
        assert_eq!(direct, served);
    }
}
