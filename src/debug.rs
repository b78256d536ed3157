//! Orchestration of the prediction debug page.
//!
//! [`DebugHandler::display`] resolves a prediction job, runs the forecasting
//! engine's debug entrypoint for the job's first metric and lays the resulting
//! signals out as a page: the full history on its own, then the held-out
//! actual values overlaid with the forecast.

use charts::{compose, render_overlay, render_series, ChartError, ChartOverrides, Page};
use common::AlgorithmType;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::DebugError;
use crate::prediction::{
    DebugSignals, ForecastEngine, JobStore, MetricContext, PredictorManager, SelectorFetcher,
};

/// Engine time budget used unless configured otherwise.
pub const DEFAULT_ENGINE_TIMEOUT: Duration = Duration::from_secs(25);

/// Why a debug request was rejected without calling the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadRequestReason {
    MissingIdentifier,
    JobNotFound,
    NoMetrics,
    UnsupportedAlgorithm(AlgorithmType),
    MissingAlgorithmConfig,
}

impl fmt::Display for BadRequestReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadRequestReason::MissingIdentifier => f.write_str("namespace and name are required"),
            BadRequestReason::JobNotFound => f.write_str("prediction job not found"),
            BadRequestReason::NoMetrics => f.write_str("prediction job has no metrics"),
            BadRequestReason::UnsupportedAlgorithm(algorithm) => {
                write!(f, "algorithm '{algorithm}' has no debug view")
            }
            BadRequestReason::MissingAlgorithmConfig => f.write_str("dsp configuration is missing"),
        }
    }
}

/// Result of a debug request that did not fail in a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum DebugOutcome {
    BadRequest(BadRequestReason),
    Rendered(Page),
}

/// Produces debug pages from injected collaborators.
#[derive(Clone)]
pub struct DebugHandler {
    jobs: Arc<dyn JobStore>,
    predictors: Arc<PredictorManager>,
    selectors: Arc<dyn SelectorFetcher>,
    engine: Arc<dyn ForecastEngine>,
    engine_timeout: Duration,
}

impl fmt::Debug for DebugHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugHandler")
            .field("predictors", &self.predictors)
            .field("engine_timeout", &self.engine_timeout)
            .finish_non_exhaustive()
    }
}

impl DebugHandler {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        predictors: Arc<PredictorManager>,
        selectors: Arc<dyn SelectorFetcher>,
        engine: Arc<dyn ForecastEngine>,
    ) -> Self {
        Self {
            jobs,
            predictors,
            selectors,
            engine,
            engine_timeout: DEFAULT_ENGINE_TIMEOUT,
        }
    }

    pub fn with_engine_timeout(mut self, engine_timeout: Duration) -> Self {
        self.engine_timeout = engine_timeout;
        self
    }

    pub fn predictors(&self) -> &PredictorManager {
        &self.predictors
    }

    /// Builds the debug page of the prediction job `namespace/name`.
    ///
    /// Requests that cannot be served are answered with
    /// [`DebugOutcome::BadRequest`] before any engine work starts. Dropping the
    /// returned future cancels the engine call.
    #[instrument(skip(self))]
    pub async fn display(&self, namespace: &str, name: &str) -> Result<DebugOutcome, DebugError> {
        if namespace.is_empty() || name.is_empty() {
            return Ok(bad_request(BadRequestReason::MissingIdentifier));
        }

        let Some(job) = self.jobs.get(namespace, name).await? else {
            return Ok(bad_request(BadRequestReason::JobNotFound));
        };
        let Some(metric) = job.first_metric() else {
            return Ok(bad_request(BadRequestReason::NoMetrics));
        };
        let algorithm = metric.algorithm.algorithm_type;
        if algorithm != AlgorithmType::Dsp {
            return Ok(bad_request(BadRequestReason::UnsupportedAlgorithm(algorithm)));
        }
        if metric.algorithm.dsp.is_none() {
            return Ok(bad_request(BadRequestReason::MissingAlgorithmConfig));
        }

        let context = MetricContext::new(self.selectors.as_ref(), &job)?;
        let config = context.internal_config(metric)?;
        let namer = context.metric_namer(metric)?;
        let predictor = self
            .predictors
            .get_predictor(AlgorithmType::Dsp)
            .ok_or(DebugError::PredictorUnavailable(AlgorithmType::Dsp))?;

        debug!("Running engine debug for {}", namer);
        let signals = tokio::time::timeout(
            self.engine_timeout,
            self.engine.debug(predictor.as_ref(), &namer, &config),
        )
        .await
        .map_err(|_| DebugError::EngineTimeout(self.engine_timeout))??;

        let page = render_debug_page(signals)?;
        info!(
            "Rendered debug page for {}/{} with {} charts",
            namespace,
            name,
            page.charts().len()
        );
        Ok(DebugOutcome::Rendered(page))
    }
}

fn bad_request(reason: BadRequestReason) -> DebugOutcome {
    warn!("Rejecting debug request: {}", reason);
    DebugOutcome::BadRequest(reason)
}

/// Lays out the history chart followed by the actual/forecast overlay.
pub fn render_debug_page(signals: DebugSignals) -> Result<Page, ChartError> {
    let history = render_series(
        &signals.history,
        "history",
        "green",
        &ChartOverrides::default().title("history"),
    );
    let overlay = render_overlay(
        &[signals.test, signals.estimate],
        &["actual", "forecasted"],
        &ChartOverrides::default().title("actual/forecasted"),
    )?;

    Ok(compose(std::iter::once(history).chain(overlay)))
}
