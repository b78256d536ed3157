use async_trait::async_trait;
use common::{Signal, SignalError};
use thiserror::Error;

use super::metric_context::{InternalConfig, MetricNamer};
use super::predictor::{Predictor, PredictorError};

/// Error types for the forecasting engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("History query failed: {0}")]
    Predictor(#[from] PredictorError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error("Not enough history to evaluate a forecast: {samples} samples")]
    InsufficientHistory { samples: usize },

    #[error("Estimation task failed: {0}")]
    Task(String),

    #[error("Estimation was abandoned by its caller")]
    Cancelled,
}

/// The three signals behind a debug view of a forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugSignals {
    /// Everything the predictor returned
    pub history: Signal,
    /// Held-out tail of the history the forecast is compared against
    pub test: Signal,
    /// Forecast over the same span as `test`
    pub estimate: Signal,
}

/// Forecasting engine exposing its debug entrypoint.
#[async_trait]
pub trait ForecastEngine: Send + Sync {
    async fn debug(
        &self,
        predictor: &dyn Predictor,
        namer: &MetricNamer,
        config: &InternalConfig,
    ) -> Result<DebugSignals, EngineError>;
}
