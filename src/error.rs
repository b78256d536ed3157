use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use charts::ChartError;
use common::AlgorithmType;
use std::time::Duration;
use thiserror::Error;

use crate::prediction::{EngineError, MetricContextError, StoreError};
use crate::schemas::ErrorResponse;

/// Backend failures while producing a debug page
#[derive(Error, Debug)]
pub enum DebugError {
    #[error("Job lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to build metric context: {0}")]
    MetricContext(#[from] MetricContextError),

    #[error("No predictor registered for algorithm '{0}'")]
    PredictorUnavailable(AlgorithmType),

    #[error("Forecast engine failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Forecast engine did not answer within {0:?}")]
    EngineTimeout(Duration),

    #[error("Failed to render chart: {0}")]
    Chart(#[from] ChartError),

    #[error("Failed to write debug page: {0}")]
    PageRender(#[source] std::io::Error),
}

impl DebugError {
    /// Stable machine readable code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            DebugError::Store(_) => "JOB_LOOKUP_ERROR",
            DebugError::MetricContext(_) => "METRIC_CONTEXT_ERROR",
            DebugError::PredictorUnavailable(_) => "PREDICTOR_UNAVAILABLE",
            DebugError::Engine(_) => "ENGINE_ERROR",
            DebugError::EngineTimeout(_) => "ENGINE_TIMEOUT",
            DebugError::Chart(_) => "CHART_RENDER_ERROR",
            DebugError::PageRender(_) => "PAGE_RENDER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DebugError::EngineTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DebugError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            success: false,
        };
        (self.status(), Json(body)).into_response()
    }
}
