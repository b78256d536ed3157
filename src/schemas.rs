use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

use crate::debug::DebugHandler;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Debug page orchestrator with its collaborators
    pub debug: Arc<DebugHandler>,
    /// Upper bound on the time spent serving one request
    pub request_timeout: Duration,
}

/// Path parameters identifying a prediction job
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct DebugPathParams {
    /// Namespace of the prediction job
    #[validate(length(min = 1))]
    pub namespace: String,
    /// Name of the prediction job
    #[validate(length(min = 1))]
    pub name: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Algorithms with a registered predictor
    pub predictors: Vec<String>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::prediction::display_debug_page,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "prediction", description = "Prediction debug endpoints"),
    ),
    info(
        title = "tspdebug API",
        description = "Forecast debug visualization for time series prediction jobs",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
