use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{instrument, trace};
use crate::schemas::{AppState, HealthResponse};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 500, description = "Service is unhealthy", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    trace!("Entering health_check function");

    let predictors = state
        .debug
        .predictors()
        .algorithms()
        .into_iter()
        .map(|algorithm| algorithm.to_string())
        .collect();

    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        predictors,
    };

    Ok(Json(response))
}
