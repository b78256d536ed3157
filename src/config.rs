use anyhow::{Context, Result};
use common::AlgorithmType;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::debug::{DebugHandler, DEFAULT_ENGINE_TIMEOUT};
use crate::prediction::{
    DspEngine, FileJobStore, PredictorManager, RecordedPredictor, TargetRefSelectorFetcher,
};
use crate::schemas::AppState;

/// Request budget applied by the router's timeout layer.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration of the debug service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Root of the prediction job definitions
    pub jobs_dir: PathBuf,
    /// Root of the recorded metric history
    pub history_dir: PathBuf,
    /// Time budget of one forecast engine call
    pub engine_timeout: Duration,
    /// Time budget of one HTTP request
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            jobs_dir: PathBuf::from("./jobs"),
            history_dir: PathBuf::from("./history"),
            engine_timeout: DEFAULT_ENGINE_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// Checks the configured directories, warning about missing ones.
    pub fn check(&self) -> Result<()> {
        for (what, dir) in [("jobs", &self.jobs_dir), ("history", &self.history_dir)] {
            match std::fs::metadata(dir) {
                Ok(meta) if !meta.is_dir() => {
                    anyhow::bail!("{} path {} is not a directory", what, dir.display());
                }
                Ok(_) => debug!("Using {} directory {}", what, dir.display()),
                Err(_) => warn!("{} directory {} does not exist yet", what, dir.display()),
            }
        }
        if self.engine_timeout.is_zero() {
            anyhow::bail!("engine timeout must be greater than zero");
        }
        // The router's timeout layer answers 408 with no body, so the engine must give up first.
        if self.engine_timeout >= self.request_timeout {
            anyhow::bail!(
                "engine timeout ({:?}) must be shorter than the request timeout ({:?})",
                self.engine_timeout,
                self.request_timeout
            );
        }
        Ok(())
    }
}

/// Wire the default file backed collaborators into a debug handler
pub fn build_debug_handler(config: &AppConfig) -> DebugHandler {
    let predictors = PredictorManager::new().with_predictor(
        AlgorithmType::Dsp,
        Arc::new(RecordedPredictor::new(&config.history_dir)),
    );

    DebugHandler::new(
        Arc::new(FileJobStore::new(&config.jobs_dir)),
        Arc::new(predictors),
        Arc::new(TargetRefSelectorFetcher),
        Arc::new(DspEngine::new()),
    )
    .with_engine_timeout(config.engine_timeout)
}

/// Initialize application configuration and state
pub fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    config.check().context("Invalid configuration")?;
    info!(
        "Serving jobs from {} with history from {}",
        config.jobs_dir.display(),
        config.history_dir.display()
    );

    Ok(AppState {
        debug: Arc::new(build_debug_handler(config)),
        request_timeout: config.request_timeout,
    })
}
