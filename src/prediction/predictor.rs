use async_trait::async_trait;
use common::AlgorithmType;
use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

use super::metric_context::MetricNamer;
use super::store::is_safe_component;

/// Error types for history queries
#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("No recorded history for {0}")]
    NoData(String),

    #[error("Series key '{0}' cannot be mapped to a history file")]
    InvalidKey(String),

    #[error("Failed to parse history file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to read history file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of the historical samples of a metric.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Returns the most recent `history_length / sample_interval` samples, oldest first.
    async fn query_history(
        &self,
        namer: &MetricNamer,
        history_length: Duration,
        sample_interval: Duration,
    ) -> Result<Vec<f64>, PredictorError>;
}

/// Registry of predictors by algorithm type.
#[derive(Clone, Default)]
pub struct PredictorManager {
    predictors: HashMap<AlgorithmType, Arc<dyn Predictor>>,
}

impl fmt::Debug for PredictorManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictorManager")
            .field("algorithms", &self.algorithms())
            .finish()
    }
}

impl PredictorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predictor(mut self, algorithm: AlgorithmType, predictor: Arc<dyn Predictor>) -> Self {
        self.predictors.insert(algorithm, predictor);
        self
    }

    pub fn get_predictor(&self, algorithm: AlgorithmType) -> Option<Arc<dyn Predictor>> {
        self.predictors.get(&algorithm).cloned()
    }

    /// Registered algorithm types, sorted by name.
    pub fn algorithms(&self) -> Vec<AlgorithmType> {
        let mut algorithms: Vec<_> = self.predictors.keys().copied().collect();
        algorithms.sort_by_key(|a| a.to_string());
        algorithms
    }
}

/// Number of samples covering `history_length` at `sample_interval`, at least one.
pub fn sample_count(history_length: Duration, sample_interval: Duration) -> usize {
    if sample_interval.is_zero() {
        return 1;
    }
    let count = history_length.as_secs_f64() / sample_interval.as_secs_f64();
    (count.ceil() as usize).max(1)
}

/// Serves history recorded as JSON arrays under
/// `<root>/<namespace>/<job>/<metric>.json`.
#[derive(Debug, Clone)]
pub struct RecordedPredictor {
    root: PathBuf,
}

impl RecordedPredictor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn history_path(&self, namer: &MetricNamer) -> Result<PathBuf, PredictorError> {
        let components = [&namer.namespace, &namer.job, &namer.metric_name];
        if !components.iter().all(|c| is_safe_component(c)) {
            return Err(PredictorError::InvalidKey(namer.series_key()));
        }
        Ok(self
            .root
            .join(&namer.namespace)
            .join(&namer.job)
            .join(format!("{}.json", namer.metric_name)))
    }
}

#[async_trait]
impl Predictor for RecordedPredictor {
    async fn query_history(
        &self,
        namer: &MetricNamer,
        history_length: Duration,
        sample_interval: Duration,
    ) -> Result<Vec<f64>, PredictorError> {
        let path = self.history_path(namer)?;
        trace!("Reading history from {}", path.display());

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PredictorError::NoData(namer.series_key()));
            }
            Err(source) => return Err(PredictorError::Io { path, source }),
        };

        let samples: Vec<f64> =
            serde_json::from_str(&content).map_err(|e| PredictorError::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?;
        if samples.is_empty() {
            return Err(PredictorError::NoData(namer.series_key()));
        }

        let wanted = sample_count(history_length, sample_interval);
        let skip = samples.len().saturating_sub(wanted);
        debug!(
            "Loaded {} of {} recorded samples for {}",
            samples.len() - skip,
            samples.len(),
            namer.series_key()
        );
        Ok(samples.into_iter().skip(skip).collect())
    }
}
