use async_trait::async_trait;
use common::TimeSeriesPrediction;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Error types for job lookups
#[derive(Error, Debug)]
pub enum StoreError {
    /// The job document exists but could not be read
    #[error("Failed to read job file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The job document could not be parsed
    #[error("Failed to parse job file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The backing store could not be reached
    #[error("Job store unavailable: {0}")]
    Unavailable(String),
}

/// Source of prediction job definitions.
///
/// A job that does not exist is `Ok(None)`; errors are reserved for lookups
/// that could not be answered.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<TimeSeriesPrediction>, StoreError>;
}

/// Returns true when `component` can be used as a single path segment.
pub(crate) fn is_safe_component(component: &str) -> bool {
    !component.is_empty()
        && !component.starts_with('.')
        && !component.contains(['/', '\\', '\0'])
}

/// Reads jobs from `<root>/<namespace>/<name>.{yaml,yml,json}`.
#[derive(Debug, Clone)]
pub struct FileJobStore {
    root: PathBuf,
}

impl FileJobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn parse(path: &Path, content: &str) -> Result<TimeSeriesPrediction, StoreError> {
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let parsed = if is_json {
            serde_json::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(content).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| StoreError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }
}

#[async_trait]
impl JobStore for FileJobStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<TimeSeriesPrediction>, StoreError> {
        if !is_safe_component(namespace) || !is_safe_component(name) {
            warn!("Rejecting job lookup for unsafe identifier {}/{}", namespace, name);
            return Ok(None);
        }

        let dir = self.root.join(namespace);
        for extension in ["yaml", "yml", "json"] {
            let path = dir.join(format!("{name}.{extension}"));
            trace!("Looking for job at {}", path.display());

            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(source) => return Err(StoreError::Io { path, source }),
            };

            let mut job = Self::parse(&path, &content)?;
            if job.metadata.namespace.is_empty() {
                job.metadata.namespace = namespace.to_string();
            }
            if job.metadata.name.is_empty() {
                job.metadata.name = name.to_string();
            }
            debug!("Loaded job {}/{} from {}", namespace, name, path.display());
            return Ok(Some(job));
        }

        debug!("Job {}/{} not found under {}", namespace, name, self.root.display());
        Ok(None)
    }
}

/// Fixed set of jobs held in memory, keyed by their metadata.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobStore {
    jobs: HashMap<(String, String), TimeSeriesPrediction>,
}

impl InMemoryJobStore {
    pub fn new(jobs: impl IntoIterator<Item = TimeSeriesPrediction>) -> Self {
        let jobs = jobs
            .into_iter()
            .map(|job| {
                let key = (job.metadata.namespace.clone(), job.metadata.name.clone());
                (key, job)
            })
            .collect();
        Self { jobs }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<TimeSeriesPrediction>, StoreError> {
        Ok(self
            .jobs
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}
