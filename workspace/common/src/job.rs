//! Prediction job resource as stored by the job store.
//!
//! Field names follow the camelCase layout of the stored documents, e.g.
//!
//! ```yaml
//! metadata:
//!   namespace: default
//!   name: web-cpu
//! spec:
//!   targetRef: { kind: Deployment, namespace: default, name: web }
//!   predictionWindowSeconds: 3600
//!   predictionMetrics:
//!     - resourceIdentifier: cpu
//!       type: ResourceQuery
//!       resourceQuery: cpu
//!       algorithm:
//!         algorithmType: dsp
//!         dsp:
//!           sampleInterval: 60s
//!           historyLength: 15d
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a stored resource
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub namespace: String,
    pub name: String,
}

/// A time series prediction job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPrediction {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: TimeSeriesPredictionSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPredictionSpec {
    /// Workload whose metrics are predicted
    pub target_ref: TargetRef,
    /// How far ahead the job forecasts
    #[serde(default)]
    pub prediction_window_seconds: u64,
    /// Metrics to predict; only the first one is used by the debug view
    #[serde(default)]
    pub prediction_metrics: Vec<PredictionMetric>,
}

/// Reference to the workload a job targets
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    pub name: String,
}

/// How a metric's series is selected from the metric source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricType {
    ResourceQuery,
    ExpressionQuery,
    RawQuery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionQuery {
    pub expression: String,
}

/// One metric to predict and the algorithm that predicts it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionMetric {
    pub resource_identifier: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_query: Option<ExpressionQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_query: Option<ExpressionQuery>,
    pub algorithm: Algorithm,
}

/// Forecasting algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmType {
    Dsp,
    Percentile,
    /// Any family this service does not know by name
    #[serde(other)]
    Unsupported,
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmType::Dsp => f.write_str("dsp"),
            AlgorithmType::Percentile => f.write_str("percentile"),
            AlgorithmType::Unsupported => f.write_str("unsupported"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Algorithm {
    pub algorithm_type: AlgorithmType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsp: Option<DspAlgorithm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile: Option<PercentileAlgorithm>,
}

/// Configuration of the DSP algorithm. Durations are strings such as `60s` or `15d`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DspAlgorithm {
    #[serde(default = "default_sample_interval")]
    pub sample_interval: String,
    #[serde(default = "default_history_length")]
    pub history_length: String,
    #[serde(default)]
    pub estimators: Estimators,
}

fn default_sample_interval() -> String {
    "60s".to_string()
}

fn default_history_length() -> String {
    "15d".to_string()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimators {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub max_value: Vec<MaxValueEstimator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fft: Vec<FftEstimator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxValueEstimator {
    /// Fraction added on top of the estimate, e.g. `"0.15"`
    #[serde(default)]
    pub margin_fraction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FftEstimator {
    #[serde(default)]
    pub margin_fraction: String,
    /// Minimum autocorrelation for a period to count as detected, e.g. `"0.6"`
    #[serde(default)]
    pub min_correlation: String,
}

/// Configuration of the percentile algorithm. Not rendered by the debug view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileAlgorithm {
    #[serde(default)]
    pub sample_interval: String,
    #[serde(default)]
    pub percentile: String,
    #[serde(default)]
    pub margin_fraction: String,
}

impl TimeSeriesPrediction {
    /// First configured prediction metric, the only one the debug view consults.
    pub fn first_metric(&self) -> Option<&PredictionMetric> {
        self.spec.prediction_metrics.first()
    }
}
