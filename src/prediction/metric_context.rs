//! Conversion of a job's prediction metric into the engine's internal config.

use common::{
    DspAlgorithm, MetricType, PredictionMetric, TargetRef, TimeSeriesPrediction,
};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use super::selector::{SelectorError, SelectorFetcher};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Autocorrelation a candidate period needs when the job does not configure one.
pub const DEFAULT_MIN_CORRELATION: f64 = 0.6;

/// Error types for metric context construction and config conversion
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricContextError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("Invalid duration '{value}' for {field}")]
    InvalidDuration { field: &'static str, value: String },

    #[error("Invalid number '{value}' for {field}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Metric '{0}' has no DSP configuration")]
    MissingDsp(String),

    #[error("Metric '{metric}' of type {metric_type:?} has no query")]
    MissingQuery {
        metric: String,
        metric_type: MetricType,
    },

    #[error("History length {history:?} is shorter than the sample interval {interval:?}")]
    HistoryTooShort {
        history: Duration,
        interval: Duration,
    },
}

/// Estimators the DSP engine tries, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EstimatorConfig {
    /// Flat estimate at the historical maximum
    MaxValue { margin_fraction: f64 },
    /// Repeats the last period of the history. Periods are found by
    /// autocorrelation at the configured seasonal lags, not by a spectral
    /// transform; the name follows the job resource.
    Fft {
        margin_fraction: f64,
        min_correlation: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DspConfig {
    pub sample_interval: Duration,
    pub history_length: Duration,
    pub estimators: Vec<EstimatorConfig>,
    /// Candidate seasonal periods checked by the FFT estimator
    pub periods: Vec<Duration>,
}

/// Engine-side configuration of one prediction metric.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalConfig {
    pub metric_name: String,
    pub prediction_window: Duration,
    pub dsp: DspConfig,
}

/// Identifies the series of one metric of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricNamer {
    pub namespace: String,
    pub job: String,
    pub metric_name: String,
    pub metric_type: MetricType,
    pub query: String,
    pub selector: String,
}

impl MetricNamer {
    /// Stable key of the series, `<namespace>/<job>/<metric>`.
    pub fn series_key(&self) -> String {
        format!("{}/{}/{}", self.namespace, self.job, self.metric_name)
    }
}

impl fmt::Display for MetricNamer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}", self.query, self.selector)
    }
}

/// Everything about a job the metric conversions need.
#[derive(Debug, Clone)]
pub struct MetricContext {
    namespace: String,
    job: String,
    target: TargetRef,
    selector: String,
    prediction_window: Duration,
}

impl MetricContext {
    /// Builds the context of `job`, resolving its target selector.
    #[instrument(skip_all, fields(job = %job.metadata.name))]
    pub fn new(
        selectors: &dyn SelectorFetcher,
        job: &TimeSeriesPrediction,
    ) -> Result<Self, MetricContextError> {
        let mut target = job.spec.target_ref.clone();
        if target.namespace.is_empty() {
            target.namespace = job.metadata.namespace.clone();
        }
        let selector = selectors.fetch(&target)?;
        debug!("Resolved selector '{}'", selector);

        Ok(Self {
            namespace: job.metadata.namespace.clone(),
            job: job.metadata.name.clone(),
            target,
            selector,
            prediction_window: Duration::from_secs(job.spec.prediction_window_seconds),
        })
    }

    pub fn target(&self) -> &TargetRef {
        &self.target
    }

    /// Converts a DSP metric of the job into the engine's config.
    pub fn internal_config(
        &self,
        metric: &PredictionMetric,
    ) -> Result<InternalConfig, MetricContextError> {
        let dsp = metric
            .algorithm
            .dsp
            .as_ref()
            .ok_or_else(|| MetricContextError::MissingDsp(metric.resource_identifier.clone()))?;

        let prediction_window = if self.prediction_window.is_zero() {
            DAY
        } else {
            self.prediction_window
        };

        Ok(InternalConfig {
            metric_name: metric.resource_identifier.clone(),
            prediction_window,
            dsp: convert_dsp(dsp)?,
        })
    }

    /// Names the series the metric is computed from.
    pub fn metric_namer(&self, metric: &PredictionMetric) -> Result<MetricNamer, MetricContextError> {
        let query = match metric.metric_type {
            MetricType::ResourceQuery => metric.resource_query.clone(),
            MetricType::ExpressionQuery => {
                metric.expression_query.as_ref().map(|q| q.expression.clone())
            }
            MetricType::RawQuery => metric.raw_query.as_ref().map(|q| q.expression.clone()),
        }
        .filter(|q| !q.is_empty())
        .ok_or_else(|| MetricContextError::MissingQuery {
            metric: metric.resource_identifier.clone(),
            metric_type: metric.metric_type,
        })?;

        Ok(MetricNamer {
            namespace: self.namespace.clone(),
            job: self.job.clone(),
            metric_name: metric.resource_identifier.clone(),
            metric_type: metric.metric_type,
            query,
            selector: self.selector.clone(),
        })
    }
}

fn convert_dsp(dsp: &DspAlgorithm) -> Result<DspConfig, MetricContextError> {
    let sample_interval = parse_duration("sampleInterval", &dsp.sample_interval)?;
    let history_length = parse_duration("historyLength", &dsp.history_length)?;
    if history_length < sample_interval {
        return Err(MetricContextError::HistoryTooShort {
            history: history_length,
            interval: sample_interval,
        });
    }

    let mut estimators = Vec::new();
    for fft in &dsp.estimators.fft {
        estimators.push(EstimatorConfig::Fft {
            margin_fraction: parse_fraction("fft.marginFraction", &fft.margin_fraction, 0.0)?,
            min_correlation: parse_fraction(
                "fft.minCorrelation",
                &fft.min_correlation,
                DEFAULT_MIN_CORRELATION,
            )?,
        });
    }
    for max_value in &dsp.estimators.max_value {
        estimators.push(EstimatorConfig::MaxValue {
            margin_fraction: parse_fraction(
                "maxValue.marginFraction",
                &max_value.margin_fraction,
                0.0,
            )?,
        });
    }
    if estimators.is_empty() {
        estimators.push(EstimatorConfig::Fft {
            margin_fraction: 0.0,
            min_correlation: DEFAULT_MIN_CORRELATION,
        });
    }

    Ok(DspConfig {
        sample_interval,
        history_length,
        estimators,
        periods: vec![DAY, WEEK],
    })
}

fn parse_fraction(
    field: &'static str,
    value: &str,
    default: f64,
) -> Result<f64, MetricContextError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(default);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MetricContextError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Parses durations such as `30s`, `15m`, `1h30m` or `15d` into a non-zero `Duration`.
pub fn parse_duration(field: &'static str, value: &str) -> Result<Duration, MetricContextError> {
    let invalid = || MetricContextError::InvalidDuration {
        field,
        value: value.to_string(),
    };

    let mut rest = value.trim();
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(invalid());
        }
        let amount: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit_secs = match &rest[..unit_len] {
            "s" => 1,
            "m" => 60,
            "h" => 60 * 60,
            "d" => 24 * 60 * 60,
            "w" => 7 * 24 * 60 * 60,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];

        let secs = amount.checked_mul(unit_secs).ok_or_else(invalid)?;
        total = total
            .checked_add(Duration::from_secs(secs))
            .ok_or_else(invalid)?;
    }

    if total.is_zero() {
        return Err(invalid());
    }
    Ok(total)
}
