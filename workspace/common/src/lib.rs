//! Common domain types shared between the debug service and the chart crate.
//! `Signal` is what the forecasting engine produces; the `job` types mirror the
//! prediction job resource the service reads from its job store.

mod job;
mod signal;

pub use job::{
    Algorithm, AlgorithmType, DspAlgorithm, Estimators, ExpressionQuery, FftEstimator,
    MaxValueEstimator, MetricType, ObjectMeta, PercentileAlgorithm, PredictionMetric, TargetRef,
    TimeSeriesPrediction, TimeSeriesPredictionSpec,
};
pub use signal::{Signal, SignalError};
