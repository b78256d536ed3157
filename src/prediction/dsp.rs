//! Periodicity based forecasting over recorded history.
//!
//! The history is split into a training part and a held-out tail covering the
//! prediction window. The tail is forecast from the training part alone so the
//! debug view can put the forecast next to what actually happened.

use async_trait::async_trait;
use common::Signal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, trace};

use super::engine::{DebugSignals, EngineError, ForecastEngine};
use super::metric_context::{DspConfig, EstimatorConfig, InternalConfig, MetricNamer};
use super::predictor::{sample_count, Predictor};

/// Engine evaluating the DSP estimators of a metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct DspEngine;

impl DspEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Raises its flag when dropped.
///
/// Held by the future awaiting a blocking estimation, so a timed out or
/// disconnected request stops the estimation at its next check.
#[derive(Debug, Default)]
struct CancelOnDrop(Arc<AtomicBool>);

impl CancelOnDrop {
    fn flag(&self) -> Arc<AtomicBool> {
        self.0.clone()
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl ForecastEngine for DspEngine {
    #[instrument(skip_all, fields(series = %namer.series_key()))]
    async fn debug(
        &self,
        predictor: &dyn Predictor,
        namer: &MetricNamer,
        config: &InternalConfig,
    ) -> Result<DebugSignals, EngineError> {
        let interval = config.dsp.sample_interval;
        let samples = predictor
            .query_history(namer, config.dsp.history_length, interval)
            .await?;
        if samples.len() < 2 {
            return Err(EngineError::InsufficientHistory {
                samples: samples.len(),
            });
        }

        let horizon = sample_count(config.prediction_window, interval).min(samples.len() / 2);
        let split = samples.len() - horizon;
        debug!(
            "Evaluating forecast of {} samples against {} training samples",
            horizon, split
        );

        let dsp = config.dsp.clone();
        let training = samples[..split].to_vec();
        let guard = CancelOnDrop::default();
        let cancelled = guard.flag();
        let forecast = tokio::task::spawn_blocking(move || {
            estimate(&training, horizon, &dsp, &cancelled)
        })
        .await
        .map_err(|e| EngineError::Task(e.to_string()))?
        .ok_or(EngineError::Cancelled)?;
        drop(guard);

        let interval_secs = interval.as_secs_f64();
        let metric = &config.metric_name;
        let history = Signal::from_interval(samples, interval_secs)?
            .with_label(format!("{metric} history"));
        let (_, test) = history.split_at(split);

        Ok(DebugSignals {
            history,
            test: test.with_label(format!("{metric} actual")),
            estimate: Signal::from_interval(forecast, interval_secs)?
                .with_label(format!("{metric} forecast")),
        })
    }
}

/// Forecasts `horizon` samples following `training` with the first estimator that applies.
///
/// FFT estimators apply only when the training data repeats with one of the
/// configured periods; when none applies the forecast is a flat line at the
/// training maximum.
///
/// `cancelled` is checked before every estimator and every candidate period.
/// Returns `None` once it is set.
pub fn estimate(
    training: &[f64],
    horizon: usize,
    config: &DspConfig,
    cancelled: &AtomicBool,
) -> Option<Vec<f64>> {
    for estimator in &config.estimators {
        if cancelled.load(Ordering::Relaxed) {
            debug!("Estimation cancelled");
            return None;
        }
        match *estimator {
            EstimatorConfig::Fft {
                margin_fraction,
                min_correlation,
            } => {
                if let Some(period) = detect_period(training, config, min_correlation, cancelled) {
                    trace!("Repeating detected period of {} samples", period);
                    return Some(repeat_period(training, period, horizon, margin_fraction));
                }
            }
            EstimatorConfig::MaxValue { margin_fraction } => {
                return Some(flat_max(training, horizon, margin_fraction));
            }
        }
    }
    if cancelled.load(Ordering::Relaxed) {
        debug!("Estimation cancelled");
        return None;
    }

    let margin = match config.estimators.first() {
        Some(EstimatorConfig::Fft {
            margin_fraction, ..
        })
        | Some(EstimatorConfig::MaxValue { margin_fraction }) => *margin_fraction,
        None => 0.0,
    };
    trace!("No periodicity detected, falling back to max value");
    Some(flat_max(training, horizon, margin))
}

/// Period in samples with the strongest autocorrelation of at least `min_correlation`.
fn detect_period(
    training: &[f64],
    config: &DspConfig,
    min_correlation: f64,
    cancelled: &AtomicBool,
) -> Option<usize> {
    let interval = config.sample_interval.as_secs_f64();
    config
        .periods
        .iter()
        .map(|period: &Duration| (period.as_secs_f64() / interval).round() as usize)
        .filter(|&lag| lag > 0 && training.len() >= 2 * lag)
        .take_while(|_| !cancelled.load(Ordering::Relaxed))
        .filter_map(|lag| autocorrelation(training, lag).map(|r| (lag, r)))
        .filter(|&(_, r)| r >= min_correlation)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(lag, _)| lag)
}

/// Normalized autocorrelation of `values` at `lag`, `None` for a constant series.
fn autocorrelation(values: &[f64], lag: usize) -> Option<f64> {
    if lag >= values.len() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    if variance <= f64::EPSILON {
        return None;
    }
    let covariance: f64 = values
        .iter()
        .zip(&values[lag..])
        .map(|(a, b)| (a - mean) * (b - mean))
        .sum();
    Some(covariance / variance)
}

fn repeat_period(training: &[f64], period: usize, horizon: usize, margin: f64) -> Vec<f64> {
    let last = &training[training.len() - period..];
    (0..horizon)
        .map(|i| last[i % period] * (1.0 + margin))
        .collect()
}

fn flat_max(training: &[f64], horizon: usize, margin: f64) -> Vec<f64> {
    let max = training
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let value = if max.is_finite() { max * (1.0 + margin) } else { 0.0 };
    vec![value; horizon]
}
