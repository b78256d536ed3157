use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error types for signal construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// Sample rate was zero, negative, NaN or infinite
    #[error("Invalid sample rate: {0} (must be a positive finite number)")]
    InvalidSampleRate(f64),
}

/// A uniformly sampled series of values produced by the forecasting engine.
///
/// The sample rate is expressed in samples per second. A signal with no samples
/// is valid; it simply renders as an empty chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSignal")]
pub struct Signal {
    /// Sample values in time order
    samples: Vec<f64>,
    /// Samples per second
    sample_rate: f64,
    /// Producer supplied description (metric name, provenance)
    label: String,
}

#[derive(Deserialize)]
struct RawSignal {
    samples: Vec<f64>,
    sample_rate: f64,
    #[serde(default)]
    label: String,
}

impl TryFrom<RawSignal> for Signal {
    type Error = SignalError;

    fn try_from(raw: RawSignal) -> Result<Self, Self::Error> {
        Ok(Signal::new(raw.samples, raw.sample_rate)?.with_label(raw.label))
    }
}

impl Signal {
    /// Creates a new signal, rejecting sample rates that are not positive and finite.
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Result<Self, SignalError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SignalError::InvalidSampleRate(sample_rate));
        }

        Ok(Self {
            samples,
            sample_rate,
            label: String::new(),
        })
    }

    /// Creates a signal from samples taken every `interval_secs` seconds.
    pub fn from_interval(samples: Vec<f64>, interval_secs: f64) -> Result<Self, SignalError> {
        Self::new(samples, 1.0 / interval_secs)
    }

    /// Attaches a descriptive label to the signal.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of samples in the signal
    pub fn num(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time covered by the signal in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Time offset in seconds of the sample at `index`
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate
    }

    /// Splits the signal at `index`, keeping the rate and label on both halves.
    ///
    /// An index past the end yields the whole signal and an empty tail.
    pub fn split_at(&self, index: usize) -> (Signal, Signal) {
        let index = index.min(self.samples.len());
        let (head, tail) = self.samples.split_at(index);
        (
            Signal {
                samples: head.to_vec(),
                sample_rate: self.sample_rate,
                label: self.label.clone(),
            },
            Signal {
                samples: tail.to_vec(),
                sample_rate: self.sample_rate,
                label: self.label.clone(),
            },
        )
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(
                f,
                "{} samples @ {} samples/s",
                self.samples.len(),
                self.sample_rate
            )
        } else {
            f.write_str(&self.label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_sample_rate() {
        assert_eq!(
            Signal::new(vec![1.0], 0.0),
            Err(SignalError::InvalidSampleRate(0.0))
        );
        assert!(Signal::new(vec![1.0], -2.0).is_err());
        assert!(Signal::new(vec![1.0], f64::NAN).is_err());
        assert!(Signal::new(vec![1.0], f64::INFINITY).is_err());
    }

    #[test]
    fn test_empty_signal_is_valid() {
        let signal = Signal::new(vec![], 1.0).unwrap();
        assert!(signal.is_empty());
        assert_eq!(signal.num(), 0);
        assert_eq!(signal.duration_secs(), 0.0);
    }

    #[test]
    fn test_from_interval() {
        let signal = Signal::from_interval(vec![1.0, 2.0], 60.0).unwrap();
        assert!((signal.sample_rate() - 1.0 / 60.0).abs() < 1e-12);
        assert!((signal.time_at(1) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_prefers_label() {
        let signal = Signal::new(vec![1.0, 2.0, 3.0], 2.0).unwrap();
        assert_eq!(signal.to_string(), "3 samples @ 2 samples/s");

        let labelled = signal.with_label("cpu history");
        assert_eq!(labelled.to_string(), "cpu history");
    }

    #[test]
    fn test_split_at() {
        let signal = Signal::new(vec![1.0, 2.0, 3.0, 4.0], 1.0)
            .unwrap()
            .with_label("cpu");

        let (head, tail) = signal.split_at(3);
        assert_eq!(head.samples(), &[1.0, 2.0, 3.0]);
        assert_eq!(tail.samples(), &[4.0]);
        assert_eq!(tail.label(), "cpu");

        let (head, tail) = signal.split_at(10);
        assert_eq!(head.num(), 4);
        assert!(tail.is_empty());
    }

    #[test]
    fn test_deserialize_validates_rate() {
        let ok: Signal =
            serde_json::from_str(r#"{"samples":[1.0,2.0],"sample_rate":0.5}"#).unwrap();
        assert_eq!(ok.num(), 2);
        assert_eq!(ok.label(), "");

        let bad = serde_json::from_str::<Signal>(r#"{"samples":[1.0],"sample_rate":0.0}"#);
        assert!(bad.is_err());
    }
}
