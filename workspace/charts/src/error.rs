use thiserror::Error;

/// Error types for the charts module
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    /// Overlay was given a different number of names than signals
    #[error("Overlay expects one name per signal: {signals} signals, {names} names")]
    NameCountMismatch { signals: usize, names: usize },

    /// An overlay signal does not have as many samples as the first signal
    #[error("Signal {index} has {actual} samples, expected {expected} to match the first signal")]
    SampleCountMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// An overlay signal is sampled at a different rate than the first signal
    #[error("Signal {index} is sampled at {actual} samples/s, expected {expected} to match the first signal")]
    SampleRateMismatch {
        index: usize,
        expected: f64,
        actual: f64,
    },

    /// Descriptor could not be serialized for embedding into a page
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ChartError {
    fn from(error: serde_json::Error) -> Self {
        ChartError::Serialization(error.to_string())
    }
}

/// Type alias for Result with ChartError
pub type Result<T> = std::result::Result<T, ChartError>;
