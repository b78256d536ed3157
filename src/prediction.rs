pub mod dsp;
pub mod engine;
pub mod metric_context;
pub mod predictor;
pub mod selector;
pub mod store;

pub use dsp::DspEngine;
pub use engine::{DebugSignals, EngineError, ForecastEngine};
pub use metric_context::{InternalConfig, MetricContext, MetricContextError, MetricNamer};
pub use predictor::{Predictor, PredictorManager, RecordedPredictor};
pub use selector::{SelectorFetcher, TargetRefSelectorFetcher};
pub use store::{FileJobStore, InMemoryJobStore, JobStore, StoreError};
