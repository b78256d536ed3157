use common::TargetRef;
use thiserror::Error;

/// Error types for selector resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectorError {
    /// The target reference does not identify a workload
    #[error("Invalid target reference: {0}")]
    InvalidTarget(String),
}

/// Resolves the label selector that picks a target workload's series.
pub trait SelectorFetcher: Send + Sync {
    fn fetch(&self, target: &TargetRef) -> Result<String, SelectorError>;
}

/// Derives the selector directly from the target reference fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetRefSelectorFetcher;

impl SelectorFetcher for TargetRefSelectorFetcher {
    fn fetch(&self, target: &TargetRef) -> Result<String, SelectorError> {
        if target.kind.is_empty() || target.name.is_empty() {
            return Err(SelectorError::InvalidTarget(format!(
                "kind '{}' name '{}'",
                target.kind, target.name
            )));
        }

        let mut selector = format!("kind={},name={}", target.kind.to_lowercase(), target.name);
        if !target.namespace.is_empty() {
            selector.push_str(&format!(",namespace={}", target.namespace));
        }
        Ok(selector)
    }
}
