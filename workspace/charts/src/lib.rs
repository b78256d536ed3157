//! Chart rendering for the prediction debug view.
//!
//! Signals become [`ChartDescriptor`]s through [`render_series`] (one signal,
//! line style) or [`render_overlay`] (several aligned signals, area style), and
//! descriptors are assembled into a self-contained HTML [`Page`] by [`compose`].

pub mod descriptor;
pub mod error;
pub mod overlay;
pub mod page;
pub mod series;
mod svg;

pub use descriptor::{
    axis_labels, ChartDescriptor, ChartOverrides, ChartSeries, Legend, SeriesStyle, Theme, Tooltip,
    TooltipTrigger, TooltipTriggerOn,
};
pub use error::{ChartError, Result};
pub use overlay::render_overlay;
pub use page::{compose, Page, CONTENT_TYPE};
pub use series::render_series;
