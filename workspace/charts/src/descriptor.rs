//! Chart descriptors produced by the renderers.
//!
//! A descriptor is plain data: it holds the shared x axis, the series values and
//! the presentation options. Drawing it is left to the page composer.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Width in pixels used by the debug charts, wide enough to keep dense series legible.
pub const DEFAULT_WIDTH: u32 = 3000;
/// Height in pixels used by the debug charts.
pub const DEFAULT_HEIGHT: u32 = 480;

/// Colour scheme of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Roma,
    Shine,
}

impl Theme {
    /// Series colours used when a series has no explicit colour.
    pub fn palette(&self) -> &'static [&'static str] {
        match self {
            Theme::Roma => &[
                "#E01F54", "#001852", "#f5e8c8", "#b8d2c7", "#c6b38e", "#a4d8c2", "#f3d999",
                "#d3758f", "#dcc392", "#2e4783",
            ],
            Theme::Shine => &[
                "#c12e34", "#e6b600", "#0098d9", "#2b821d", "#005eaa", "#339ca8", "#cda819",
                "#32a487",
            ],
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            Theme::Roma => "#fdfcf8",
            Theme::Shine => "#ffffff",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Theme::Roma => "#333333",
            Theme::Shine => "#222222",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    pub show: bool,
    pub data: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipTrigger {
    /// One tooltip for all series at the hovered x position
    Axis,
    /// One tooltip per hovered data item
    Item,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipTriggerOn {
    MouseMove,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tooltip {
    pub show: bool,
    pub trigger: TooltipTrigger,
    pub trigger_on: TooltipTriggerOn,
}

impl Default for Tooltip {
    fn default() -> Self {
        Self {
            show: true,
            trigger: TooltipTrigger::Axis,
            trigger_on: TooltipTriggerOn::MouseMove,
        }
    }
}

/// How a series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SeriesStyle {
    /// Stroke only
    Line,
    /// Stroke plus a filled area down to the axis
    Area { opacity: f64 },
}

/// One named series of a chart. Values pair positionally with the chart's x axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub color: Option<String>,
    pub visible: bool,
    pub show_symbol: bool,
    pub style: SeriesStyle,
    pub data: Vec<f64>,
}

impl ChartSeries {
    /// Line series without point markers.
    pub fn line(name: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            color: None,
            visible: true,
            show_symbol: false,
            style: SeriesStyle::Line,
            data,
        }
    }

    /// Area series without point markers, filled with the given opacity.
    pub fn area(name: impl Into<String>, data: Vec<f64>, opacity: f64) -> Self {
        Self {
            style: SeriesStyle::Area { opacity },
            ..Self::line(name, data)
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        let color = color.into();
        self.color = if color.is_empty() { None } else { Some(color) };
        self
    }

    /// Pairs every value with its x label.
    pub fn points<'a>(&'a self, x_axis: &'a [String]) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        x_axis
            .iter()
            .map(String::as_str)
            .zip(self.data.iter().copied())
    }
}

/// Chart level presentation options that replace the renderer defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartOverrides {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub legend: Option<Legend>,
    pub tooltip: Option<Tooltip>,
}

impl ChartOverrides {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn legend(mut self, legend: Legend) -> Self {
        self.legend = Some(legend);
        self
    }

    pub fn tooltip(mut self, tooltip: Tooltip) -> Self {
        self.tooltip = Some(tooltip);
        self
    }
}

/// A complete line chart: options, shared x axis and series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescriptor {
    pub title: String,
    pub subtitle: Option<String>,
    pub theme: Theme,
    pub width: u32,
    pub height: u32,
    pub legend: Legend,
    pub tooltip: Tooltip,
    pub x_axis: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartDescriptor {
    pub(crate) fn new(theme: Theme, x_axis: Vec<String>) -> Self {
        Self {
            title: String::new(),
            subtitle: None,
            theme,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            legend: Legend {
                show: true,
                data: Vec::new(),
            },
            tooltip: Tooltip::default(),
            x_axis,
            series: Vec::new(),
        }
    }

    pub(crate) fn apply(&mut self, overrides: &ChartOverrides) {
        if let Some(title) = &overrides.title {
            self.title = title.clone();
        }
        if let Some(subtitle) = &overrides.subtitle {
            self.subtitle = Some(subtitle.clone());
        }
        if let Some(legend) = &overrides.legend {
            self.legend = legend.clone();
        }
        if let Some(tooltip) = overrides.tooltip {
            self.tooltip = tooltip;
        }
    }

    /// Number of points on the x axis
    pub fn len(&self) -> usize {
        self.x_axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_axis.is_empty()
    }

    /// Colour of the series at `index`: its own colour or the theme palette entry.
    pub fn series_color(&self, index: usize) -> &str {
        match self.series.get(index).and_then(|s| s.color.as_deref()) {
            Some(color) => color,
            None => {
                let palette = self.theme.palette();
                palette[index % palette.len()]
            }
        }
    }

    /// Serializes the descriptor to JSON. Equal descriptors give identical bytes.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// X axis labels for `count` samples taken at `sample_rate` samples per second:
/// the time offset `i / sample_rate` of every sample, with one decimal.
pub fn axis_labels(count: usize, sample_rate: f64) -> Vec<String> {
    (0..count)
        .map(|i| format!("{:.1}", i as f64 / sample_rate))
        .collect()
}
