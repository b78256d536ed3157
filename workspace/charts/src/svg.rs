//! Static SVG drawing of a chart descriptor.

use std::fmt::Write;

use crate::descriptor::{ChartDescriptor, SeriesStyle};

const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 40.0;
const Y_TICKS: usize = 5;
const MAX_X_LABELS: usize = 30;
const FONT: &str = "font-family='Helvetica, Arial, sans-serif' font-size='12'";

/// Plot area geometry and value range of a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub min: f64,
    pub max: f64,
    pub points: usize,
}

impl Frame {
    pub fn new(chart: &ChartDescriptor) -> Self {
        let (min, max) = value_range(chart);
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: (chart.width as f64 - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (chart.height as f64 - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
            min,
            max,
            points: chart.len(),
        }
    }

    pub fn x(&self, index: usize) -> f64 {
        if self.points <= 1 {
            return self.left;
        }
        self.left + index as f64 * self.width / (self.points - 1) as f64
    }

    pub fn y(&self, value: f64) -> f64 {
        self.top + (self.max - value) / (self.max - self.min) * self.height
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Y coordinate the area fill closes on: zero when it is in range, else the nearest edge.
    pub fn baseline(&self) -> f64 {
        self.y(0.0_f64.clamp(self.min, self.max))
    }
}

/// Smallest and largest finite value of the visible series.
/// Degenerate ranges are widened so the frame never divides by zero.
fn value_range(chart: &ChartDescriptor) -> (f64, f64) {
    let mut values = chart
        .series
        .iter()
        .filter(|s| s.visible)
        .flat_map(|s| s.data.iter().copied())
        .filter(|v| v.is_finite())
        .peekable();

    if values.peek().is_none() {
        return (0.0, 1.0);
    }

    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if min == max {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        (min - pad, max + pad)
    } else {
        (min, max)
    }
}

/// Escapes text for use in SVG/HTML content and attribute values.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Splits a series into runs of finite values so gaps are not bridged.
fn segments(frame: &Frame, data: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (index, value) in data.iter().enumerate() {
        if value.is_finite() {
            current.push((frame.x(index), frame.y(*value)));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Draws the chart as a standalone `<svg>` element.
pub fn render_svg(chart: &ChartDescriptor) -> String {
    let frame = Frame::new(chart);
    let text_color = chart.theme.text();
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}' role='img'>",
        w = chart.width,
        h = chart.height
    );
    let _ = writeln!(
        svg,
        "  <rect width='{}' height='{}' fill='{}'/>",
        chart.width,
        chart.height,
        chart.theme.background()
    );

    // horizontal grid and value ticks
    for tick in 0..=Y_TICKS {
        let value = frame.min + (frame.max - frame.min) * tick as f64 / Y_TICKS as f64;
        let y = frame.y(value);
        let _ = writeln!(
            svg,
            "  <line x1='{:.2}' y1='{y:.2}' x2='{:.2}' y2='{y:.2}' stroke='#e0e0e0' stroke-width='1'/>",
            frame.left,
            frame.left + frame.width
        );
        let _ = writeln!(
            svg,
            "  <text x='{:.2}' y='{:.2}' text-anchor='end' fill='{text_color}' {FONT}>{}</text>",
            frame.left - 8.0,
            y + 4.0,
            format_tick(value)
        );
    }

    // time axis
    let _ = writeln!(
        svg,
        "  <line x1='{:.2}' y1='{b:.2}' x2='{:.2}' y2='{b:.2}' stroke='{text_color}' stroke-width='1'/>",
        frame.left,
        frame.left + frame.width,
        b = frame.bottom()
    );
    let step = chart.len().div_ceil(MAX_X_LABELS).max(1);
    for (index, label) in chart.x_axis.iter().enumerate().step_by(step) {
        let _ = writeln!(
            svg,
            "  <text x='{:.2}' y='{:.2}' text-anchor='middle' fill='{text_color}' {FONT}>{}</text>",
            frame.x(index),
            frame.bottom() + 18.0,
            escape_text(label)
        );
    }

    if chart.is_empty() {
        let _ = writeln!(
            svg,
            "  <text x='{:.2}' y='{:.2}' text-anchor='middle' fill='{text_color}' {FONT}>no data</text>",
            frame.left + frame.width / 2.0,
            frame.top + frame.height / 2.0
        );
    }

    for (index, series) in chart.series.iter().enumerate() {
        if !series.visible {
            continue;
        }
        let color = escape_text(chart.series_color(index));
        let _ = writeln!(svg, "  <g class='series' data-series='{index}'>");
        let _ = writeln!(svg, "    <title>{}</title>", escape_text(&series.name));

        for run in segments(&frame, &series.data) {
            let points = run
                .iter()
                .map(|(x, y)| format!("{x:.2},{y:.2}"))
                .collect::<Vec<_>>()
                .join(" ");

            if let SeriesStyle::Area { opacity } = series.style {
                let (first_x, _) = run[0];
                let (last_x, _) = run[run.len() - 1];
                let baseline = frame.baseline();
                let _ = writeln!(
                    svg,
                    "    <polygon points='{first_x:.2},{baseline:.2} {points} {last_x:.2},{baseline:.2}' fill='{color}' fill-opacity='{opacity}' stroke='none'/>"
                );
            }
            let _ = writeln!(
                svg,
                "    <polyline points='{points}' fill='none' stroke='{color}' stroke-width='1.5' stroke-linejoin='round'/>"
            );
            if series.show_symbol {
                for (x, y) in &run {
                    let _ = writeln!(
                        svg,
                        "    <circle cx='{x:.2}' cy='{y:.2}' r='2.5' fill='{color}'/>"
                    );
                }
            }
        }
        let _ = writeln!(svg, "  </g>");
    }

    let _ = writeln!(
        svg,
        "  <line class='cursor' x1='0' y1='{:.2}' x2='0' y2='{:.2}' stroke='{text_color}' stroke-dasharray='4 4' visibility='hidden'/>",
        frame.top,
        frame.bottom()
    );
    svg.push_str("</svg>\n");
    svg
}
