use common::Signal;
use tracing::{debug, instrument};

use crate::descriptor::{axis_labels, ChartDescriptor, ChartOverrides, ChartSeries, Theme};

/// Renders one signal as a line chart.
///
/// Every sample becomes one point labelled with its time offset. Point markers
/// are suppressed so long series stay readable. The chart is titled with the
/// signal's own label unless `overrides` says otherwise. An empty signal gives
/// a chart without points.
#[instrument(skip(signal, overrides), fields(samples = signal.num()))]
pub fn render_series(
    signal: &Signal,
    name: &str,
    color: &str,
    overrides: &ChartOverrides,
) -> ChartDescriptor {
    let x_axis = axis_labels(signal.num(), signal.sample_rate());

    let mut chart = ChartDescriptor::new(Theme::Roma, x_axis);
    chart.title = signal.to_string();
    chart.legend.data = vec![name.to_string()];
    chart
        .series
        .push(ChartSeries::line(name, signal.samples().to_vec()).with_color(color));
    chart.apply(overrides);

    debug!("Rendered series '{}' with {} points", name, chart.len());
    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Legend, SeriesStyle};

    fn signal(samples: Vec<f64>, rate: f64) -> Signal {
        Signal::new(samples, rate).unwrap()
    }

    #[test]
    fn test_labels_and_values_pair_one_to_one() {
        let chart = render_series(
            &signal(vec![1.0, 2.0, 3.0], 2.0),
            "history",
            "green",
            &ChartOverrides::default(),
        );

        assert_eq!(chart.x_axis, vec!["0.0", "0.5", "1.0"]);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].data, vec![1.0, 2.0, 3.0]);
        assert_eq!(chart.series[0].data.len(), chart.x_axis.len());
    }

    #[test]
    fn test_line_only_without_markers() {
        let chart = render_series(
            &signal(vec![1.0, 2.0], 1.0),
            "history",
            "green",
            &ChartOverrides::default(),
        );

        let series = &chart.series[0];
        assert_eq!(series.name, "history");
        assert_eq!(series.color.as_deref(), Some("green"));
        assert_eq!(series.style, SeriesStyle::Line);
        assert!(!series.show_symbol);
        assert!(series.visible);
        assert_eq!(chart.legend.data, vec!["history"]);
        assert_eq!(chart.theme, Theme::Roma);
    }

    #[test]
    fn test_empty_signal_renders_empty_chart() {
        let chart = render_series(
            &signal(vec![], 1.0),
            "history",
            "green",
            &ChartOverrides::default(),
        );

        assert!(chart.x_axis.is_empty());
        assert_eq!(chart.series.len(), 1);
        assert!(chart.series[0].data.is_empty());
    }

    #[test]
    fn test_default_title_is_signal_label() {
        let history = signal(vec![1.0], 1.0).with_label("cpu of default/web");
        let chart = render_series(&history, "history", "green", &ChartOverrides::default());
        assert_eq!(chart.title, "cpu of default/web");
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let history = signal(vec![1.0], 1.0).with_label("cpu of default/web");
        let overrides = ChartOverrides::default().title("history").legend(Legend {
            show: false,
            data: vec![],
        });
        let chart = render_series(&history, "history", "green", &overrides);

        assert_eq!(chart.title, "history");
        assert!(!chart.legend.show);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let history = signal(vec![0.25, 1.5, -3.0, 7.125], 0.5).with_label("cpu");
        let first = render_series(&history, "history", "green", &ChartOverrides::default());
        let second = render_series(&history, "history", "green", &ChartOverrides::default());

        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}
