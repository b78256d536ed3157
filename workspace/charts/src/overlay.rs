use common::Signal;
use tracing::{debug, instrument, warn};

use crate::descriptor::{axis_labels, ChartDescriptor, ChartOverrides, ChartSeries, Theme};
use crate::error::{ChartError, Result};

/// Fill opacity of overlay series, low enough that overlapping areas stay visible.
pub const OVERLAY_AREA_OPACITY: f64 = 0.1;

/// Renders several signals over one shared time axis.
///
/// The first signal defines the axis. Every other signal must have the same
/// sample count and sample rate, and `names` must hold one name per signal;
/// a mismatch is reported as an error instead of truncating or padding.
/// Series are area styled so overlapping regions remain distinguishable.
///
/// Returns `Ok(None)` when there is nothing to render.
#[instrument(skip_all, fields(signals = signals.len()))]
pub fn render_overlay<S: AsRef<str>>(
    signals: &[Signal],
    names: &[S],
    overrides: &ChartOverrides,
) -> Result<Option<ChartDescriptor>> {
    let Some(first) = signals.first() else {
        debug!("No signals to overlay");
        return Ok(None);
    };

    if names.len() != signals.len() {
        warn!(
            "Overlay got {} names for {} signals",
            names.len(),
            signals.len()
        );
        return Err(ChartError::NameCountMismatch {
            signals: signals.len(),
            names: names.len(),
        });
    }

    let count = first.num();
    let rate = first.sample_rate();
    for (index, signal) in signals.iter().enumerate().skip(1) {
        if signal.num() != count {
            return Err(ChartError::SampleCountMismatch {
                index,
                expected: count,
                actual: signal.num(),
            });
        }
        if signal.sample_rate() != rate {
            return Err(ChartError::SampleRateMismatch {
                index,
                expected: rate,
                actual: signal.sample_rate(),
            });
        }
    }

    let mut chart = ChartDescriptor::new(Theme::Shine, axis_labels(count, rate));
    chart.title = first.to_string();
    chart.legend.data = names
        .iter()
        .map(|name| AsRef::<str>::as_ref(name).to_string())
        .collect();
    chart.series = signals
        .iter()
        .zip(names)
        .map(|(signal, name)| {
            let name: &str = name.as_ref();
            ChartSeries::area(name, signal.samples().to_vec(), OVERLAY_AREA_OPACITY)
        })
        .collect();
    chart.apply(overrides);

    debug!(
        "Rendered overlay of {} series with {} points each",
        chart.series.len(),
        count
    );
    Ok(Some(chart))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SeriesStyle;

    fn signal(samples: Vec<f64>, rate: f64) -> Signal {
        Signal::new(samples, rate).unwrap()
    }

    #[test]
    fn test_no_signals_gives_none() {
        let names: [&str; 0] = [];
        let result = render_overlay(&[], &names, &ChartOverrides::default());
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_two_aligned_signals_share_axis() {
        let signals = vec![signal(vec![1.0, 2.0], 1.0), signal(vec![10.0, 20.0], 1.0)];
        let chart = render_overlay(&signals, &["a", "b"], &ChartOverrides::default())
            .unwrap()
            .unwrap();

        assert_eq!(chart.x_axis, vec!["0.0", "1.0"]);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "a");
        assert_eq!(chart.series[0].data, vec![1.0, 2.0]);
        assert_eq!(chart.series[1].name, "b");
        assert_eq!(chart.series[1].data, vec![10.0, 20.0]);
        assert_eq!(chart.legend.data, vec!["a", "b"]);
    }

    #[test]
    fn test_series_are_area_styled() {
        let signals = vec![signal(vec![1.0], 1.0), signal(vec![2.0], 1.0)];
        let chart = render_overlay(&signals, &["actual", "forecasted"], &ChartOverrides::default())
            .unwrap()
            .unwrap();

        for series in &chart.series {
            assert_eq!(series.style, SeriesStyle::Area { opacity: 0.1 });
            assert!(!series.show_symbol);
        }
        assert_eq!(chart.theme, Theme::Shine);
    }

    #[test]
    fn test_title_override() {
        let signals = vec![signal(vec![1.0], 1.0).with_label("test"), signal(vec![2.0], 1.0)];

        let chart = render_overlay(&signals, &["a", "b"], &ChartOverrides::default())
            .unwrap()
            .unwrap();
        assert_eq!(chart.title, "test");

        let overrides = ChartOverrides::default().title("actual/forecasted");
        let chart = render_overlay(&signals, &["a", "b"], &overrides).unwrap().unwrap();
        assert_eq!(chart.title, "actual/forecasted");
    }

    #[test]
    fn test_shorter_signal_is_rejected() {
        let signals = vec![signal(vec![1.0, 2.0, 3.0], 1.0), signal(vec![1.0, 2.0], 1.0)];
        let result = render_overlay(&signals, &["a", "b"], &ChartOverrides::default());
        assert_eq!(
            result,
            Err(ChartError::SampleCountMismatch {
                index: 1,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_longer_signal_is_rejected() {
        let signals = vec![signal(vec![1.0], 1.0), signal(vec![1.0, 2.0], 1.0)];
        let result = render_overlay(&signals, &["a", "b"], &ChartOverrides::default());
        assert!(matches!(result, Err(ChartError::SampleCountMismatch { .. })));
    }

    #[test]
    fn test_rate_mismatch_is_rejected() {
        let signals = vec![signal(vec![1.0, 2.0], 1.0), signal(vec![1.0, 2.0], 2.0)];
        let result = render_overlay(&signals, &["a", "b"], &ChartOverrides::default());
        assert!(matches!(
            result,
            Err(ChartError::SampleRateMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn test_name_count_mismatch_is_rejected() {
        let signals = vec![signal(vec![1.0], 1.0), signal(vec![1.0], 1.0)];
        let result = render_overlay(&signals, &["only"], &ChartOverrides::default());
        assert_eq!(
            result,
            Err(ChartError::NameCountMismatch {
                signals: 2,
                names: 1
            })
        );
    }

    #[test]
    fn test_empty_signals_render_empty_overlay() {
        let signals = vec![signal(vec![], 1.0), signal(vec![], 1.0)];
        let chart = render_overlay(&signals, &["a", "b"], &ChartOverrides::default())
            .unwrap()
            .unwrap();
        assert!(chart.is_empty());
        assert!(chart.series.iter().all(|s| s.data.is_empty()));
    }
}
