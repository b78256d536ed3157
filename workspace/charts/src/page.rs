//! Debug page composition.
//!
//! A page is a single HTML document: styles, the SVG of every chart and the
//! chart descriptors themselves (as JSON data blocks read by the inline tooltip
//! script) are all embedded, so viewing it needs no further requests.

use std::io::{self, Write};

use tracing::{debug, instrument};

use crate::descriptor::ChartDescriptor;
use crate::error::Result;
use crate::svg::{escape_text, render_svg};

/// Content type of a rendered page.
pub const CONTENT_TYPE: &str = "text/html; charset=utf-8";

const DEFAULT_PAGE_TITLE: &str = "Prediction debug";

const STYLE: &str = "\
body { margin: 0; background: #f4f5f7; font-family: Helvetica, Arial, sans-serif; color: #222; }
.container { display: flex; flex-direction: column; gap: 24px; padding: 24px; }
.item { background: #fff; border: 1px solid #e3e3e3; border-radius: 6px; padding: 12px 16px; }
.item h2 { margin: 0; font-size: 18px; }
.item .subtitle { margin: 4px 0 0; color: #666; font-size: 13px; }
.legend { list-style: none; display: flex; gap: 16px; margin: 8px 0; padding: 0; font-size: 13px; }
.legend .swatch { display: inline-block; width: 14px; height: 4px; margin-right: 6px; vertical-align: middle; }
.scroll { overflow-x: auto; position: relative; }
.tip { position: absolute; pointer-events: none; background: rgba(50,50,50,0.85); color: #fff; font-size: 12px; padding: 6px 8px; border-radius: 4px; white-space: pre; }
";

// Axis tooltip: maps the pointer to the nearest sample and lists every series value.
const TOOLTIP_SCRIPT: &str = "\
document.querySelectorAll('.item').forEach(function (item) {
  var data = JSON.parse(item.querySelector('script.chart-data').textContent);
  var scroll = item.querySelector('.scroll');
  var svg = scroll.querySelector('svg');
  var cursor = svg.querySelector('.cursor');
  if (!data.tooltip.show || data.x_axis.length === 0) { return; }
  var tip = document.createElement('div');
  tip.className = 'tip';
  tip.style.display = 'none';
  scroll.appendChild(tip);
  var left = 72, right = 24, n = data.x_axis.length;
  var show = function (ev) {
    var box = svg.getBoundingClientRect();
    var x = (ev.clientX - box.left) * data.width / box.width;
    var span = data.width - left - right;
    var i = n > 1 ? Math.round((x - left) / span * (n - 1)) : 0;
    i = Math.max(0, Math.min(n - 1, i));
    var px = n > 1 ? left + i * span / (n - 1) : left;
    var lines = [data.x_axis[i]];
    data.series.forEach(function (s) { if (s.visible) { lines.push(s.name + ': ' + s.data[i]); } });
    tip.textContent = lines.join('\\n');
    tip.style.display = 'block';
    tip.style.left = (ev.clientX - box.left + scroll.scrollLeft + 12) + 'px';
    tip.style.top = (ev.clientY - box.top + 12) + 'px';
    cursor.setAttribute('x1', px);
    cursor.setAttribute('x2', px);
    cursor.setAttribute('visibility', 'visible');
  };
  svg.addEventListener(data.tooltip.trigger_on === 'click' ? 'click' : 'mousemove', show);
  svg.addEventListener('mouseleave', function () {
    tip.style.display = 'none';
    cursor.setAttribute('visibility', 'hidden');
  });
});
";

/// An ordered collection of charts rendered as one HTML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    title: String,
    charts: Vec<ChartDescriptor>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_TITLE)
    }
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            charts: Vec::new(),
        }
    }

    pub fn add_chart(&mut self, chart: ChartDescriptor) -> &mut Self {
        self.charts.push(chart);
        self
    }

    pub fn charts(&self) -> &[ChartDescriptor] {
        &self.charts
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Writes the page to `writer`. Output only depends on the page contents.
    #[instrument(skip_all, fields(charts = self.charts.len()))]
    pub fn render<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(
            writer,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n<div class=\"container\">\n",
            escape_text(&self.title)
        )?;

        for (index, chart) in self.charts.iter().enumerate() {
            let data = chart_data(chart).map_err(io::Error::other)?;
            write_chart(writer, index, chart, &data)?;
        }

        write!(writer, "</div>\n<script>\n{TOOLTIP_SCRIPT}</script>\n</body>\n</html>\n")?;
        writer.flush()?;

        debug!("Rendered page '{}'", self.title);
        Ok(())
    }

    /// Renders the page into memory.
    pub fn to_html(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.render(&mut buffer)?;
        String::from_utf8(buffer).map_err(io::Error::other)
    }
}

/// Builds a page holding `charts` in order.
pub fn compose(charts: impl IntoIterator<Item = ChartDescriptor>) -> Page {
    let mut page = Page::default();
    for chart in charts {
        page.add_chart(chart);
    }
    page
}

/// Descriptor JSON made safe for embedding inside a `<script>` element.
fn chart_data(chart: &ChartDescriptor) -> Result<String> {
    Ok(chart.to_json()?.replace("</", "<\\/"))
}

fn write_chart<W: Write>(
    writer: &mut W,
    index: usize,
    chart: &ChartDescriptor,
    data: &str,
) -> io::Result<()> {
    writeln!(writer, "<div class=\"item\" id=\"chart-{index}\">")?;
    writeln!(writer, "<h2>{}</h2>", escape_text(&chart.title))?;
    if let Some(subtitle) = &chart.subtitle {
        writeln!(writer, "<p class=\"subtitle\">{}</p>", escape_text(subtitle))?;
    }
    if chart.legend.show {
        write!(writer, "<ul class=\"legend\">")?;
        for name in &chart.legend.data {
            let color = chart
                .series
                .iter()
                .position(|s| &s.name == name)
                .map(|i| chart.series_color(i))
                .unwrap_or("#999999");
            write!(
                writer,
                "<li><span class=\"swatch\" style=\"background:{}\"></span>{}</li>",
                escape_text(color),
                escape_text(name)
            )?;
        }
        writeln!(writer, "</ul>")?;
    }
    writeln!(writer, "<div class=\"scroll\">")?;
    writer.write_all(render_svg(chart).as_bytes())?;
    writeln!(writer, "</div>")?;
    writeln!(
        writer,
        "<script type=\"application/json\" class=\"chart-data\" id=\"chart-data-{index}\">{data}</script>"
    )?;
    writeln!(writer, "</div>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ChartOverrides;
    use crate::overlay::render_overlay;
    use crate::series::render_series;
    use common::Signal;

    fn sample_page() -> Page {
        let history = Signal::new(vec![1.0, 2.0, 3.0], 2.0).unwrap();
        let actual = Signal::new(vec![1.0, 2.0], 1.0).unwrap();
        let forecast = Signal::new(vec![1.5, 2.5], 1.0).unwrap();

        let single = render_series(
            &history,
            "history",
            "green",
            &ChartOverrides::default().title("history"),
        );
        let overlay = render_overlay(
            &[actual, forecast],
            &["actual", "forecasted"],
            &ChartOverrides::default().title("actual/forecasted"),
        )
        .unwrap()
        .unwrap();

        compose([single, overlay])
    }

    /// Writer that fails after accepting a fixed number of bytes.
    struct FailingWriter {
        remaining: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_compose_keeps_chart_order() {
        let page = sample_page();
        assert_eq!(page.charts().len(), 2);
        assert_eq!(page.charts()[0].title, "history");
        assert_eq!(page.charts()[1].title, "actual/forecasted");
    }

    #[test]
    fn test_page_is_self_contained() {
        let html = sample_page().to_html().unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert_eq!(html.matches("<svg ").count(), 2);
        assert!(html.contains("<h2>history</h2>"));
        assert!(html.contains("<h2>actual/forecasted</h2>"));
        assert!(!html.contains("src="));
        assert!(!html.contains("href="));
        // the SVG namespace is an identifier, not a fetched resource
        assert!(!html.replace("http://www.w3.org/2000/svg", "").contains("http"));
    }

    #[test]
    fn test_page_embeds_descriptors() {
        let page = sample_page();
        let html = page.to_html().unwrap();

        let start = html.find("id=\"chart-data-1\">").unwrap() + "id=\"chart-data-1\">".len();
        let end = start + html[start..].find("</script>").unwrap();
        let embedded: ChartDescriptor = serde_json::from_str(&html[start..end]).unwrap();
        assert_eq!(&embedded, &page.charts()[1]);
    }

    #[test]
    fn test_script_terminator_in_title_is_escaped() {
        let signal = Signal::new(vec![1.0], 1.0).unwrap();
        let chart = render_series(
            &signal,
            "history",
            "green",
            &ChartOverrides::default().title("</script><b>"),
        );
        let html = compose([chart]).to_html().unwrap();

        assert!(html.contains("<h2>&lt;/script&gt;&lt;b&gt;</h2>"));
        assert!(html.contains("<\\/script><b>"));
    }

    #[test]
    fn test_render_is_byte_identical() {
        assert_eq!(sample_page().to_html().unwrap(), sample_page().to_html().unwrap());
    }

    #[test]
    fn test_empty_page() {
        let html = compose(Vec::new()).to_html().unwrap();
        assert!(html.contains("<title>Prediction debug</title>"));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut writer = FailingWriter { remaining: 64 };
        let result = sample_page().render(&mut writer);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }
}
