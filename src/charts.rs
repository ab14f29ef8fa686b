//! Chart models and their SVG rendering.
//!
//! A chart is plain data (serialisable for the JSON API); `to_svg` turns it
//! into a self-contained `<svg>` element for the dashboard page.

use serde::Serialize;
use std::fmt::Write;

pub const CHART_WIDTH: f64 = 560.0;
pub const CHART_HEIGHT: f64 = 380.0;

const FONT: &str = "Inter, Segoe UI, sans-serif";
const TEXT_COLOR: &str = "#2a3f5f";
const GRID_COLOR: &str = "#e5ecf6";
const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datum {
    pub label: String,
    pub value: f64,
}

impl Datum {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub orientation: Orientation,
    pub show_values: bool,
    pub data: Vec<Datum>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutChart {
    pub title: String,
    /// Inner radius as a fraction of the outer radius.
    pub hole: f64,
    pub data: Vec<Datum>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    /// One value per category, aligned with `GroupedBarChart::categories`.
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    /// Tick label rotation in degrees; negative tilts labels up to the right.
    pub tick_angle: f64,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Bar(BarChart),
    Donut(DonutChart),
    GroupedBar(GroupedBarChart),
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::Bar(c) => &c.title,
            Chart::Donut(c) => &c.title,
            Chart::GroupedBar(c) => &c.title,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Chart::Bar(c) => c.data.is_empty(),
            Chart::Donut(c) => c.data.is_empty(),
            Chart::GroupedBar(c) => c.categories.is_empty() || c.series.is_empty(),
        }
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        open_svg(&mut svg, self.title());

        if self.is_empty() {
            no_data(&mut svg);
        } else {
            match self {
                Chart::Bar(c) if c.orientation == Orientation::Vertical => vertical_bars(&mut svg, c),
                Chart::Bar(c) => horizontal_bars(&mut svg, c),
                Chart::Donut(c) => donut(&mut svg, c),
                Chart::GroupedBar(c) => grouped_bars(&mut svg, c),
            }
        }

        let _ = writeln!(svg, "</svg>");
        svg
    }
}

/// Plot area inside the chart canvas.
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            width: CHART_WIDTH - left - right,
            height: CHART_HEIGHT - top - bottom,
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

fn open_svg(svg: &mut String, title: &str) {
    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{:.0}' height='{:.0}' viewBox='0 0 {:.0} {:.0}' role='img'>",
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    );
    let _ = writeln!(svg, "  <title>{}</title>", escape_text(title));
    let _ = writeln!(
        svg,
        "  <rect width='{:.0}' height='{:.0}' fill='#ffffff'/>",
        CHART_WIDTH, CHART_HEIGHT
    );
    let _ = writeln!(
        svg,
        "  <text x='16' y='30' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='17'>{}</text>",
        escape_text(title)
    );
}

fn no_data(svg: &mut String) {
    let _ = writeln!(
        svg,
        "  <text x='{:.0}' y='{:.0}' fill='#8c96a8' font-family='{FONT}' font-size='15' text-anchor='middle'>No data</text>",
        CHART_WIDTH / 2.0,
        CHART_HEIGHT / 2.0
    );
}

fn max_value<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    let max = values.fold(0.0_f64, |acc, v| acc.max(*v));
    if max > 0.0 {
        max
    } else {
        1.0
    }
}

/// Gridlines and tick labels for a value axis running along y.
fn value_axis_y(svg: &mut String, frame: &Frame, max: f64) {
    for step in 0..=4 {
        let value = max * step as f64 / 4.0;
        let y = frame.bottom() - frame.height * step as f64 / 4.0;
        let _ = writeln!(
            svg,
            "  <line x1='{:.1}' y1='{y:.1}' x2='{:.1}' y2='{y:.1}' stroke='{GRID_COLOR}'/>",
            frame.left,
            frame.left + frame.width
        );
        let _ = writeln!(
            svg,
            "  <text x='{:.1}' y='{:.1}' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='11' text-anchor='end'>{}</text>",
            frame.left - 6.0,
            y + 4.0,
            format_value(value)
        );
    }
}

fn axis_titles(svg: &mut String, frame: &Frame, x_label: &str, y_label: &str) {
    let _ = writeln!(
        svg,
        "  <text x='{:.1}' y='{:.1}' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='13' text-anchor='middle'>{}</text>",
        frame.left + frame.width / 2.0,
        CHART_HEIGHT - 8.0,
        escape_text(x_label)
    );
    let y_mid = frame.top + frame.height / 2.0;
    let _ = writeln!(
        svg,
        "  <text x='16' y='{y_mid:.1}' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='13' text-anchor='middle' transform='rotate(-90 16 {y_mid:.1})'>{}</text>",
        escape_text(y_label)
    );
}

fn category_label(svg: &mut String, x: f64, y: f64, angle: f64, text: &str) {
    if angle == 0.0 {
        let _ = writeln!(
            svg,
            "  <text x='{x:.1}' y='{y:.1}' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='11' text-anchor='middle'>{}</text>",
            escape_text(text)
        );
    } else {
        let _ = writeln!(
            svg,
            "  <text x='{x:.1}' y='{y:.1}' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='11' text-anchor='end' transform='rotate({angle:.0} {x:.1} {y:.1})'>{}</text>",
            escape_text(text)
        );
    }
}

fn vertical_bars(svg: &mut String, chart: &BarChart) {
    let frame = Frame::new(64.0, 52.0, 20.0, 56.0);
    let max = max_value(chart.data.iter().map(|d| &d.value));
    value_axis_y(svg, &frame, max);

    let band = frame.width / chart.data.len() as f64;
    let bar_width = band * 0.7;

    for (i, datum) in chart.data.iter().enumerate() {
        let height = datum.value / max * frame.height;
        let x = frame.left + band * i as f64 + (band - bar_width) / 2.0;
        let y = frame.bottom() - height;
        let _ = writeln!(
            svg,
            "  <rect x='{x:.1}' y='{y:.1}' width='{bar_width:.1}' height='{height:.1}' fill='{}'><title>{}: {}</title></rect>",
            palette_color(0),
            escape_text(&datum.label),
            format_value(datum.value)
        );
        if chart.show_values {
            let _ = writeln!(
                svg,
                "  <text x='{:.1}' y='{:.1}' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='11' text-anchor='middle'>{}</text>",
                x + bar_width / 2.0,
                y - 4.0,
                format_value(datum.value)
            );
        }
        category_label(svg, x + bar_width / 2.0, frame.bottom() + 16.0, 0.0, &datum.label);
    }

    axis_titles(svg, &frame, &chart.x_label, &chart.y_label);
}

fn horizontal_bars(svg: &mut String, chart: &BarChart) {
    let frame = Frame::new(120.0, 52.0, 56.0, 40.0);
    let max = max_value(chart.data.iter().map(|d| &d.value));

    for step in 0..=4 {
        let value = max * step as f64 / 4.0;
        let x = frame.left + frame.width * step as f64 / 4.0;
        let _ = writeln!(
            svg,
            "  <line x1='{x:.1}' y1='{:.1}' x2='{x:.1}' y2='{:.1}' stroke='{GRID_COLOR}'/>",
            frame.top,
            frame.bottom()
        );
        let _ = writeln!(
            svg,
            "  <text x='{x:.1}' y='{:.1}' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='11' text-anchor='middle'>{}</text>",
            frame.bottom() + 14.0,
            format_value(value)
        );
    }

    let band = frame.height / chart.data.len() as f64;
    let bar_height = band * 0.7;

    for (i, datum) in chart.data.iter().enumerate() {
        let width = datum.value / max * frame.width;
        let y = frame.top + band * i as f64 + (band - bar_height) / 2.0;
        let _ = writeln!(
            svg,
            "  <rect x='{:.1}' y='{y:.1}' width='{width:.1}' height='{bar_height:.1}' fill='{}'><title>{}: {}</title></rect>",
            frame.left,
            palette_color(0),
            escape_text(&datum.label),
            format_value(datum.value)
        );
        let _ = writeln!(
            svg,
            "  <text x='{:.1}' y='{:.1}' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='11' text-anchor='end'>{}</text>",
            frame.left - 6.0,
            y + bar_height / 2.0 + 4.0,
            escape_text(&datum.label)
        );
        if chart.show_values {
            let _ = writeln!(
                svg,
                "  <text x='{:.1}' y='{:.1}' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='11'>{}</text>",
                frame.left + width + 4.0,
                y + bar_height / 2.0 + 4.0,
                format_value(datum.value)
            );
        }
    }

    axis_titles(svg, &frame, &chart.x_label, &chart.y_label);
}

fn donut(svg: &mut String, chart: &DonutChart) {
    let total: f64 = chart.data.iter().map(|d| d.value).sum();
    if total <= 0.0 {
        no_data(svg);
        return;
    }

    let cx = 190.0;
    let cy = 215.0;
    let outer = 140.0;
    let inner = outer * chart.hole.clamp(0.0, 0.95);
    let radius = (outer + inner) / 2.0;
    let stroke = outer - inner;
    let circumference = 2.0 * std::f64::consts::PI * radius;

    let mut offset = 0.0;
    for (i, datum) in chart.data.iter().enumerate() {
        let fraction = datum.value / total;
        let _ = writeln!(
            svg,
            "  <circle cx='{cx:.1}' cy='{cy:.1}' r='{radius:.1}' fill='none' stroke='{}' stroke-width='{stroke:.1}' stroke-dasharray='{:.2} {circumference:.2}' stroke-dashoffset='{:.2}' transform='rotate(-90 {cx:.1} {cy:.1})'><title>{}: {}</title></circle>",
            palette_color(i),
            fraction * circumference,
            -offset * circumference,
            escape_text(&datum.label),
            format_value(datum.value)
        );

        if fraction >= 0.04 {
            let angle = (offset + fraction / 2.0) * 2.0 * std::f64::consts::PI
                - std::f64::consts::FRAC_PI_2;
            let _ = writeln!(
                svg,
                "  <text x='{:.1}' y='{:.1}' fill='#ffffff' font-family='{FONT}' font-size='11' text-anchor='middle'>{:.1}%</text>",
                cx + radius * angle.cos(),
                cy + radius * angle.sin() + 4.0,
                fraction * 100.0
            );
        }
        offset += fraction;
    }

    let labels: Vec<&str> = chart.data.iter().map(|d| d.label.as_str()).collect();
    legend(svg, 360.0, 64.0, None, &labels);
}

fn grouped_bars(svg: &mut String, chart: &GroupedBarChart) {
    let frame = Frame::new(64.0, 52.0, 110.0, 104.0);
    let max = max_value(chart.series.iter().flat_map(|s| s.values.iter()));
    value_axis_y(svg, &frame, max);

    let band = frame.width / chart.categories.len() as f64;
    let group_width = band * 0.8;
    let bar_width = group_width / chart.series.len() as f64;

    for (ci, category) in chart.categories.iter().enumerate() {
        let group_x = frame.left + band * ci as f64 + (band - group_width) / 2.0;
        for (si, series) in chart.series.iter().enumerate() {
            let value = series.values.get(ci).copied().unwrap_or(0.0);
            if value <= 0.0 {
                continue;
            }
            let height = value / max * frame.height;
            let _ = writeln!(
                svg,
                "  <rect x='{:.1}' y='{:.1}' width='{bar_width:.1}' height='{height:.1}' fill='{}'><title>{} / {}: {}</title></rect>",
                group_x + bar_width * si as f64,
                frame.bottom() - height,
                palette_color(si),
                escape_text(category),
                escape_text(&series.name),
                format_value(value)
            );
        }
        category_label(
            svg,
            group_x + group_width / 2.0,
            frame.bottom() + 14.0,
            chart.tick_angle,
            category,
        );
    }

    axis_titles(svg, &frame, &chart.x_label, &chart.y_label);
    let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
    legend(
        svg,
        frame.left + frame.width + 14.0,
        frame.top,
        Some(&chart.legend_title),
        &names,
    );
}

fn legend(svg: &mut String, x: f64, y: f64, title: Option<&str>, labels: &[&str]) {
    let mut row_y = y;
    if let Some(title) = title {
        let _ = writeln!(
            svg,
            "  <text x='{x:.1}' y='{row_y:.1}' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='12'>{}</text>",
            escape_text(title)
        );
        row_y += 20.0;
    }
    for (i, label) in labels.iter().enumerate() {
        let _ = writeln!(
            svg,
            "  <rect x='{x:.1}' y='{:.1}' width='12' height='12' fill='{}'/>",
            row_y - 10.0,
            palette_color(i)
        );
        let _ = writeln!(
            svg,
            "  <text x='{:.1}' y='{row_y:.1}' fill='{TEXT_COLOR}' font-family='{FONT}' font-size='12'>{}</text>",
            x + 18.0,
            escape_text(label)
        );
        row_y += 18.0;
    }
}

/// Whole numbers without decimals, everything else with two.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(orientation: Orientation, data: Vec<Datum>) -> Chart {
        Chart::Bar(BarChart {
            title: "Shipments".to_string(),
            x_label: "Attempts".to_string(),
            y_label: "Shipments".to_string(),
            orientation,
            show_values: true,
            data,
        })
    }

    #[test]
    fn test_empty_chart_renders_placeholder() {
        let svg = bar(Orientation::Vertical, vec![]).to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("No data"));
        assert!(!svg.contains("<rect x="));
    }

    #[test]
    fn test_vertical_bars_one_rect_per_datum() {
        let svg = bar(
            Orientation::Vertical,
            vec![Datum::new("1", 2.0), Datum::new("2", 1.0)],
        )
        .to_svg();
        assert_eq!(svg.matches("<rect x=").count(), 2);
        assert!(svg.contains("<title>1: 2</title>"));
    }

    #[test]
    fn test_horizontal_bars_label_values() {
        let svg = bar(
            Orientation::Horizontal,
            vec![Datum::new("A", 66.67), Datum::new("B", 33.33)],
        )
        .to_svg();
        assert!(svg.contains(">66.67</text>"));
        assert!(svg.contains(">33.33</text>"));
    }

    #[test]
    fn test_donut_single_slice_covers_circle() {
        let chart = Chart::Donut(DonutChart {
            title: "Share".to_string(),
            hole: 0.4,
            data: vec![Datum::new("COD", 5.0)],
        });
        let svg = chart.to_svg();
        assert_eq!(svg.matches("<circle").count(), 1);
        assert!(svg.contains(">100.0%</text>"));
    }

    #[test]
    fn test_grouped_bars_skip_missing_pairs_and_rotate_ticks() {
        let chart = Chart::GroupedBar(GroupedBarChart {
            title: "By city".to_string(),
            x_label: "Drop City".to_string(),
            y_label: "Shipments".to_string(),
            legend_title: "Payment type".to_string(),
            tick_angle: -45.0,
            categories: vec!["Kochi".to_string(), "Pune".to_string()],
            series: vec![
                Series { name: "COD".to_string(), values: vec![2.0, 0.0] },
                Series { name: "Prepaid".to_string(), values: vec![1.0, 3.0] },
            ],
        });
        let svg = chart.to_svg();
        assert_eq!(svg.matches("<title>").count(), 1 + 3);
        assert!(svg.contains("rotate(-45"));
        assert!(svg.contains(">Payment type</text>"));
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(escape_text("A&B <C>"), "A&amp;B &lt;C&gt;");
        let svg = bar(Orientation::Vertical, vec![Datum::new("<x>", 1.0)]).to_svg();
        assert!(svg.contains("&lt;x&gt;"));
        assert!(!svg.contains("<x>"));
    }

    #[test]
    fn test_chart_serializes_with_kind_tag() {
        let json = serde_json::to_value(bar(Orientation::Horizontal, vec![])).unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["orientation"], "horizontal");
    }
}
