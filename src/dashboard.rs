//! The dashboard page model.
//!
//! `Dashboard::build` runs the whole pipeline for one render cycle:
//! filter the dataset, compute the key metrics and aggregations, and lay the
//! charts out in sections. Rendering adapters (HTML, JSON, terminal) only read
//! this model.

use crate::aggregate::{self, AttemptBucket, CategoryCount, CrossTabCell, Share};
use crate::charts::{BarChart, Chart, Datum, DonutChart, GroupedBarChart, Orientation, Series};
use crate::filter::{self, Selection};
use crate::metrics::KeyMetrics;
use crate::models::Dataset;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

pub const TAB_TITLE: &str = "📦 Shipment Dashboard";
pub const PAGE_TITLE: &str = "📦 Shipment Analytics Dashboard";
pub const FILTER_LABEL: &str = "Filter by Drop State";
pub const METRICS_HEADING: &str = "📊 Key Metrics";
pub const FOOTER_CAPTION: &str = "© 2025 • Shipment Analytics";

/// Every aggregation the page draws, kept for the JSON API and the report.
#[derive(Debug, Clone, Serialize)]
pub struct Aggregates {
    pub attempts: Vec<AttemptBucket>,
    pub states: Vec<Share>,
    pub cities: Vec<Share>,
    pub payment_types: Vec<CategoryCount>,
    pub city_payment: Vec<CrossTabCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartPanel {
    pub id: &'static str,
    pub chart: Chart,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "layout", content = "charts", rename_all = "snake_case")]
pub enum Section {
    Pair(ChartPanel, ChartPanel),
    Solo(ChartPanel),
}

impl Section {
    pub fn panels(&self) -> Vec<&ChartPanel> {
        match self {
            Section::Pair(left, right) => vec![left, right],
            Section::Solo(panel) => vec![panel],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: &'static str,
    pub available_states: Vec<String>,
    pub selected_states: Vec<String>,
    pub total_shipments: usize,
    pub filtered_shipments: usize,
    pub skipped_rows: usize,
    pub loaded_at: DateTime<Utc>,
    pub metrics: KeyMetrics,
    pub aggregates: Aggregates,
    pub sections: Vec<Section>,
    pub caption: &'static str,
}

impl Dashboard {
    pub fn build(data: &Dataset, selection: &Selection) -> Self {
        let available_states = data.states();
        let selected_states = selection.resolve(&available_states);
        let view = filter::filter(data, selection);

        let aggregates = Aggregates {
            attempts: aggregate::attempt_distribution(&view),
            states: aggregate::state_share(&view),
            cities: aggregate::city_share(&view),
            payment_types: aggregate::payment_counts(&view),
            city_payment: aggregate::city_payment_crosstab(&view),
        };
        let sections = layout(&aggregates);

        Self {
            title: PAGE_TITLE,
            available_states,
            selected_states,
            total_shipments: data.len(),
            filtered_shipments: view.len(),
            skipped_rows: data.skipped_rows,
            loaded_at: data.loaded_at,
            metrics: KeyMetrics::compute(&view),
            aggregates,
            sections,
            caption: FOOTER_CAPTION,
        }
    }

    pub fn panels(&self) -> impl Iterator<Item = &ChartPanel> {
        self.sections.iter().flat_map(|s| s.panels())
    }

    pub fn chart(&self, id: &str) -> Option<&Chart> {
        self.panels().find(|p| p.id == id).map(|p| &p.chart)
    }

    pub fn is_selected(&self, state: &str) -> bool {
        self.selected_states.iter().any(|s| s == state)
    }
}

fn layout(agg: &Aggregates) -> Vec<Section> {
    let attempts: Vec<Datum> = agg
        .attempts
        .iter()
        .map(|b| Datum::new(b.attempts.to_string(), b.count as f64))
        .collect();
    let states: Vec<Datum> = agg
        .states
        .iter()
        .map(|s| Datum::new(s.label.clone(), s.percent))
        .collect();
    let cities: Vec<Datum> = agg
        .cities
        .iter()
        .map(|s| Datum::new(s.label.clone(), s.percent))
        .collect();
    let payments: Vec<Datum> = agg
        .payment_types
        .iter()
        .map(|c| Datum::new(c.label.clone(), c.count as f64))
        .collect();

    vec![
        Section::Pair(
            ChartPanel {
                id: "attempts-share",
                chart: Chart::Donut(DonutChart {
                    title: "🚚 Delivery Attempts Share".to_string(),
                    hole: 0.4,
                    data: attempts.clone(),
                }),
            },
            ChartPanel {
                id: "attempts-count",
                chart: Chart::Bar(BarChart {
                    title: "📦 Count of Delivery Attempts".to_string(),
                    x_label: "Attempts".to_string(),
                    y_label: "Shipments".to_string(),
                    orientation: Orientation::Vertical,
                    show_values: false,
                    data: attempts,
                }),
            },
        ),
        Section::Pair(
            ChartPanel {
                id: "state-percent",
                chart: Chart::Bar(BarChart {
                    title: "📍 % Deliveries by State".to_string(),
                    x_label: "Percent".to_string(),
                    y_label: "State".to_string(),
                    orientation: Orientation::Horizontal,
                    show_values: true,
                    data: states.clone(),
                }),
            },
            ChartPanel {
                id: "state-share",
                chart: Chart::Donut(DonutChart {
                    title: "📍 State‑wise Share".to_string(),
                    hole: 0.3,
                    data: states,
                }),
            },
        ),
        Section::Solo(ChartPanel {
            id: "city-share",
            chart: Chart::Donut(DonutChart {
                title: "🏙️ Drop City‑wise Share".to_string(),
                hole: 0.3,
                data: cities,
            }),
        }),
        Section::Pair(
            ChartPanel {
                id: "payment-count",
                chart: Chart::Bar(BarChart {
                    title: "💳 COD vs Prepaid (Overall)".to_string(),
                    x_label: "Payment Type".to_string(),
                    y_label: "Shipments".to_string(),
                    orientation: Orientation::Vertical,
                    show_values: true,
                    data: payments,
                }),
            },
            ChartPanel {
                id: "city-payment",
                chart: Chart::GroupedBar(city_payment_chart(&agg.city_payment)),
            },
        ),
    ]
}

fn city_payment_chart(cells: &[CrossTabCell]) -> GroupedBarChart {
    let categories: Vec<String> = cells
        .iter()
        .map(|c| c.city.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let payment_types: BTreeSet<&str> = cells.iter().map(|c| c.payment_type.as_str()).collect();

    let series = payment_types
        .into_iter()
        .map(|payment| Series {
            name: payment.to_string(),
            values: categories
                .iter()
                .map(|city| {
                    cells
                        .iter()
                        .find(|c| &c.city == city && c.payment_type == payment)
                        .map(|c| c.count as f64)
                        .unwrap_or(0.0)
                })
                .collect(),
        })
        .collect();

    GroupedBarChart {
        title: "🏙️ COD vs Prepaid by Drop City".to_string(),
        x_label: "Drop City".to_string(),
        y_label: "Shipments".to_string(),
        legend_title: "Payment type".to_string(),
        tick_angle: -45.0,
        categories,
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_dataset;

    #[test]
    fn test_layout_order() {
        let dashboard = Dashboard::build(&sample_dataset(), &Selection::All);
        let ids: Vec<&str> = dashboard.panels().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec![
                "attempts-share",
                "attempts-count",
                "state-percent",
                "state-share",
                "city-share",
                "payment-count",
                "city-payment",
            ]
        );
        assert!(matches!(dashboard.sections[2], Section::Solo(_)));
    }

    #[test]
    fn test_sample_dashboard() {
        let dashboard = Dashboard::build(&sample_dataset(), &Selection::All);
        assert_eq!(dashboard.available_states, vec!["A", "B"]);
        assert_eq!(dashboard.selected_states, vec!["A", "B"]);
        assert_eq!(dashboard.filtered_shipments, 3);
        assert_eq!(dashboard.metrics.avg_days_display(), "3.00");

        match dashboard.chart("state-percent") {
            Some(Chart::Bar(bar)) => {
                assert_eq!(bar.data, vec![Datum::new("A", 66.67), Datum::new("B", 33.33)]);
            }
            other => panic!("unexpected chart: {:?}", other),
        }
    }

    #[test]
    fn test_city_payment_fills_missing_pairs_with_zero() {
        let dashboard = Dashboard::build(&sample_dataset(), &Selection::All);
        match dashboard.chart("city-payment") {
            Some(Chart::GroupedBar(chart)) => {
                assert_eq!(chart.categories, vec!["X", "Y"]);
                assert_eq!(chart.series[0].name, "COD");
                assert_eq!(chart.series[0].values, vec![2.0, 0.0]);
                assert_eq!(chart.series[1].name, "Prepaid");
                assert_eq!(chart.series[1].values, vec![0.0, 1.0]);
            }
            other => panic!("unexpected chart: {:?}", other),
        }
    }

    #[test]
    fn test_empty_selection_renders_empty_charts() {
        let dashboard =
            Dashboard::build(&sample_dataset(), &Selection::from_states(Vec::<String>::new()));
        assert_eq!(dashboard.filtered_shipments, 0);
        assert!(dashboard.selected_states.is_empty());
        assert!(dashboard.panels().all(|p| p.chart.is_empty()));
        assert!(dashboard
            .panels()
            .all(|p| p.chart.to_svg().contains("No data")));
    }

    #[test]
    fn test_unknown_chart_id() {
        let dashboard = Dashboard::build(&sample_dataset(), &Selection::All);
        assert!(dashboard.chart("nope").is_none());
    }
}
