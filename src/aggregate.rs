//! Group-and-count summaries over a filtered view.
//!
//! Every function here is pure and returns an empty vector for an empty view.

use crate::filter::FilteredView;
use crate::models::ShipmentRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptBucket {
    pub attempts: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTabCell {
    pub city: String,
    pub payment_type: String,
    pub count: usize,
}

/// Shipments per distinct attempt count, ascending by attempt count.
/// Rows with a blank attempt cell are not counted.
pub fn attempt_distribution(view: &FilteredView<'_>) -> Vec<AttemptBucket> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for attempts in view.iter().filter_map(|r| r.delivery_attempts) {
        *counts.entry(attempts).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(attempts, count)| AttemptBucket { attempts, count })
        .collect()
}

/// Percentage of shipments per drop state.
pub fn state_share(view: &FilteredView<'_>) -> Vec<Share> {
    percent_share(view, |r| &r.drop_state)
}

/// Percentage of shipments per drop city.
pub fn city_share(view: &FilteredView<'_>) -> Vec<Share> {
    percent_share(view, |r| &r.drop_city)
}

/// Raw shipment count per payment type, most common first.
pub fn payment_counts(view: &FilteredView<'_>) -> Vec<CategoryCount> {
    value_counts(view, |r| &r.payment_type)
        .into_iter()
        .map(|(label, count)| CategoryCount { label, count })
        .collect()
}

/// Shipment count per (city, payment type), ordered by city then payment type.
pub fn city_payment_crosstab(view: &FilteredView<'_>) -> Vec<CrossTabCell> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for r in view.iter() {
        *counts
            .entry((r.drop_city.as_str(), r.payment_type.as_str()))
            .or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((city, payment_type), count)| CrossTabCell {
            city: city.to_string(),
            payment_type: payment_type.to_string(),
            count,
        })
        .collect()
}

fn percent_share<F>(view: &FilteredView<'_>, key: F) -> Vec<Share>
where
    F: Fn(&ShipmentRecord) -> &String,
{
    let total = view.len();
    value_counts(view, key)
        .into_iter()
        .map(|(label, count)| Share {
            label,
            count,
            percent: round2(count as f64 / total as f64 * 100.0),
        })
        .collect()
}

/// Count per key, sorted by count descending with ties broken by label.
fn value_counts<F>(view: &FilteredView<'_>, key: F) -> Vec<(String, usize)>
where
    F: Fn(&ShipmentRecord) -> &String,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in view.iter() {
        *counts.entry(key(r).as_str()).or_insert(0) += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Two decimals, exact halves to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter, Selection};
    use crate::models::{sample_dataset, shipment, Dataset};

    fn wider_dataset() -> Dataset {
        Dataset::new(vec![
            shipment("Kerala", "Kochi", "COD", 2.0, 1),
            shipment("Kerala", "Kochi", "Prepaid", 3.0, 2),
            shipment("Kerala", "Thrissur", "COD", 4.0, 1),
            shipment("Assam", "Guwahati", "Prepaid", 6.0, 3),
            shipment("Assam", "Guwahati", "Prepaid", 5.0, 1),
            shipment("Goa", "Panaji", "COD", 1.0, 2),
            shipment("Goa", "Margao", "COD", 2.0, 1),
        ])
    }

    #[test]
    fn test_sample_scenario() {
        let data = sample_dataset();
        let view = filter(&data, &Selection::All);

        assert_eq!(
            attempt_distribution(&view),
            vec![
                AttemptBucket { attempts: 1, count: 2 },
                AttemptBucket { attempts: 2, count: 1 },
            ]
        );

        let states: Vec<(String, f64)> = state_share(&view)
            .into_iter()
            .map(|s| (s.label, s.percent))
            .collect();
        assert_eq!(
            states,
            vec![("A".to_string(), 66.67), ("B".to_string(), 33.33)]
        );
    }

    #[test]
    fn test_share_halves_round_to_even() {
        let mut rows: Vec<_> = (0..31)
            .map(|_| shipment("A", "X", "COD", 1.0, 1))
            .collect();
        rows.push(shipment("B", "Y", "COD", 1.0, 1));
        let data = Dataset::new(rows);
        let view = filter(&data, &Selection::All);

        let got: Vec<(String, f64)> = state_share(&view)
            .into_iter()
            .map(|s| (s.label, s.percent))
            .collect();
        // 31/32 = 96.875 and 1/32 = 3.125
        assert_eq!(
            got,
            vec![("A".to_string(), 96.88), ("B".to_string(), 3.12)]
        );
    }

    #[test]
    fn test_attempt_buckets_sum_to_view_size() {
        let data = wider_dataset();
        for selection in [
            Selection::All,
            Selection::from_states(["Kerala"]),
            Selection::from_states(["Assam", "Goa"]),
        ] {
            let view = filter(&data, &selection);
            let total: usize = attempt_distribution(&view).iter().map(|b| b.count).sum();
            assert_eq!(total, view.len());
        }
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let data = wider_dataset();
        let view = filter(&data, &Selection::All);

        let states: f64 = state_share(&view).iter().map(|s| s.percent).sum();
        let cities: f64 = city_share(&view).iter().map(|s| s.percent).sum();
        assert!((states - 100.0).abs() <= 0.1, "states sum to {}", states);
        assert!((cities - 100.0).abs() <= 0.1, "cities sum to {}", cities);
    }

    #[test]
    fn test_share_ordering_by_count_then_label() {
        let data = wider_dataset();
        let view = filter(&data, &Selection::All);
        let labels: Vec<String> = city_share(&view).into_iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec!["Guwahati", "Kochi", "Margao", "Panaji", "Thrissur"]
        );
    }

    #[test]
    fn test_payment_counts() {
        let data = wider_dataset();
        let view = filter(&data, &Selection::All);
        assert_eq!(
            payment_counts(&view),
            vec![
                CategoryCount { label: "COD".to_string(), count: 4 },
                CategoryCount { label: "Prepaid".to_string(), count: 3 },
            ]
        );
    }

    #[test]
    fn test_crosstab_sorted_by_city_then_payment() {
        let data = wider_dataset();
        let view = filter(&data, &Selection::from_states(["Kerala"]));
        let cells: Vec<(String, String, usize)> = city_payment_crosstab(&view)
            .into_iter()
            .map(|c| (c.city, c.payment_type, c.count))
            .collect();
        assert_eq!(
            cells,
            vec![
                ("Kochi".to_string(), "COD".to_string(), 1),
                ("Kochi".to_string(), "Prepaid".to_string(), 1),
                ("Thrissur".to_string(), "COD".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_empty_view_yields_empty_aggregates() {
        let data = wider_dataset();
        let view = filter(&data, &Selection::from_states(Vec::<String>::new()));
        assert!(attempt_distribution(&view).is_empty());
        assert!(state_share(&view).is_empty());
        assert!(city_share(&view).is_empty());
        assert!(payment_counts(&view).is_empty());
        assert!(city_payment_crosstab(&view).is_empty());
    }
}
