use crate::models::{Dataset, ShipmentRecord};
use serde::Serialize;
use std::collections::BTreeSet;

/// Query parameter carrying one selected drop state.
pub const STATE_PARAM: &str = "state";
/// Marker written by the filter form so an empty submission means "no states".
pub const APPLIED_PARAM: &str = "applied";

/// Which drop states the user has picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "states", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    States(BTreeSet<String>),
}

impl Selection {
    pub fn from_states<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::States(states.into_iter().map(Into::into).collect())
    }

    /// Build a selection from decoded query pairs. No `state` and no
    /// `applied` marker means the untouched default of every state.
    pub fn from_query(pairs: &[(String, String)]) -> Self {
        let states: BTreeSet<String> = pairs
            .iter()
            .filter(|(k, _)| k == STATE_PARAM)
            .map(|(_, v)| v.clone())
            .collect();
        let applied = pairs.iter().any(|(k, _)| k == APPLIED_PARAM);

        if states.is_empty() && !applied {
            Selection::All
        } else {
            Selection::States(states)
        }
    }

    pub fn contains(&self, state: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::States(states) => states.contains(state),
        }
    }

    /// The selected states that actually exist in `available`, in its order.
    pub fn resolve(&self, available: &[String]) -> Vec<String> {
        available
            .iter()
            .filter(|s| self.contains(s))
            .cloned()
            .collect()
    }
}

/// Borrowed subset of a dataset. Never owns or mutates records.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a ShipmentRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn new(records: Vec<&'a ShipmentRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ShipmentRecord> + '_ {
        self.records.iter().copied()
    }
}

/// Restrict `data` to shipments whose drop state is selected.
pub fn filter<'a>(data: &'a Dataset, selection: &Selection) -> FilteredView<'a> {
    let records = data
        .records
        .iter()
        .filter(|r| selection.contains(&r.drop_state))
        .collect();
    FilteredView::new(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_dataset;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_all_states_is_identity() {
        let data = sample_dataset();
        let view = filter(&data, &Selection::All);
        let kept: Vec<&ShipmentRecord> = view.iter().collect();
        let original: Vec<&ShipmentRecord> = data.records.iter().collect();
        assert_eq!(kept, original);

        let explicit = filter(&data, &Selection::from_states(data.states()));
        assert_eq!(explicit.len(), data.len());
    }

    #[test]
    fn test_selection_intersects_available_states() {
        let data = sample_dataset();
        let selection = Selection::from_states(["B", "Z"]);
        let view = filter(&data, &selection);

        let states: BTreeSet<&str> = view.iter().map(|r| r.drop_state.as_str()).collect();
        assert_eq!(states, BTreeSet::from(["B"]));
        assert_eq!(selection.resolve(&data.states()), vec!["B"]);
    }

    #[test]
    fn test_empty_selection_is_empty_view() {
        let data = sample_dataset();
        let view = filter(&data, &Selection::from_states(Vec::<String>::new()));
        assert!(view.is_empty());
    }

    #[test]
    fn test_query_without_params_selects_all() {
        assert_eq!(Selection::from_query(&[]), Selection::All);
    }

    #[test]
    fn test_query_applied_without_states_selects_none() {
        let selection = Selection::from_query(&pairs(&[("applied", "1")]));
        assert_eq!(selection, Selection::States(BTreeSet::new()));
    }

    #[test]
    fn test_query_collects_repeated_states() {
        let selection = Selection::from_query(&pairs(&[
            ("state", "Kerala"),
            ("applied", "1"),
            ("state", "Assam"),
            ("other", "x"),
        ]));
        assert_eq!(selection, Selection::from_states(["Assam", "Kerala"]));
    }
}
