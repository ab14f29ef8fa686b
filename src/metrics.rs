//! Scalar summaries for the key metrics panel.

use crate::filter::FilteredView;
use serde::Serialize;
use std::collections::BTreeMap;

/// Shown in place of a statistic that has no input values.
pub const UNAVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub avg_days: Option<f64>,
    pub avg_attempts: Option<f64>,
    pub common_attempts: Option<u32>,
}

impl KeyMetrics {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        Self {
            avg_days: mean(view.iter().filter_map(|r| r.days_taken)),
            avg_attempts: mean(view.iter().filter_map(|r| r.delivery_attempts.map(f64::from))),
            common_attempts: mode(view.iter().filter_map(|r| r.delivery_attempts)),
        }
    }

    pub fn avg_days_display(&self) -> String {
        format_two_decimals(self.avg_days)
    }

    pub fn avg_attempts_display(&self) -> String {
        format_two_decimals(self.avg_attempts)
    }

    pub fn common_attempts_display(&self) -> String {
        self.common_attempts
            .map(|v| v.to_string())
            .unwrap_or_else(|| UNAVAILABLE.to_string())
    }
}

fn format_two_decimals(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

/// Arithmetic mean, `None` for no values.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Most frequent value. Ties go to the smallest value.
pub fn mode<I>(values: I) -> Option<u32>
where
    I: IntoIterator<Item = u32>,
{
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }

    // BTreeMap iterates ascending, so keeping only strictly larger counts
    // leaves the smallest value among the tied maxima.
    let mut best: Option<(u32, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}
