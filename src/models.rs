use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::SystemTime;

/// Column names produced by the flatten step.
pub const COL_DROP_STATE: &str = "Drop State";
pub const COL_DROP_CITY: &str = "Drop City";
pub const COL_PAYMENT_TYPE: &str = "Payment type";
pub const COL_DAYS_TAKEN: &str = "Days taken for delivery";
pub const COL_ATTEMPTS: &str = "Number of delivery attempts";

/// Raw row of the flattened CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRecord {
    #[serde(rename = "Drop State")]
    pub drop_state: String,
    #[serde(rename = "Drop City")]
    pub drop_city: String,
    #[serde(rename = "Payment type")]
    pub payment_type: String,
    #[serde(rename = "Days taken for delivery")]
    pub days_taken: Option<f64>,
    #[serde(rename = "Number of delivery attempts")]
    pub delivery_attempts: Option<f64>,
}

/// One shipment as the dashboard sees it. Blank numeric cells stay `None`
/// and are skipped by the statistics they would feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentRecord {
    pub drop_state: String,
    pub drop_city: String,
    pub payment_type: String,
    pub days_taken: Option<f64>,
    pub delivery_attempts: Option<u32>,
}

impl CsvRecord {
    pub fn to_shipment(&self) -> anyhow::Result<ShipmentRecord> {
        let delivery_attempts = match self.delivery_attempts {
            None => None,
            Some(raw)
                if raw.is_finite()
                    && raw >= 0.0
                    && raw <= f64::from(u32::MAX)
                    && raw.fract() == 0.0 =>
            {
                Some(raw as u32)
            }
            Some(raw) => anyhow::bail!("{} must be a whole number, got {}", COL_ATTEMPTS, raw),
        };

        let days_taken = self.days_taken.filter(|d| d.is_finite());

        Ok(ShipmentRecord {
            drop_state: self.drop_state.clone(),
            drop_city: self.drop_city.clone(),
            payment_type: self.payment_type.clone(),
            days_taken,
            delivery_attempts,
        })
    }
}

/// The loaded shipment table. Read-only once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<ShipmentRecord>,
    pub source: PathBuf,
    pub modified: Option<SystemTime>,
    /// File size in bytes at load time.
    pub size: u64,
    pub loaded_at: DateTime<Utc>,
    pub skipped_rows: usize,
}

impl Dataset {
    pub fn new(records: Vec<ShipmentRecord>) -> Self {
        Self {
            records,
            source: PathBuf::new(),
            modified: None,
            size: 0,
            loaded_at: Utc::now(),
            skipped_rows: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct drop states, ascending.
    pub fn states(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.drop_state.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn shipment(state: &str, city: &str, payment: &str, days: f64, attempts: u32) -> ShipmentRecord {
    ShipmentRecord {
        drop_state: state.to_string(),
        drop_city: city.to_string(),
        payment_type: payment.to_string(),
        days_taken: Some(days),
        delivery_attempts: Some(attempts),
    }
}

/// The three-row dataset used across the pipeline tests.
#[cfg(test)]
pub(crate) fn sample_dataset() -> Dataset {
    Dataset::new(vec![
        shipment("A", "X", "COD", 2.0, 1),
        shipment("A", "Y", "Prepaid", 4.0, 2),
        shipment("B", "X", "COD", 3.0, 1),
    ])
}
