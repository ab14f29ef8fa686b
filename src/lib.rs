pub mod aggregate;
pub mod api;
pub mod charts;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod models;

pub use dashboard::Dashboard;
pub use error::DataError;
pub use filter::{FilteredView, Selection};
pub use loader::DatasetCache;
pub use models::{Dataset, ShipmentRecord};

/// Default location of the flattened shipment table.
pub const DEFAULT_DATA_PATH: &str = "output/flattened_shipments.csv";
