//! Shared dashboard logic for the page and the JSON API.

use crate::dashboard::Dashboard;
use crate::error::DataError;
use crate::filter::Selection;
use crate::loader::DatasetCache;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// Service
// ============================================================================

pub struct DashboardService {
    cache: DatasetCache,
}

impl DashboardService {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            cache: DatasetCache::new(data_path),
        }
    }

    /// CSV the cache reads from.
    pub fn data_path(&self) -> &Path {
        self.cache.path()
    }

    /// Run one render cycle for `selection`.
    pub async fn dashboard(&self, selection: &Selection) -> Result<Dashboard, DataError> {
        let data = self.cache.get().await?;
        let dashboard = Dashboard::build(&data, selection);
        debug!(
            "Rendered dashboard: {} of {} shipments selected",
            dashboard.filtered_shipments, dashboard.total_shipments
        );
        Ok(dashboard)
    }

    pub async fn states(&self) -> Result<Vec<String>, DataError> {
        Ok(self.cache.get().await?.states())
    }
}
