//! Loading the flattened shipment table from disk.
//!
//! [`DatasetCache`] keeps the last load around and hands out the same
//! `Arc<Dataset>` until the file's modification time or size changes.

use crate::error::DataError;
use crate::models::{
    CsvRecord, Dataset, ShipmentRecord, COL_ATTEMPTS, COL_DAYS_TAKEN, COL_DROP_CITY,
    COL_DROP_STATE, COL_PAYMENT_TYPE,
};
use chrono::Utc;
use csv::ReaderBuilder;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const REQUIRED_COLUMNS: [&str; 5] = [
    COL_DROP_STATE,
    COL_DROP_CITY,
    COL_PAYMENT_TYPE,
    COL_DAYS_TAKEN,
    COL_ATTEMPTS,
];

/// Records parsed from a CSV source, plus how many rows were dropped.
#[derive(Debug)]
pub struct ParsedRows {
    pub records: Vec<ShipmentRecord>,
    pub skipped: usize,
}

/// Parse shipment rows from any reader. Rows that do not deserialize are
/// skipped and counted.
pub fn read_shipments<R: Read>(source: R, path: &Path) -> Result<ParsedRows, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader.headers().map_err(|source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .copied()
        .find(|c| !headers.iter().any(|h| h == *c))
    {
        return Err(DataError::MissingColumn {
            path: path.to_path_buf(),
            column,
        });
    }

    let mut records = Vec::new();
    let mut skipped = 0;

    for (i, row) in reader.deserialize::<CsvRecord>().enumerate() {
        match row.map_err(anyhow::Error::from).and_then(|r| r.to_shipment()) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                debug!("Skipping row {}: {}", i + 2, e);
            }
        }
    }

    Ok(ParsedRows { records, skipped })
}

/// Load the full shipment table from `path`.
pub fn load_csv(path: &Path) -> Result<Dataset, DataError> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DataError::MissingFile {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(DataError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let metadata = file.metadata().ok();
    let modified = metadata.as_ref().and_then(|m| m.modified().ok());
    let size = metadata.as_ref().map_or(0, |m| m.len());
    let parsed = read_shipments(io::BufReader::new(file), path)?;

    if parsed.skipped > 0 {
        warn!(
            "Skipped {} malformed rows while reading {}",
            parsed.skipped,
            path.display()
        );
    }
    info!(
        "Loaded {} shipments from {}",
        parsed.records.len(),
        path.display()
    );

    Ok(Dataset {
        records: parsed.records,
        source: path.to_path_buf(),
        modified,
        size,
        loaded_at: Utc::now(),
        skipped_rows: parsed.skipped,
    })
}

/// Lazily loaded, read-only view of the shipment file, reloaded when the
/// file's modification time or size moves.
pub struct DatasetCache {
    path: PathBuf,
    cached: Arc<RwLock<Option<Arc<Dataset>>>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> Result<Arc<Dataset>, DataError> {
        let (modified, size) = match self.fingerprint().await {
            Ok(m) => m,
            Err(e) => {
                if e.is_missing_file() {
                    self.invalidate().await;
                }
                return Err(e);
            }
        };

        // Check cache first
        {
            let cache = self.cached.read().await;
            if let Some(data) = cache.as_ref() {
                // Same-tick rewrites can keep the mtime.
                if data.modified == modified && data.size == size {
                    return Ok(Arc::clone(data));
                }
                info!("{} changed on disk, reloading", self.path.display());
            }
        }

        let path = self.path.clone();
        let data = tokio::task::spawn_blocking(move || load_csv(&path))
            .await
            .map_err(|e| DataError::Task(e.to_string()))??;
        let data = Arc::new(data);

        // Update cache
        {
            let mut cache = self.cached.write().await;
            *cache = Some(Arc::clone(&data));
        }

        Ok(data)
    }

    /// Drop the cached table so the next `get` re-reads the file.
    pub async fn invalidate(&self) {
        let mut cache = self.cached.write().await;
        *cache = None;
    }

    async fn fingerprint(&self) -> Result<(Option<SystemTime>, u64), DataError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Ok((meta.modified().ok(), meta.len())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(DataError::MissingFile {
                path: self.path.clone(),
            }),
            Err(source) => Err(DataError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    const HEADER: &str =
        "Drop State,Drop City,Payment type,Days taken for delivery,Number of delivery attempts\n";

    fn write_csv(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("flattened_shipments.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_reads_all_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "A,X,COD,2,1\nA,Y,Prepaid,4,2\nB,X,COD,3,1\n");

        let data = load_csv(&path).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.skipped_rows, 0);
        assert_eq!(data.records[1].payment_type, "Prepaid");
        assert_eq!(data.records[1].delivery_attempts, Some(2));
        assert!(data.modified.is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.is_missing_file());
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "A,X,COD,2,1\nA,Y,Prepaid,four,2\nB,X,COD,3,1.5\nB,Z,COD,,\n");

        let data = load_csv(&path).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.skipped_rows, 2);
        assert_eq!(data.records[1].days_taken, None);
        assert_eq!(data.records[1].delivery_attempts, None);
    }

    #[test]
    fn test_missing_column_rejected() {
        let csv = "Drop State,Drop City,Payment type,Days taken for delivery\nA,X,COD,2\n";
        let err = read_shipments(csv.as_bytes(), Path::new("in-memory.csv")).unwrap_err();
        match err {
            DataError::MissingColumn { column, .. } => assert_eq!(column, COL_ATTEMPTS),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "Order ID,Drop State,Drop City,Payment type,Days taken for delivery,Number of delivery attempts\n\
                   17,A,X,COD,2,1\n";
        let parsed = read_shipments(csv.as_bytes(), Path::new("in-memory.csv")).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].drop_state, "A");
    }

    #[tokio::test]
    async fn test_cache_reuses_until_mtime_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "A,X,COD,2,1\n");
        let cache = DatasetCache::new(&path);

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let path = write_csv(&dir, "A,X,COD,2,1\nB,Y,COD,5,3\n");
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(120))
            .unwrap();

        let third = cache.get().await.unwrap();
        assert!(!Arc::ptr_eq(&second, &third));
        assert_eq!(third.len(), 2);
    }

    #[tokio::test]
    async fn test_cache_reloads_same_mtime_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "A,X,COD,2,1\n");
        let cache = DatasetCache::new(&path);
        let first = cache.get().await.unwrap();
        let stamp = first.modified.unwrap();

        let path = write_csv(&dir, "A,X,COD,2,1\nB,Y,COD,5,3\n");
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(stamp)
            .unwrap();

        let second = cache.get().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn test_cache_reports_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "A,X,COD,2,1\n");
        let cache = DatasetCache::new(&path);
        assert!(cache.get().await.is_ok());

        std::fs::remove_file(&path).unwrap();
        let err = cache.get().await.unwrap_err();
        assert!(err.is_missing_file());
    }
}
