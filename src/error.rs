use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the shipment table.
#[derive(Debug, Error)]
pub enum DataError {
    /// The flattened CSV is not on disk. This is the one failure shown to
    /// dashboard users; rendering stops after it.
    #[error("❌ {} not found. Run the flatten step first.", .path.display())]
    MissingFile { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no \"{column}\" column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("loader task failed: {0}")]
    Task(String),
}

impl DataError {
    pub fn is_missing_file(&self) -> bool {
        matches!(self, DataError::MissingFile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_message_names_path() {
        let err = DataError::MissingFile {
            path: PathBuf::from("output/flattened_shipments.csv"),
        };
        assert!(err.is_missing_file());
        assert_eq!(
            err.to_string(),
            "❌ output/flattened_shipments.csv not found. Run the flatten step first."
        );
    }
}
