use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("run spec validation failed:\n{}", .failures.join("\n"))]
    Validation { failures: Vec<String> },

    #[error("malformed {record} record: {reason}")]
    Parse { record: String, reason: String },

    #[error("{style} has no rank in the {source_label} rankings")]
    MissingData { style: String, source_label: String },

    #[error("ledger at {} is not a sqlite store ({detected})", .path.display())]
    StoreFormat { path: PathBuf, detected: String },

    #[error("{what} not found: {}", .path.display())]
    NotFound { what: String, path: PathBuf },
}

impl BenchError {
    pub fn parse(record: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            record: record.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }
}
