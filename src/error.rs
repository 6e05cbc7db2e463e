use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read log file {}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("log file {} is not valid UTF-8 at line {line_number}", path.display())]
    Encoding {
        path: PathBuf,
        line_number: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("record boundaries are inconsistent at index {index}: {reason}")]
    InvariantViolation { index: usize, reason: String },

    #[error("failed to open database {}", path.display())]
    StorageOpen {
        path: PathBuf,
        #[source]
        source: StoreFault,
    },

    #[error("{committed} written, aborted at record {record_number} (key {key})")]
    StorageWrite {
        record_number: usize,
        key: String,
        committed: usize,
        skipped: usize,
        #[source]
        source: StoreFault,
    },
}

#[derive(Debug, Error)]
pub enum StoreFault {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Rejected(String),
}
