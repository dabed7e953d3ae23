use std::path::PathBuf;

use thiserror::Error;

use crate::ingest::{ConfigError, ParseRowError, StagingError};
use crate::threading::ThreadingError;

/// Top-level failure of an ingestion run. Every variant is fatal.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to open source {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed input: {0}")]
    Parse(#[from] ParseRowError),
    #[error("reconstruction failed: {0}")]
    Threading(#[from] ThreadingError),
    #[error("staging failed: {0}")]
    Staging(#[from] StagingError),
}
