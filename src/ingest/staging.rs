//! Staging directory for reconstructed conversations
//!
//! Each round batch is written as `conversations/conv_{round}.json`, one JSON
//! record per line, for the bulk loader to pick up. Files are written to a
//! temporary file in the same directory and renamed into place, so a loader
//! never sees a half-written batch.
//!
//! Creating the staging area removes batches left over from a previous run: a
//! rebuild must not mix with an older, possibly deeper, result.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::models::{ConversationRecord, RoundBatch};

const CONVERSATIONS_DIR: &str = "conversations";
const BATCH_PREFIX: &str = "conv_";
const BATCH_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("staging I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode conversation record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to decode {path} line {line}: {source}")]
    Decode {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StagingError + '_ {
    move |source| StagingError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// File written for one round batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedBatch {
    pub round: usize,
    pub path: PathBuf,
    pub records: usize,
}

/// Staging directory holding the conversation batches.
#[derive(Debug, Clone)]
pub struct StagingArea {
    conversations_dir: PathBuf,
}

impl StagingArea {
    /// Create `<staging_path>/conversations` and clear stale batches
    pub fn create(staging_path: &Path) -> Result<Self, StagingError> {
        let conversations_dir = staging_path.join(CONVERSATIONS_DIR);
        fs::create_dir_all(&conversations_dir).map_err(io_error(&conversations_dir))?;

        let area = Self { conversations_dir };
        let removed = area.clear_batches()?;
        if removed > 0 {
            log::info!(
                "removed {} stale conversation batches from {}",
                removed,
                area.conversations_dir.display()
            );
        }

        Ok(area)
    }

    pub fn conversations_dir(&self) -> &Path {
        &self.conversations_dir
    }

    /// Path of the batch file for `round`
    pub fn batch_path(&self, round: usize) -> PathBuf {
        self.conversations_dir
            .join(format!("{BATCH_PREFIX}{round}.{BATCH_EXTENSION}"))
    }

    /// Write a single round batch atomically
    pub fn write_batch(&self, batch: &RoundBatch) -> Result<StagedBatch, StagingError> {
        let path = self.batch_path(batch.round);
        let temp = NamedTempFile::new_in(&self.conversations_dir)
            .map_err(io_error(&self.conversations_dir))?;

        {
            let mut writer = BufWriter::new(temp.as_file());
            for record in &batch.records {
                serde_json::to_writer(&mut writer, record)?;
                writer.write_all(b"\n").map_err(io_error(temp.path()))?;
            }
            writer.flush().map_err(io_error(temp.path()))?;
        }

        temp.persist(&path).map_err(|e| StagingError::Io {
            path: path.clone(),
            source: e.error,
        })?;

        log::info!(
            "wrote {} conversations of round {} to {}",
            batch.records.len(),
            batch.round,
            path.display()
        );

        Ok(StagedBatch {
            round: batch.round,
            path,
            records: batch.records.len(),
        })
    }

    /// Write every batch, in round order
    pub fn write_all(&self, batches: &[RoundBatch]) -> Result<Vec<StagedBatch>, StagingError> {
        batches.iter().map(|batch| self.write_batch(batch)).collect()
    }

    /// Staged batch files, ascending by round
    pub fn staged_batches(&self) -> Result<Vec<(usize, PathBuf)>, StagingError> {
        let entries = fs::read_dir(&self.conversations_dir).map_err(io_error(&self.conversations_dir))?;

        let mut batches = Vec::new();
        for entry in entries {
            let path = entry.map_err(io_error(&self.conversations_dir))?.path();
            if let Some(round) = batch_round(&path) {
                batches.push((round, path));
            }
        }
        batches.sort_by_key(|(round, _)| *round);
        Ok(batches)
    }

    fn clear_batches(&self) -> Result<usize, StagingError> {
        let stale = self.staged_batches()?;
        for (_, path) in &stale {
            fs::remove_file(path).map_err(io_error(path))?;
        }
        Ok(stale.len())
    }
}

/// Round number encoded in a batch file name, if it is one
fn batch_round(path: &Path) -> Option<usize> {
    if path.extension()?.to_str()? != BATCH_EXTENSION {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix(BATCH_PREFIX)?
        .parse()
        .ok()
}

/// Read a staged batch file back into records
pub fn read_batch(path: &Path) -> Result<Vec<ConversationRecord>, StagingError> {
    let file = File::open(path).map_err(io_error(path))?;

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_error(path))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| StagingError::Decode {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
