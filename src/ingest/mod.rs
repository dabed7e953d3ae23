//! Offline ingestion pipeline
//!
//! Reads the reply relation, reconstructs every conversation and stages the
//! result per round for the bulk loader:
//!
//! ```text
//! edges.jsonl → parse_edges → reconstruct_conversations → StagingArea (conv_{round}.json)
//! ```
//!
//! The run is all-or-nothing. Parsing and reconstruction complete in memory
//! before anything is staged, so a malformed row or a reply cycle leaves the
//! staging directory untouched.

pub mod config;
pub mod parser;
pub mod staging;

use std::fs::File;
use std::io::BufReader;

pub use config::{ConfigError, IngestConfig};
pub use parser::{ParseRowError, parse_edges, parse_id_list};
pub use staging::{StagedBatch, StagingArea, StagingError, read_batch};

use crate::error::IngestError;
use crate::threading::{ReconstructionStats, reconstruct_conversations};

/// What an ingestion run produced.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    /// Rows read from the source
    pub messages: usize,
    pub stats: ReconstructionStats,
    pub staged: Vec<StagedBatch>,
}

/// Run the full pipeline for `config`
pub fn run(config: &IngestConfig) -> Result<IngestSummary, IngestError> {
    log::info!("extracting edges from {}", config.source_path.display());
    let file = File::open(&config.source_path).map_err(|source| IngestError::Source {
        path: config.source_path.clone(),
        source,
    })?;
    let edges = parse_edges(BufReader::new(file))?;
    let messages = edges.len();
    log::info!("finished extracting {} messages", messages);

    let reconstruction = reconstruct_conversations(edges, &config.threading)?;

    let staging = StagingArea::create(&config.staging_path)?;
    let staged = staging.write_all(&reconstruction.batches)?;
    log::info!(
        "staged {} batches in {}",
        staged.len(),
        staging.conversations_dir().display()
    );

    Ok(IngestSummary {
        messages,
        stats: reconstruction.stats,
        staged,
    })
}
