//! Conversation thread reconstruction for short-message reply data.
//!
//! Takes a flat relation of messages and the ids that replied to them and
//! rebuilds every root-to-leaf conversation path, staged per round for a
//! downstream bulk loader.

pub mod error;
pub mod ingest;
pub mod models;
pub mod threading;

pub use error::IngestError;
pub use models::{ConversationRecord, MessageEdge, MessageId, RoundBatch};
pub use threading::{Reconstruction, ReconstructionConfig, reconstruct_conversations};

use env_logger::Env;
use std::sync::Once;

static LOGGER: Once = Once::new();

/// Initialise `env_logger` once, honouring `RUST_LOG` with an `info` default.
pub fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(Env::default().default_filter_or("info"))
            .format_timestamp(None)
            .init();
    });
}
