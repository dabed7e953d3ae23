//! Conversation threading module
//!
//! This module rebuilds conversation threads from a flat table of reply
//! relationships between messages. Each output record is one ordered path from
//! a root message down to a leaf; a message with several replies splits its
//! thread into several records sharing a common prefix.
//!
//! ## Threading Strategy
//!
//! The reconstruction is a breadth-first, set-at-a-time walk:
//!
//! 1. **Root Selection**: messages that reply to nothing seed one path each
//! 2. **Frontier Expansion**: every path grows by one hop per round, looking
//!    replies up in an index of the reply edges
//! 3. **Path Materialization**: paths that cannot grow become `ConversationRecord`s,
//!    grouped by the round they completed in
//!
//! Consumed edges are pruned from the remaining set after every round but stay
//! resolvable, so a message reached by several routes is followed by each of
//! them. A flow never holds the same message twice: reply cycles fail the run
//! with `ThreadingError::CyclicStructure` instead of looping.
//!
//! ## Module Structure
//!
//! - `path_state`: Working path data structure
//! - `algorithm`: Root selection, expansion, materialization and the round driver
//! - `partition`: Connected-component partitioning for parallel runs
//! - `stats`: Run statistics

pub mod algorithm;
pub mod config;
pub mod error;
pub mod partition;
pub mod path_state;
pub mod stats;

// Re-export main types and functions
pub use algorithm::{Convergence, Reconstruction, ThreadReconstructor, reconstruct_conversations};
pub use config::ReconstructionConfig;
pub use error::ThreadingError;
pub use partition::{partition_components, reconstruct_partitioned};
pub use path_state::{PathPhase, PathState};
pub use stats::ReconstructionStats;
