//! Conversation reconstruction algorithm
//!
//! Rebuilds root-to-leaf conversation paths from a flat reply relation, one
//! hop per round.
//!
//! ## Main Entry Point
//!
//! Use `reconstruct_conversations()` to reconstruct a whole edge relation, or
//! drive a `ThreadReconstructor` round by round with `step()`.

pub(crate) mod cycle_detection;
mod frontier;
mod materializer;
mod reconstruct;
mod root_selection;

pub use frontier::{Expansion, expand_frontier};
pub use materializer::{RoundSplit, split_round};
pub use reconstruct::{Convergence, Reconstruction, ThreadReconstructor, reconstruct_conversations};
pub use root_selection::{EdgeIndex, RootSelection, select_roots};
