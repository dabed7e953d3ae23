//! Conversation reconstruction driver
//!
//! Runs root selection once, then alternates frontier expansion and path
//! materialization round by round until no path can be extended.
//!
//! ## Algorithm Overview
//!
//! 1. **Select Roots**: seed one path per root, index every other edge by id
//! 2. **Classify Seeds**: roots without a matching reply are lone messages
//! 3. **Expand**: grow every frontier path by one hop, branching on multiple replies
//! 4. **Prune**: move the messages consumed this round out of the remaining set
//! 5. **Materialize**: emit paths that cannot grow any further as this round's batch
//! 6. Repeat from 3 until the frontier is empty (fixed point)
//!
//! For an acyclic input whose longest reply chain has `D` hops the fixed point is
//! reached after exactly `D` rounds.

use crate::models::{ConversationRecord, MessageEdge, RoundBatch};

use super::super::config::ReconstructionConfig;
use super::super::error::ThreadingError;
use super::super::partition::reconstruct_partitioned;
use super::super::path_state::PathState;
use super::super::stats::ReconstructionStats;
use super::frontier::expand_frontier;
use super::materializer::split_round;
use super::root_selection::{EdgeIndex, select_roots};

/// Result of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    /// The round extended `extended` paths; more rounds may follow
    Progressed { extended: usize },
    /// No path can be extended; the run is complete
    FixedPoint,
}

/// Complete output of a reconstruction run.
#[derive(Debug, Clone, Default)]
pub struct Reconstruction {
    /// One batch per round that completed at least one conversation, ascending by round
    pub batches: Vec<RoundBatch>,
    pub stats: ReconstructionStats,
}

impl Reconstruction {
    pub fn records(&self) -> impl Iterator<Item = &ConversationRecord> {
        self.batches.iter().flat_map(|batch| batch.records.iter())
    }

    pub fn into_records(self) -> Vec<ConversationRecord> {
        self.batches
            .into_iter()
            .flat_map(|batch| batch.records)
            .collect()
    }
}

/// Round-by-round reconstruction over one edge relation.
#[derive(Debug)]
pub struct ThreadReconstructor {
    config: ReconstructionConfig,
    index: EdgeIndex,
    frontier: Vec<PathState>,
    round: usize,
    batches: Vec<RoundBatch>,
    stats: ReconstructionStats,
}

impl ThreadReconstructor {
    /// Select roots and classify the seeds. Nothing is expanded yet.
    pub fn new(
        edges: Vec<MessageEdge>,
        config: ReconstructionConfig,
    ) -> Result<Self, ThreadingError> {
        let selection = select_roots(edges)?;

        let mut stats = ReconstructionStats {
            roots: selection.seeds.len(),
            self_referential_roots: selection.self_referential_roots,
            ..Default::default()
        };

        let seeded = split_round(selection.seeds, &selection.index);
        // A seed is a single message, so nothing can be terminal with a real flow yet
        debug_assert!(seeded.terminal.is_empty());
        stats.lone_roots = seeded.dropped.len();

        log::debug!(
            "selected {} roots ({} lone), {} reply edges indexed",
            stats.roots,
            stats.lone_roots,
            selection.index.len()
        );

        Ok(Self {
            config,
            index: selection.index,
            frontier: seeded.extendable,
            round: 0,
            batches: Vec::new(),
            stats,
        })
    }

    /// Number of rounds run so far.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Paths waiting to be extended in the next round.
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Edges not consumed so far.
    pub fn remaining_edges(&self) -> usize {
        self.index.len()
    }

    /// Run one round: expand, prune, materialize
    pub fn step(&mut self) -> Result<Convergence, ThreadingError> {
        if self.frontier.is_empty() {
            return Ok(Convergence::FixedPoint);
        }

        if self.round >= self.config.max_rounds {
            return Err(ThreadingError::RoundLimitExceeded {
                max_rounds: self.config.max_rounds,
            });
        }
        self.round += 1;

        let frontier = std::mem::take(&mut self.frontier);
        let frontier_len = frontier.len();
        let expansion = expand_frontier(frontier, &self.index)?;

        // Every frontier path has a resolvable candidate, so some path must grow
        let extended = expansion.extended.len();
        if extended == 0 {
            return Err(ThreadingError::NoProgress {
                round: self.round,
                frontier: frontier_len,
            });
        }

        // Rounds that only revisit earlier messages consume nothing new
        self.stats.consumed_edges += self.index.remove_consumed(expansion.consumed);

        let mut paths = expansion.extended;
        paths.extend(expansion.dead_ends);
        let split = split_round(paths, &self.index);

        log::debug!(
            "round {}: {} paths extended, {} conversations completed, {} edges remaining",
            self.round,
            extended,
            split.terminal.len(),
            self.index.len()
        );

        if !split.terminal.is_empty() {
            self.stats.conversations += split.terminal.len();
            if let Some(longest) = split.terminal.iter().map(|record| record.length).max() {
                self.stats.longest_conversation = self.stats.longest_conversation.max(longest);
            }
            self.batches.push(RoundBatch {
                round: self.round,
                records: split.terminal,
            });
        }

        self.frontier = split.extendable;
        Ok(Convergence::Progressed { extended })
    }

    /// Step until the fixed point and return everything materialized.
    pub fn run(mut self) -> Result<Reconstruction, ThreadingError> {
        while let Convergence::Progressed { .. } = self.step()? {}
        Ok(self.finish())
    }

    fn finish(mut self) -> Reconstruction {
        self.stats.rounds = self.round;
        self.stats.unreachable_edges = self.index.len();

        if !self.index.is_empty() {
            log::warn!(
                "{} reply edges are not reachable from any root",
                self.index.len()
            );
        }

        Reconstruction {
            batches: self.batches,
            stats: self.stats,
        }
    }
}

/// Reconstruct all conversations in `edges`
///
/// This is the main entry point. Dispatches to the partitioned parallel
/// implementation when `config.parallel` is set.
pub fn reconstruct_conversations(
    edges: Vec<MessageEdge>,
    config: &ReconstructionConfig,
) -> Result<Reconstruction, ThreadingError> {
    if config.parallel {
        return reconstruct_partitioned(edges, config);
    }

    let reconstruction = ThreadReconstructor::new(edges, config.clone())?.run()?;

    log::info!(
        "reconstructed {} conversations from {} roots in {} rounds",
        reconstruction.stats.conversations,
        reconstruction.stats.roots,
        reconstruction.stats.rounds
    );

    Ok(reconstruction)
}
