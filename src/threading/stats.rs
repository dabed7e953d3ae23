//! Reconstruction statistics tracking.
//!
//! Tracks how the edge relation was consumed during a reconstruction run.

/// Statistics for a single reconstruction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconstructionStats {
    /// Number of rounds that extended at least one path
    pub rounds: usize,
    /// Number of root messages seeded
    pub roots: usize,
    /// Roots without any matching reply (no conversation emitted)
    pub lone_roots: usize,
    /// Roots that reply to themselves
    pub self_referential_roots: usize,
    /// Number of conversation records materialized
    pub conversations: usize,
    /// Non-root edges matched by some path
    pub consumed_edges: usize,
    /// Non-root edges never reached from any root
    pub unreachable_edges: usize,
    /// Length of the longest conversation
    pub longest_conversation: usize,
}

impl ReconstructionStats {
    /// Merge another ReconstructionStats into this one.
    ///
    /// Used to combine statistics from independent partitions. Counts are summed;
    /// rounds and the longest conversation take the maximum since partitions run
    /// their rounds side by side.
    pub fn merge(&mut self, other: ReconstructionStats) {
        self.rounds = self.rounds.max(other.rounds);
        self.roots += other.roots;
        self.lone_roots += other.lone_roots;
        self.self_referential_roots += other.self_referential_roots;
        self.conversations += other.conversations;
        self.consumed_edges += other.consumed_edges;
        self.unreachable_edges += other.unreachable_edges;
        self.longest_conversation = self.longest_conversation.max(other.longest_conversation);
    }
}
