//! Working state for the conversation reconstruction
//!
//! A `PathState` is one in-progress root-to-tail walk through the reply graph.
//! It only lives while reconstruction runs: every path either branches into
//! longer paths or is materialized exactly once into a `ConversationRecord`.

use crate::models::{ConversationRecord, MIN_CONVERSATION_LENGTH, MessageEdge, MessageId};

use super::algorithm::cycle_detection::detect_cycle_in_flow;
use super::error::ThreadingError;

/// Lifecycle of a path: `Seeded → Extending → Terminal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPhase {
    /// Created from a root edge, not yet extended
    Seeded,
    /// Extended by at least one hop
    Extending,
    /// No further reply can be matched
    Terminal,
}

/// A path being walked from its root.
///
/// ## Invariants
///
/// - `flow` starts at `root_id` and ends at `current_tail_id`
/// - no id occurs twice in `flow`
/// - `next_candidate_ids` holds the tail's replies, de-duplicated in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathState {
    pub root_id: MessageId,
    pub current_tail_id: MessageId,
    pub flow: Vec<MessageId>,
    pub next_candidate_ids: Vec<MessageId>,
    pub phase: PathPhase,
}

impl PathState {
    /// Seed a path from a root edge.
    ///
    /// A self-referential root gets no candidates at all, which makes it terminal
    /// with a single-message flow.
    pub fn seed(root: &MessageEdge) -> Self {
        let next_candidate_ids = if root.is_self_referential() {
            Vec::new()
        } else {
            candidate_ids(root)
        };

        PathState {
            root_id: root.message_id,
            current_tail_id: root.message_id,
            flow: vec![root.message_id],
            next_candidate_ids,
            phase: PathPhase::Seeded,
        }
    }

    /// Produce the path one hop longer, ending at `matched`.
    ///
    /// Fails when one of `matched`'s replies already occurs in the extended flow,
    /// since following it would walk the path back onto itself.
    pub fn extend(&self, matched: &MessageEdge) -> Result<PathState, ThreadingError> {
        let mut flow = Vec::with_capacity(self.flow.len() + 1);
        flow.extend_from_slice(&self.flow);
        flow.push(matched.message_id);

        let next_candidate_ids = candidate_ids(matched);
        if let Some(&looping_id) = next_candidate_ids
            .iter()
            .find(|id| detect_cycle_in_flow(&flow, **id))
        {
            return Err(ThreadingError::cyclic(looping_id, &flow));
        }

        Ok(PathState {
            root_id: self.root_id,
            current_tail_id: matched.message_id,
            flow,
            next_candidate_ids,
            phase: PathPhase::Extending,
        })
    }

    /// Close the path.
    ///
    /// A flow too short to be a conversation is handed back as a `Terminal`
    /// path instead of a record.
    pub fn materialize(mut self) -> Result<ConversationRecord, PathState> {
        self.phase = PathPhase::Terminal;
        if self.flow.len() < MIN_CONVERSATION_LENGTH {
            return Err(self);
        }
        ConversationRecord::from_flow(self.flow.clone()).ok_or(self)
    }
}

/// Replies of `edge` in order, without duplicates or the message itself.
fn candidate_ids(edge: &MessageEdge) -> Vec<MessageId> {
    let mut candidates: Vec<MessageId> = Vec::with_capacity(edge.response_ids.len());
    for &reply_id in &edge.response_ids {
        if reply_id == edge.message_id {
            log::warn!("message {} lists itself as a reply, ignoring", reply_id);
            continue;
        }
        if !candidates.contains(&reply_id) {
            candidates.push(reply_id);
        }
    }
    candidates
}
