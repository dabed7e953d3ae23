//! Path materialization
//!
//! Separates paths that can still grow from paths that have reached a leaf,
//! turning the latter into `ConversationRecord`s.

use crate::models::ConversationRecord;

use super::super::path_state::PathState;
use super::cycle_detection::find_repeated_message;
use super::root_selection::EdgeIndex;

/// Paths of one round split by whether they can be extended again.
#[derive(Debug, Default)]
pub struct RoundSplit {
    /// Paths with at least one candidate that resolves in the index
    pub extendable: Vec<PathState>,
    /// Completed conversations
    pub terminal: Vec<ConversationRecord>,
    /// Terminal paths too short to be a conversation
    pub dropped: Vec<PathState>,
}

/// Split `paths` against `index`
///
/// A candidate consumed in an earlier round still counts: the path is extended
/// through it again next round.
///
/// Every path lands in exactly one of `extendable`, `terminal` or `dropped`.
pub fn split_round(paths: Vec<PathState>, index: &EdgeIndex) -> RoundSplit {
    let mut split = RoundSplit::default();

    for path in paths {
        if path
            .next_candidate_ids
            .iter()
            .any(|candidate_id| index.resolves(*candidate_id))
        {
            split.extendable.push(path);
            continue;
        }

        debug_assert!(find_repeated_message(&path.flow).is_none());

        match path.materialize() {
            Ok(record) => split.terminal.push(record),
            Err(lone) => split.dropped.push(lone),
        }
    }

    split
}
