//! Root selection
//!
//! Splits the edge relation into conversation roots and the remaining-edge
//! index that the frontier expander looks replies up in.

use std::collections::{HashMap, HashSet};

use crate::models::{MessageEdge, MessageId};

use super::super::error::ThreadingError;
use super::super::path_state::PathState;

/// Non-root edges keyed by message id.
///
/// The remaining set shrinks every round as matched messages are consumed and
/// drives the round bookkeeping. Consumed edges move to a side map so a path
/// that reaches the same message later, along a longer route, still follows it
/// and is duplicated through it.
#[derive(Debug, Clone, Default)]
pub struct EdgeIndex {
    edges: HashMap<MessageId, MessageEdge>,
    consumed: HashMap<MessageId, MessageEdge>,
}

impl EdgeIndex {
    /// Edge of any non-root message, consumed or not.
    pub fn resolve(&self, message_id: MessageId) -> Option<&MessageEdge> {
        self.edges
            .get(&message_id)
            .or_else(|| self.consumed.get(&message_id))
    }

    pub fn resolves(&self, message_id: MessageId) -> bool {
        self.edges.contains_key(&message_id) || self.consumed.contains_key(&message_id)
    }

    /// Number of remaining (not yet consumed) edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Move consumed messages out of the remaining set, returning how many were
    /// still remaining.
    pub fn remove_consumed<I>(&mut self, consumed: I) -> usize
    where
        I: IntoIterator<Item = MessageId>,
    {
        let mut moved = 0;
        for message_id in consumed {
            if let Some(edge) = self.edges.remove(&message_id) {
                self.consumed.insert(message_id, edge);
                moved += 1;
            }
        }
        moved
    }

    /// Ids left in the index, in ascending order.
    pub fn remaining_ids(&self) -> Vec<MessageId> {
        let mut ids: Vec<MessageId> = self.edges.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn insert(&mut self, edge: MessageEdge) {
        self.edges.insert(edge.message_id, edge);
    }
}

/// Result of partitioning the edge relation.
#[derive(Debug)]
pub struct RootSelection {
    /// One seeded path per root, in input order
    pub seeds: Vec<PathState>,
    /// Every non-root edge
    pub index: EdgeIndex,
    /// Roots that reply to themselves
    pub self_referential_roots: usize,
}

/// Partition `edges` into root seeds and the remaining-edge index
///
/// Fails on duplicate message ids: the relation must describe each message once.
pub fn select_roots(edges: Vec<MessageEdge>) -> Result<RootSelection, ThreadingError> {
    let mut seen_message_ids = HashSet::with_capacity(edges.len());
    let mut seeds = Vec::new();
    let mut index = EdgeIndex::default();
    let mut self_referential_roots = 0;

    for edge in edges {
        if !seen_message_ids.insert(edge.message_id) {
            return Err(ThreadingError::DuplicateMessage(edge.message_id));
        }

        if edge.is_root() {
            if edge.is_self_referential() {
                log::warn!("message {} replies to itself, treating as lone root", edge.message_id);
                self_referential_roots += 1;
            }
            seeds.push(PathState::seed(&edge));
        } else {
            index.insert(edge);
        }
    }

    Ok(RootSelection {
        seeds,
        index,
        self_referential_roots,
    })
}
