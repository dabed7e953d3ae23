//! Cycle detection for conversation reconstruction
//!
//! Ensures a path never follows a reply edge back onto a message it already
//! visited. Such an edge means the reply graph contains a cycle, which would
//! otherwise extend the path forever.

use std::collections::HashSet;

use crate::models::MessageId;

/// Check if following `candidate_id` would revisit a message already in `flow`
///
/// ## Example
///
/// ```text
/// Current flow:  A → B → C
///
/// Candidate A (C replied to by A): true (cycle A → B → C → A)
/// Candidate D:                      false (safe to extend)
/// ```
pub fn detect_cycle_in_flow(flow: &[MessageId], candidate_id: MessageId) -> bool {
    flow.contains(&candidate_id)
}

/// Check whether a flow itself visits any message twice
///
/// Used to validate materialized records. Returns the first repeated id.
pub fn find_repeated_message(flow: &[MessageId]) -> Option<MessageId> {
    let mut visited_message_ids = HashSet::with_capacity(flow.len());
    flow.iter()
        .copied()
        .find(|message_id| !visited_message_ids.insert(*message_id))
}
