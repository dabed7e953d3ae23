//! Frontier expansion
//!
//! Advances every in-progress path by exactly one hop. A path whose tail has
//! several matching replies branches into one new path per reply.

use std::collections::HashSet;

use crate::models::MessageId;

use super::super::error::ThreadingError;
use super::super::path_state::PathState;
use super::root_selection::EdgeIndex;

/// Outcome of one expansion round.
#[derive(Debug, Default)]
pub struct Expansion {
    /// Paths grown by one hop
    pub extended: Vec<PathState>,
    /// Paths none of whose candidates matched
    pub dead_ends: Vec<PathState>,
    /// Messages matched this round, to be moved out of the remaining set
    pub consumed: HashSet<MessageId>,
}

/// Expand every path in `frontier` against `index`
///
/// Candidates resolve against every non-root edge, including the ones consumed
/// in earlier rounds, so a message reached by several routes is followed by each
/// of them whatever round they arrive in. Matched ids are only collected here
/// and moved out of the remaining set by the caller afterwards.
///
/// ## Example
///
/// ```text
/// frontier: [1] with candidates {2, 3}
/// index:    2 → {4}, 3 → {}
///
/// extended: [1, 2] (candidates {4}), [1, 3] (no candidates)
/// consumed: {2, 3}
/// ```
pub fn expand_frontier(
    frontier: Vec<PathState>,
    index: &EdgeIndex,
) -> Result<Expansion, ThreadingError> {
    let mut expansion = Expansion::default();

    for path in frontier {
        let mut matched_any = false;

        for &candidate_id in &path.next_candidate_ids {
            // Replies that were never extracted end the path
            let Some(matched) = index.resolve(candidate_id) else {
                continue;
            };

            expansion.extended.push(path.extend(matched)?);
            expansion.consumed.insert(candidate_id);
            matched_any = true;
        }

        if !matched_any {
            expansion.dead_ends.push(path);
        }
    }

    Ok(expansion)
}
