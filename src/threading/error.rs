use thiserror::Error;

use crate::models::MessageId;

/// Failures that abort a reconstruction run. No records are produced once any of
/// these is returned.
#[derive(Debug, Error)]
pub enum ThreadingError {
    #[error("message {0} appears more than once in the edge relation")]
    DuplicateMessage(MessageId),
    #[error("reply cycle: message {message_id} already occurs in flow {flow:?}")]
    CyclicStructure {
        message_id: MessageId,
        flow: Vec<MessageId>,
    },
    #[error("no progress in round {round}: none of {frontier} frontier paths could be extended")]
    NoProgress { round: usize, frontier: usize },
    #[error("reconstruction exceeded the limit of {max_rounds} rounds")]
    RoundLimitExceeded { max_rounds: usize },
    #[error("failed to create thread pool: {0}")]
    ThreadPool(String),
}

impl ThreadingError {
    pub fn cyclic(message_id: MessageId, flow: &[MessageId]) -> Self {
        ThreadingError::CyclicStructure {
            message_id,
            flow: flow.to_vec(),
        }
    }

    /// Whether the failure was caused by a cycle in the reply graph.
    pub fn is_cyclic(&self) -> bool {
        matches!(
            self,
            ThreadingError::CyclicStructure { .. } | ThreadingError::NoProgress { .. }
        )
    }
}
