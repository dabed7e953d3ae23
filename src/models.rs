use serde::{Deserialize, Serialize};

/// Identifier of a single message (tweet).
pub type MessageId = i64;

/// Shortest flow that counts as a conversation. A lone message is not one.
pub const MIN_CONVERSATION_LENGTH: usize = 2;

// ===== Input Models =====

/// One message of the reply relation together with the ids that replied to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEdge {
    pub message_id: MessageId,
    pub response_ids: Vec<MessageId>,
    pub in_response_to_id: Option<MessageId>,
}

impl MessageEdge {
    /// A message that starts a conversation.
    pub fn root(message_id: MessageId, response_ids: Vec<MessageId>) -> Self {
        Self {
            message_id,
            response_ids,
            in_response_to_id: None,
        }
    }

    /// A message written in response to `parent`.
    pub fn reply(message_id: MessageId, parent: MessageId, response_ids: Vec<MessageId>) -> Self {
        Self {
            message_id,
            response_ids,
            in_response_to_id: Some(parent),
        }
    }

    pub fn is_self_referential(&self) -> bool {
        self.in_response_to_id == Some(self.message_id)
    }

    /// Roots seed conversations. Self-referential messages are treated as roots so
    /// they are never absorbed into another path.
    pub fn is_root(&self) -> bool {
        self.in_response_to_id.is_none() || self.is_self_referential()
    }
}

// ===== Output Models =====

/// A materialized root-to-leaf conversation path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub first_message_id: MessageId,
    pub latest_message_id: MessageId,
    pub flow: Vec<MessageId>,
    pub length: usize,
}

impl ConversationRecord {
    /// Build a record from a traversal flow, or `None` when the flow is too short
    /// to be a conversation.
    pub fn from_flow(flow: Vec<MessageId>) -> Option<Self> {
        if flow.len() < MIN_CONVERSATION_LENGTH {
            return None;
        }
        let first_message_id = *flow.first()?;
        let latest_message_id = *flow.last()?;
        Some(Self {
            first_message_id,
            latest_message_id,
            length: flow.len(),
            flow,
        })
    }

    /// Consecutive `(parent, child)` hops covered by this record.
    pub fn hops(&self) -> impl Iterator<Item = (MessageId, MessageId)> + '_ {
        self.flow.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// Records completed in a single round, staged together for the bulk loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundBatch {
    pub round: usize,
    pub records: Vec<ConversationRecord>,
}
