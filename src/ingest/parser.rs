//! Edge relation decoding.
//!
//! Turns the rows produced by the extraction step into `MessageEdge`s ready for
//! reconstruction. The input is JSON lines, one message per line:
//!
//! ```text
//! {"message_id": 1, "response_ids": "2,3", "in_response_to_id": null}
//! {"message_id": 2, "response_ids": "4",   "in_response_to_id": 1}
//! ```
//!
//! The column names of the raw tweet export (`tweet_id`, `response_tweet_id`,
//! `in_response_to_tweet_id`) are accepted as aliases.
//!
//! # Reply Id Lists
//!
//! `response_ids` is normally a comma-separated string. Spaces are removed and
//! empty tokens skipped, so `"2, 3,"` yields `[2, 3]`. A bare integer, an array
//! of integers or `null` are accepted as well. The column itself must be
//! present; `in_response_to_id` may be left out for roots.
//!
//! # Error Handling
//!
//! There is no per-row recovery: a single malformed row (invalid JSON, missing
//! `message_id` or `response_ids`, non-numeric id token) fails the whole run.

use std::io::BufRead;

use serde::Deserialize;
use thiserror::Error;

use crate::models::{MessageEdge, MessageId};

/// Errors that can be returned while decoding the edge relation.
#[derive(Debug, Error)]
pub enum ParseRowError {
    #[error("invalid message id `{token}` in id list `{raw}`")]
    InvalidId { token: String, raw: String },
    #[error("line {line}: invalid message id `{token}` in id list `{raw}`")]
    InvalidRowId {
        line: usize,
        token: String,
        raw: String,
    },
    #[error("line {line}: malformed row: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read edge relation: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseRowError {
    fn at_line(self, line: usize) -> Self {
        match self {
            ParseRowError::InvalidId { token, raw } => {
                ParseRowError::InvalidRowId { line, token, raw }
            }
            other => other,
        }
    }
}

/// Reply ids as they appear in a raw row.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawIdList {
    Null,
    Single(MessageId),
    Many(Vec<MessageId>),
    Text(String),
}

/// One row of the input relation before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeRow {
    #[serde(alias = "tweet_id")]
    pub message_id: MessageId,
    #[serde(alias = "response_tweet_id")]
    pub response_ids: RawIdList,
    #[serde(default, alias = "in_response_to_tweet_id")]
    pub in_response_to_id: Option<MessageId>,
}

impl EdgeRow {
    pub fn into_edge(self) -> Result<MessageEdge, ParseRowError> {
        let response_ids = match self.response_ids {
            RawIdList::Null => Vec::new(),
            RawIdList::Single(id) => vec![id],
            RawIdList::Many(ids) => ids,
            RawIdList::Text(raw) => parse_id_list(&raw)?,
        };

        Ok(MessageEdge {
            message_id: self.message_id,
            response_ids,
            in_response_to_id: self.in_response_to_id,
        })
    }
}

/// Parse a comma-separated list of message ids
///
/// Examples:
/// - `"2,3"` → `[2, 3]`
/// - `" 2 , 3 ,"` → `[2, 3]`
/// - `""` → `[]`
pub fn parse_id_list(raw: &str) -> Result<Vec<MessageId>, ParseRowError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    compact
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<MessageId>().map_err(|_| ParseRowError::InvalidId {
                token: token.to_string(),
                raw: raw.to_string(),
            })
        })
        .collect()
}

/// Decode a whole JSON-lines relation. Blank lines are skipped.
pub fn parse_edges<R: BufRead>(reader: R) -> Result<Vec<MessageEdge>, ParseRowError> {
    let mut edges = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let row: EdgeRow = serde_json::from_str(trimmed).map_err(|source| {
            ParseRowError::Malformed {
                line: line_number,
                source,
            }
        })?;
        edges.push(row.into_edge().map_err(|e| e.at_line(line_number))?);
    }

    Ok(edges)
}
