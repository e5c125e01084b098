use chrono::{DateTime, Utc};
use serde::Serialize;

// ── Column schema ─────────────────────────────────────────────────────────────

/// Positional column names of every serialized input row, in order.
pub const ALL_COLUMNS: [&str; 8] = [
    "timestamp",
    "conversationId",
    "conversationWithName",
    "senderName",
    "text",
    "language",
    "platform",
    "datetime",
];

/// Index of each named column inside a raw row.
pub mod column {
    pub const TIMESTAMP: usize = 0;
    pub const CONVERSATION_ID: usize = 1;
    pub const CONVERSATION_WITH_NAME: usize = 2;
    pub const SENDER_NAME: usize = 3;
    pub const TEXT: usize = 4;
    pub const LANGUAGE: usize = 5;
    pub const PLATFORM: usize = 6;
    pub const DATETIME: usize = 7;
}

/// Columns kept after reduction.
pub const REDUCED_COLUMNS: [&str; 3] = ["datetime", "conversationWithName", "senderName"];

// ── Records ───────────────────────────────────────────────────────────────────

/// A single chat message as loaded from an input file.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    /// UTC time the message was sent.
    pub datetime: DateTime<Utc>,
    /// Identifier of the conversation partner.
    pub conversation_with_name: String,
    /// Identifier of the message author.
    pub sender_name: String,
    /// Source-specific conversation identifier.
    pub conversation_id: Option<String>,
    /// Message body.
    pub text: Option<String>,
    /// Detected language of the body.
    pub language: Option<String>,
    /// Chat platform the message was exported from.
    pub platform: Option<String>,
}

/// A message reduced to the three columns the renderer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducedRecord {
    pub datetime: DateTime<Utc>,
    pub conversation_with_name: String,
    pub sender_name: String,
}

/// Number of messages exchanged with one conversation partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationCount {
    pub conversation_with_name: String,
    pub count: usize,
}

// ── ConversationRow ───────────────────────────────────────────────────────────

/// Row types that can be grouped by conversation partner and projected to a
/// [`ReducedRecord`].
pub trait ConversationRow {
    /// The `conversationWithName` value of this row.
    fn conversation(&self) -> &str;

    /// The `senderName` value of this row.
    fn sender(&self) -> &str;

    /// Project the row down to `datetime`, `conversationWithName`, `senderName`.
    fn project(self) -> ReducedRecord;
}

impl ConversationRow for MessageRecord {
    fn conversation(&self) -> &str {
        &self.conversation_with_name
    }

    fn sender(&self) -> &str {
        &self.sender_name
    }

    fn project(self) -> ReducedRecord {
        ReducedRecord {
            datetime: self.datetime,
            conversation_with_name: self.conversation_with_name,
            sender_name: self.sender_name,
        }
    }
}

impl ConversationRow for ReducedRecord {
    fn conversation(&self) -> &str {
        &self.conversation_with_name
    }

    fn sender(&self) -> &str {
        &self.sender_name
    }

    fn project(self) -> ReducedRecord {
        self
    }
}
