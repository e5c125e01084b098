//! Conversation filtering, ranking and top-N restriction.

use std::collections::{HashMap, HashSet};

use timeline_core::models::{ConversationCount, ConversationRow, ReducedRecord};
use tracing::debug;

// ── MessageFilter ─────────────────────────────────────────────────────────────

/// Optional equality filters applied before ranking.
///
/// Every set field must hold for a row to survive; unset fields are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    /// Keep only rows whose `conversationWithName` equals this value.
    pub conversation: Option<String>,
    /// Keep only rows whose `senderName` equals this value.
    pub sender: Option<String>,
    /// Drop rows whose `senderName` equals this value.
    pub exclude_sender: Option<String>,
}

impl MessageFilter {
    pub fn new(
        conversation: Option<String>,
        sender: Option<String>,
        exclude_sender: Option<String>,
    ) -> Self {
        Self {
            conversation,
            sender,
            exclude_sender,
        }
    }

    /// `true` when no filter is set.
    pub fn is_empty(&self) -> bool {
        self.conversation.is_none() && self.sender.is_none() && self.exclude_sender.is_none()
    }

    /// Apply the conversation, sender and excluded-sender filters, in that
    /// order. Row order is preserved.
    pub fn apply<R: ConversationRow>(&self, mut rows: Vec<R>) -> Vec<R> {
        if let Some(conversation) = &self.conversation {
            rows.retain(|r| r.conversation() == conversation.as_str());
            debug!("After conversation filter: {} rows", rows.len());
        }
        if let Some(sender) = &self.sender {
            rows.retain(|r| r.sender() == sender.as_str());
            debug!("After sender filter: {} rows", rows.len());
        }
        if let Some(excluded) = &self.exclude_sender {
            rows.retain(|r| r.sender() != excluded.as_str());
            debug!("After sender removal: {} rows", rows.len());
        }
        rows
    }
}

// ── ConversationAggregator ────────────────────────────────────────────────────

/// Stateless helper that ranks conversation partners by message volume.
pub struct ConversationAggregator;

impl ConversationAggregator {
    /// Count messages per conversation partner.
    ///
    /// Sorted by count descending; equal counts are ordered by partner name
    /// ascending so the ranking never depends on input order.
    pub fn rank<R: ConversationRow>(rows: &[R]) -> Vec<ConversationCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in rows {
            *counts.entry(row.conversation()).or_insert(0) += 1;
        }

        let mut ranking: Vec<ConversationCount> = counts
            .into_iter()
            .map(|(name, count)| ConversationCount {
                conversation_with_name: name.to_string(),
                count,
            })
            .collect();

        ranking.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.conversation_with_name.cmp(&b.conversation_with_name))
        });
        ranking
    }

    /// The `top_n` highest-ranked conversation partners.
    pub fn top_conversations<R: ConversationRow>(
        rows: &[R],
        top_n: usize,
    ) -> Vec<ConversationCount> {
        let mut ranking = Self::rank(rows);
        ranking.truncate(top_n);
        ranking
    }

    /// Keep only rows exchanged with the `top_n` busiest partners and project
    /// them to [`ReducedRecord`]s, preserving row order.
    ///
    /// Running this again on its own output with the same `top_n` returns the
    /// same rows.
    pub fn rank_and_restrict<R: ConversationRow>(
        rows: Vec<R>,
        top_n: usize,
    ) -> Vec<ReducedRecord> {
        let top = Self::top_conversations(&rows, top_n);
        Self::restrict(rows, &top)
    }

    /// Inner join of `rows` against the partner set `top`, projected to the
    /// three reduced columns.
    pub fn restrict<R: ConversationRow>(
        rows: Vec<R>,
        top: &[ConversationCount],
    ) -> Vec<ReducedRecord> {
        let keep: HashSet<&str> = top
            .iter()
            .map(|c| c.conversation_with_name.as_str())
            .collect();

        rows.into_iter()
            .filter(|r| keep.contains(r.conversation()))
            .map(ConversationRow::project)
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
