//! Deferred assistant replies.
//!
//! A reply is scheduled with a due instant and handed back by
//! [`PendingReplies::take_due`] once that instant has passed. The event loop
//! sleeps until [`PendingReplies::next_due`]. There is no cancellation: a
//! reply whose conversation was deleted in the meantime is still delivered
//! and the store drops it as an unknown-id append.

use std::collections::VecDeque;

use tokio::time::Instant;

use crate::chat::core::ids::ConversationId;

/// A reply waiting for its delay to elapse.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingReply {
    /// Conversation the reply belongs to.
    pub conversation_id: ConversationId,
    /// Reply text.
    pub content: String,
    /// Instant after which the reply is delivered.
    pub due_at: Instant,
}

/// Replies ordered by due instant.
#[derive(Debug, Default)]
pub struct PendingReplies {
    queue: VecDeque<PendingReply>,
}

impl PendingReplies {
    /// Empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a reply. Equal due instants keep scheduling order.
    pub fn schedule(&mut self, conversation_id: ConversationId, content: String, due_at: Instant) {
        let index = self.queue.partition_point(|p| p.due_at <= due_at);
        self.queue.insert(
            index,
            PendingReply {
                conversation_id,
                content,
                due_at,
            },
        );
    }

    /// Earliest due instant, if anything is scheduled.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.queue.front().map(|p| p.due_at)
    }

    /// Remove and return every reply due at or before `now`, oldest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<PendingReply> {
        let split = self.queue.partition_point(|p| p.due_at <= now);
        self.queue.drain(..split).collect()
    }

    /// Whether a reply for this conversation is still on its way.
    #[must_use]
    pub fn is_pending(&self, conversation_id: ConversationId) -> bool {
        self.queue.iter().any(|p| p.conversation_id == conversation_id)
    }

    /// Drop every scheduled reply.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Number of scheduled replies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
