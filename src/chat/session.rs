//! Chat session controller.
//!
//! Ties the persisted store to the response generator and the reply
//! schedule, the way the chat page wires its input box: sending from the
//! empty state opens a new conversation, sending inside a conversation
//! appends to it, and input is refused while that conversation still waits
//! for its reply.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::chat::core::errors::ChatResult;
use crate::chat::core::ids::{ConversationId, MessageId, ModelId};
use crate::chat::core::message::NewMessage;
use crate::chat::reply::pending::PendingReplies;
use crate::chat::reply::responder::{ReplyContext, Responder};
use crate::chat::storage::blob_store::BlobStore;
use crate::chat::storage::persisted::PersistedStore;
use crate::chat::store::state::ConversationStore;

/// Default delay before the assistant reply lands.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1000);

/// Result of [`ChatSession::send`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SendOutcome {
    /// The message was stored and a reply scheduled.
    Sent {
        /// Conversation the message went to.
        conversation_id: ConversationId,
        /// Whether the conversation was created by this send.
        created: bool,
    },
    /// Nothing to send after trimming.
    Empty,
    /// The active conversation is still waiting for a reply.
    Busy,
}

/// A reply appended by [`ChatSession::deliver_due`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeliveredReply {
    /// Conversation the reply went to.
    pub conversation_id: ConversationId,
    /// Stored message id.
    pub message_id: MessageId,
}

/// Store, responder and reply schedule driven by the UI event loop.
pub struct ChatSession<B, R> {
    store: PersistedStore<B>,
    responder: R,
    pending: PendingReplies,
    reply_delay: Duration,
}

impl<B: BlobStore, R: Responder> ChatSession<B, R> {
    /// Build a session over a loaded store.
    #[must_use]
    pub fn new(store: PersistedStore<B>, responder: R) -> Self {
        Self {
            store,
            responder,
            pending: PendingReplies::new(),
            reply_delay: DEFAULT_REPLY_DELAY,
        }
    }

    /// Override the reply delay.
    #[must_use]
    pub const fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    /// Read access to the conversation store.
    #[must_use]
    pub const fn store(&self) -> &ConversationStore {
        self.store.store()
    }

    /// The persistence decorator, for backend access.
    #[must_use]
    pub const fn persisted(&self) -> &PersistedStore<B> {
        &self.store
    }

    /// Whether the active conversation is waiting for its reply.
    #[must_use]
    pub fn is_awaiting_reply(&self) -> bool {
        self.store()
            .active_conversation()
            .is_some_and(|c| self.pending.is_pending(c.id))
    }

    /// Earliest instant a scheduled reply becomes due.
    #[must_use]
    pub fn next_reply_due(&self) -> Option<Instant> {
        self.pending.next_due()
    }

    /// Number of replies still scheduled.
    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.pending.len()
    }

    /// Send user input to the active conversation, or open a new one.
    pub fn send(&mut self, input: &str, now: Instant) -> SendOutcome {
        let content = input.trim();
        if content.is_empty() {
            return SendOutcome::Empty;
        }
        if self.is_awaiting_reply() {
            debug!("Send refused, reply still pending");
            return SendOutcome::Busy;
        }

        let active = self.store().active_conversation().map(|c| c.id);
        let (conversation_id, created, context) = match active {
            Some(id) => {
                self.store.append_message(id, NewMessage::user(content));
                (id, false, ReplyContext::FollowUp)
            }
            None => {
                let id = self
                    .store
                    .create_conversation(Some(NewMessage::user(content)));
                (id, true, ReplyContext::NewConversation)
            }
        };

        let reply = self.responder.reply(content, context);
        self.pending
            .schedule(conversation_id, reply, now + self.reply_delay);

        SendOutcome::Sent {
            conversation_id,
            created,
        }
    }

    /// Append every reply whose delay has elapsed.
    ///
    /// Replies for conversations deleted in the meantime are dropped.
    pub fn deliver_due(&mut self, now: Instant) -> Vec<DeliveredReply> {
        self.pending
            .take_due(now)
            .into_iter()
            .filter_map(|reply| {
                let conversation_id = reply.conversation_id;
                let message_id = self
                    .store
                    .append_message(conversation_id, NewMessage::assistant(reply.content));
                if message_id.is_none() {
                    debug!(
                        "Dropped reply for deleted conversation {}",
                        conversation_id.short()
                    );
                }
                message_id.map(|message_id| DeliveredReply {
                    conversation_id,
                    message_id,
                })
            })
            .collect()
    }

    /// Deselect the active conversation; the next send opens a new one.
    pub fn start_new_chat(&mut self) {
        self.store.set_active_conversation(None);
    }

    /// Switch the main view to a conversation.
    pub fn open(&mut self, id: ConversationId) {
        self.store.set_active_conversation(Some(id));
    }

    /// Delete a conversation.
    pub fn delete(&mut self, id: ConversationId) -> bool {
        self.store.delete_conversation(id)
    }

    /// Rename a conversation.
    pub fn rename(&mut self, id: ConversationId, title: &str) -> bool {
        self.store.rename_conversation(id, title)
    }

    /// Clear the messages of a conversation.
    pub fn clear(&mut self, id: ConversationId) -> bool {
        self.store.clear_messages(id)
    }

    /// Flip sidebar visibility.
    pub fn toggle_sidebar(&mut self) -> bool {
        self.store.toggle_sidebar()
    }

    /// Pick the response-generation model.
    pub fn select_model(&mut self, model: ModelId) {
        self.store.set_selected_model(model);
    }

    /// Forget every conversation, both in memory and in the backend.
    ///
    /// Nothing changes when the backend refuses the removal.
    ///
    /// # Errors
    /// Returns an error if the backend cannot remove the slot.
    pub fn reset(&mut self) -> ChatResult<()> {
        self.store.clear_slot()?;
        self.pending.clear();
        Ok(())
    }
}
