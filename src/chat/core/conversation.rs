//! Conversation thread model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::core::ids::{ConversationId, MessageId};
use crate::chat::core::message::{Message, NewMessage, Role};
use crate::chat::core::title::TitleRule;

/// A titled, chronologically ordered thread of messages.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique identifier.
    pub id: ConversationId,
    /// Sidebar label.
    pub title: String,
    /// Messages in insertion order.
    pub messages: Vec<Message>,
    /// Creation instant, never changed afterwards.
    pub created_at: DateTime<Utc>,
    /// Last mutation instant.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Start a conversation, optionally seeded with its first message.
    #[must_use]
    pub fn start(seed: Option<NewMessage>, rule: &TitleRule, now: DateTime<Utc>) -> Self {
        let messages: Vec<Message> = seed.map(|m| Message::stamp(m, now)).into_iter().collect();
        let title = messages
            .first()
            .map_or_else(|| rule.placeholder.clone(), |m| rule.derive(&m.content));

        Self {
            id: ConversationId::new(),
            title,
            messages,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message; the first user message also names the thread.
    pub fn push(&mut self, new: NewMessage, rule: &TitleRule, now: DateTime<Utc>) -> MessageId {
        let names_thread = new.role == Role::User && !self.has_user_message();

        let message = Message::stamp(new, now);
        let id = message.id;
        if names_thread {
            self.title = rule.derive(&message.content);
        }
        self.messages.push(message);
        self.touch(now);
        id
    }

    /// Bump `updated_at`, never moving it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }

    /// Whether any stored message came from the user.
    #[must_use]
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(Message::is_user)
    }

    /// Most recent message, if any.
    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
