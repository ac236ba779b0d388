//! Message model for conversation threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::core::ids::MessageId;

/// Author of a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Typed by the user.
    User,
    /// Produced by the response generator.
    Assistant,
}

impl Role {
    /// Stable string form for storage and display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(value.to_string()),
        }
    }
}

/// Role and content of a message that has not been stored yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewMessage {
    /// Author.
    pub role: Role,
    /// Text payload, possibly markdown.
    pub content: String,
}

impl NewMessage {
    /// Message typed by the user.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Message produced by the assistant.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A stored message. Immutable once created.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier within the owning conversation.
    pub id: MessageId,
    /// Author.
    pub role: Role,
    /// Text payload.
    pub content: String,
    /// Creation instant.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Stamp a pending message with a fresh id and the given instant.
    #[must_use]
    pub fn stamp(new: NewMessage, now: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::new(),
            role: new.role,
            content: new.content,
            timestamp: now,
        }
    }

    /// Whether the user wrote this message.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
