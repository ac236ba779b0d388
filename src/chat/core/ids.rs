// File: src/chat/core/ids.rs

//! Identifier types for conversations, messages and models.
//!
//! Conversation and message ids are UUID newtypes: unique for the lifetime of
//! the process and, in practice, across restarts too. Model ids are free-form
//! display text; only emptiness, length and control characters are rejected.
//!
//! ## Cargo features used by this module
//! - `uuid_v7`: conversation ids become time-ordered `UUIDv7`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of hex digits shown by [`ConversationId::short`] and friends.
pub const SHORT_ID_LEN: usize = 8;

/// Generate an ID with creation-order locality.
///
/// With feature `uuid_v7` enabled, this uses `Uuid::now_v7()`.
/// Otherwise it falls back to `Uuid::new_v4()`.
#[inline]
#[must_use]
fn uuid_time_ordered() -> Uuid {
    #[cfg(feature = "uuid_v7")]
    {
        Uuid::now_v7()
    }
    #[cfg(not(feature = "uuid_v7"))]
    {
        Uuid::new_v4()
    }
}

/// Generate a random UUID (v4).
#[inline]
#[must_use]
fn uuid_random() -> Uuid {
    Uuid::new_v4()
}

/// Declare a UUID newtype with a consistent API.
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $name:ident,
        generator = $gen:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            /// Create a new identifier.
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self($gen())
            }

            /// Leading hex digits, enough to tell ids apart on screen.
            #[must_use]
            pub fn short(&self) -> String {
                self.0.simple().to_string().chars().take(SHORT_ID_LEN).collect()
            }

            /// Whether the hyphen-less hex form starts with `prefix` (case-insensitive).
            #[must_use]
            pub fn matches_prefix(&self, prefix: &str) -> bool {
                let wanted: String = prefix
                    .chars()
                    .filter(|c| *c != '-')
                    .map(|c| c.to_ascii_lowercase())
                    .collect();
                !wanted.is_empty() && self.0.simple().to_string().starts_with(&wanted)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            #[inline]
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            #[inline]
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_uuid_id!(
    /// Identifier of a conversation thread.
    ConversationId,
    generator = uuid_time_ordered
);

define_uuid_id!(
    /// Identifier of a single message inside a conversation.
    MessageId,
    generator = uuid_random
);

// ===== Model IDs ============================================================

/// Errors returned when parsing/validating a [`ModelId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelIdError {
    /// Empty (or whitespace-only) identifier.
    Empty,
    /// Exceeds the maximum accepted length.
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length received.
        got: usize,
    },
    /// Contains a control character (newline, tab, escape and the like).
    ControlChar {
        /// The offending character.
        ch: char,
        /// Character index where it was found.
        index: usize,
    },
}

impl fmt::Display for ModelIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "model id must not be empty"),
            Self::TooLong { max, got } => write!(f, "model id too long: got {got}, max {max}"),
            Self::ControlChar { ch, index } => {
                write!(
                    f,
                    "model id contains control character {ch:?} at index {index}"
                )
            }
        }
    }
}

impl std::error::Error for ModelIdError {}

/// Identifier of the response-generation model picked in the selector.
///
/// Examples:
/// - `openai/gpt-4o`
/// - `anthropic/claude-3.5-sonnet`
///
/// Only the shape is checked; the id is never matched against a list of
/// models a backend actually serves.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Hard ceiling to prevent pathological payloads.
    pub const MAX_LEN: usize = 192;

    /// Build a validated `ModelId`.
    ///
    /// Rules:
    /// - Non-empty after trimming.
    /// - At most [`Self::MAX_LEN`] bytes.
    /// - No control characters. Inner spaces and non-ASCII text are kept.
    ///
    /// # Errors
    /// Returns `ModelIdError` if the input is empty, too long, or contains a control character.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ModelIdError> {
        let s = raw.as_ref().trim();

        if s.is_empty() {
            return Err(ModelIdError::Empty);
        }
        if s.len() > Self::MAX_LEN {
            return Err(ModelIdError::TooLong {
                max: Self::MAX_LEN,
                got: s.len(),
            });
        }

        if let Some((index, ch)) = s.chars().enumerate().find(|(_, ch)| ch.is_control()) {
            return Err(ModelIdError::ControlChar { ch, index });
        }

        Ok(Self(s.to_owned()))
    }

    /// Borrow as `&str`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = ModelIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ModelId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
