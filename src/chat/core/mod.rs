//! Core chat types and identifiers.

pub mod config;
pub mod conversation;
pub mod errors;
pub mod ids;
pub mod message;
pub mod title;

pub use config::{ChatConfig, DefaultsConfig, ReplyConfig, StorageConfig};
pub use conversation::Conversation;
pub use errors::{ChatError, ChatResult};
pub use ids::{ConversationId, MessageId, ModelId, ModelIdError};
pub use message::{Message, NewMessage, Role};
pub use title::TitleRule;
