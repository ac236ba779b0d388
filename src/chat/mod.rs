//! Chat subsystem for the MOA chat client.
//!
//! Organized into:
//! - `core`: Configuration, errors, IDs, messages, conversations, and titles
//! - `store`: The conversation store and recency grouping
//! - `storage`: Blob backends and the persistence decorator
//! - `reply`: Response generation, reply scheduling, and the model catalog
//! - `session`: The controller driven by the front end

pub mod core;
pub mod reply;
pub mod session;
pub mod storage;
pub mod store;

// Re-export commonly used types for convenience
pub use core::{
    ChatConfig, ChatError, ChatResult, Conversation, ConversationId, DefaultsConfig, Message,
    MessageId, ModelId, ModelIdError, NewMessage, ReplyConfig, Role, StorageConfig, TitleRule,
};
pub use reply::{
    AVAILABLE_MODELS, MockResponder, PendingReplies, PendingReply, PromptCategory, ReplyContext,
    Responder, available_models, is_listed,
};
pub use session::{ChatSession, DEFAULT_REPLY_DELAY, DeliveredReply, SendOutcome};
pub use storage::{BlobStore, MemoryBlobStore, PersistedStore, SqliteBlobStore, STATE_VERSION};
pub use store::{
    ConversationStore, HistoryGroup, RecencyBucket, StoreDefaults, StoreState, group_by_recency,
};
