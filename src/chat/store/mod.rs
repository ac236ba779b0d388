//! Conversation store and its derived views.

pub mod history;
pub mod state;

pub use history::{HistoryGroup, RecencyBucket, bucket_for, group_by_recency};
pub use state::{ConversationStore, StoreDefaults, StoreState};
