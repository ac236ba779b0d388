//! Assistant reply generation and scheduling.

pub mod catalog;
pub mod pending;
pub mod responder;

pub use catalog::{AVAILABLE_MODELS, PromptCategory, available_models, is_listed};
pub use pending::{PendingReplies, PendingReply};
pub use responder::{MockResponder, ReplyContext, Responder};
