//! Persistent storage for the conversation store.

pub mod blob_store;
pub mod persisted;

pub use blob_store::{BlobStore, MemoryBlobStore, SqliteBlobStore};
pub use persisted::{PersistedStore, STATE_VERSION, decode_state, encode_state};
