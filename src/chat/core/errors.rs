//! Error types for the chat subsystem.

use thiserror::Error;

use crate::chat::core::ids::ModelIdError;

/// Chat subsystem error type.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Model identifier rejected by validation.
    #[error("invalid model id: {0}")]
    InvalidModelId(#[from] ModelIdError),
    /// `SQLite` storage error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Persisted state written by an incompatible version.
    #[error("unsupported persisted state version {found} (expected {expected})")]
    UnsupportedStateVersion {
        /// Version found in the blob.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },
}

/// Convenience result alias for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;
