//! Configuration for the chat application.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chat::core::errors::{ChatError, ChatResult};
use crate::chat::core::ids::ModelId;
use crate::chat::core::title::TitleRule;

/// Environment variable pointing at an optional JSON config file.
pub const ENV_CONFIG_PATH: &str = "MOA_CONFIG";
/// Environment override for the `SQLite` database path.
pub const ENV_DB_PATH: &str = "MOA_DB_PATH";
/// Environment override for the mock reply delay in milliseconds.
pub const ENV_REPLY_DELAY_MS: &str = "MOA_REPLY_DELAY_MS";
/// Environment override for the initially selected model.
pub const ENV_MODEL: &str = "MOA_MODEL";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Persistence settings.
    pub storage: StorageConfig,
    /// Mock reply settings.
    pub reply: ReplyConfig,
    /// Defaults for a fresh store.
    pub defaults: DefaultsConfig,
}

impl ChatConfig {
    /// Build the configuration from the environment.
    ///
    /// Reads the JSON file named by `MOA_CONFIG` when set, then applies the
    /// individual `MOA_*` overrides and validates the result.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, an override is
    /// malformed, or validation fails.
    pub fn from_env() -> ChatResult<Self> {
        let mut config = match std::env::var_os(ENV_CONFIG_PATH) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(path) = std::env::var_os(ENV_DB_PATH) {
            config.storage.sqlite_path = PathBuf::from(path);
        }

        if let Ok(raw) = std::env::var(ENV_REPLY_DELAY_MS) {
            config.reply.delay_ms = raw.trim().parse().map_err(|_| {
                ChatError::InvalidConfig(format!("{ENV_REPLY_DELAY_MS} must be an integer, got {raw:?}"))
            })?;
        }

        if let Ok(model) = std::env::var(ENV_MODEL) {
            config.defaults.model = model;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> ChatResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ChatResult<()> {
        if self.storage.slot.trim().is_empty() {
            return Err(ChatError::InvalidConfig(
                "storage.slot must not be empty".to_string(),
            ));
        }

        if !is_sql_identifier(&self.storage.table) {
            return Err(ChatError::InvalidConfig(format!(
                "storage.table must be a plain SQL identifier, got {:?}",
                self.storage.table
            )));
        }

        if self.defaults.title_max_chars == 0 {
            return Err(ChatError::InvalidConfig(
                "defaults.title_max_chars must be > 0".to_string(),
            ));
        }

        ModelId::new(&self.defaults.model)?;

        Ok(())
    }
}

fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Storage configuration for persisted state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// Blob table name.
    pub table: String,
    /// Slot holding the serialized store.
    pub slot: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("moa_chat.sqlite"),
            table: "moa_blobs".to_string(),
            slot: "chatbot-storage".to_string(),
        }
    }
}

/// Mock assistant reply settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Delay before the canned reply lands, in milliseconds.
    pub delay_ms: u64,
    /// Optional RNG seed for reproducible replies.
    pub seed: Option<u64>,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            seed: None,
        }
    }
}

impl ReplyConfig {
    /// Reply delay as a `Duration`.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Defaults applied when no persisted state exists.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Model selected on first launch.
    pub model: String,
    /// Whether the history sidebar starts open.
    pub sidebar_visible: bool,
    /// Title of a conversation with no user message yet.
    pub untitled_title: String,
    /// Characters kept when deriving a title.
    pub title_max_chars: usize,
    /// Marker appended to truncated titles.
    pub title_ellipsis: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let title = TitleRule::default();
        Self {
            model: "openai/gpt-4o".to_string(),
            sidebar_visible: true,
            untitled_title: title.placeholder,
            title_max_chars: title.max_chars,
            title_ellipsis: title.ellipsis,
        }
    }
}

impl DefaultsConfig {
    /// Title rule described by these defaults.
    #[must_use]
    pub fn title_rule(&self) -> TitleRule {
        TitleRule {
            max_chars: self.title_max_chars,
            ellipsis: self.title_ellipsis.clone(),
            placeholder: self.untitled_title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reply.delay(), Duration::from_secs(1));
        assert_eq!(config.storage.slot, "chatbot-storage");
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let mut config = ChatConfig::default();
        config.storage.table = "blobs; DROP TABLE x".to_string();
        assert!(matches!(config.validate(), Err(ChatError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_title_length() {
        let mut config = ChatConfig::default();
        config.defaults.title_max_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_model() {
        let mut config = ChatConfig::default();
        config.defaults.model = "line\nbreak".to_string();
        assert!(matches!(config.validate(), Err(ChatError::InvalidModelId(_))));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ChatConfig =
            serde_json::from_str(r#"{ "reply": { "delay_ms": 250 } }"#).unwrap();
        assert_eq!(config.reply.delay_ms, 250);
        assert_eq!(config.storage.table, "moa_blobs");
        assert_eq!(config.defaults.title_rule(), TitleRule::default());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moa.json");
        std::fs::write(&path, r#"{ "defaults": { "model": "openai/gpt-4o-mini" } }"#).unwrap();

        let config = ChatConfig::from_file(&path).unwrap();
        assert_eq!(config.defaults.model, "openai/gpt-4o-mini");
        assert!(config.defaults.sidebar_visible);
    }
}
