//! In-memory conversation store.
//!
//! The store owns every conversation plus the UI flags the front end reads
//! (active selection, sidebar visibility, selected model). It is created
//! explicitly and handed to the UI layer by reference; there is no global
//! instance. Commands never fail: operations on unknown ids are silent
//! no-ops, reported through the `bool` / `Option` return values.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chat::core::config::DefaultsConfig;
use crate::chat::core::conversation::Conversation;
use crate::chat::core::errors::ChatResult;
use crate::chat::core::ids::{ConversationId, MessageId, ModelId};
use crate::chat::core::message::NewMessage;
use crate::chat::core::title::TitleRule;
use crate::chat::store::history::{HistoryGroup, group_by_recency};

/// Everything that is persisted between runs.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    /// Conversations, most recently created first.
    pub conversations: Vec<Conversation>,
    /// Conversation shown in the main view, if any.
    pub active_conversation_id: Option<ConversationId>,
    /// Whether the history sidebar is open.
    pub sidebar_visible: bool,
    /// Model picked in the selector.
    pub selected_model: ModelId,
}

/// Values a fresh store starts from.
#[derive(Clone, Debug)]
pub struct StoreDefaults {
    /// Title derivation rule.
    pub title: TitleRule,
    /// Initially selected model.
    pub selected_model: ModelId,
    /// Initial sidebar visibility.
    pub sidebar_visible: bool,
}

impl StoreDefaults {
    /// Defaults taken from the `defaults` config section.
    ///
    /// # Errors
    /// Returns an error if the configured model id is invalid.
    pub fn from_config(config: &DefaultsConfig) -> ChatResult<Self> {
        Ok(Self {
            title: config.title_rule(),
            selected_model: ModelId::new(&config.model)?,
            sidebar_visible: config.sidebar_visible,
        })
    }

    /// Empty state described by these defaults.
    #[must_use]
    pub fn empty_state(&self) -> StoreState {
        StoreState {
            conversations: Vec::new(),
            active_conversation_id: None,
            sidebar_visible: self.sidebar_visible,
            selected_model: self.selected_model.clone(),
        }
    }
}

/// The conversation store.
#[derive(Clone, Debug)]
pub struct ConversationStore {
    state: StoreState,
    title: TitleRule,
}

impl ConversationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(defaults: &StoreDefaults) -> Self {
        Self {
            state: defaults.empty_state(),
            title: defaults.title.clone(),
        }
    }

    /// Rebuild a store from previously saved state.
    #[must_use]
    pub const fn from_state(state: StoreState, title: TitleRule) -> Self {
        Self { state, title }
    }

    // ===== Commands ==========================================================

    /// Create a conversation, make it active and return its id.
    pub fn create_conversation(&mut self, seed: Option<NewMessage>) -> ConversationId {
        let conversation = Conversation::start(seed, &self.title, Utc::now());
        let id = conversation.id;

        self.state.conversations.insert(0, conversation);
        self.state.active_conversation_id = Some(id);

        info!("Created conversation {}", id.short());
        id
    }

    /// Delete a conversation. Returns `false` if it did not exist.
    ///
    /// Deleting the active conversation selects the newest remaining one.
    pub fn delete_conversation(&mut self, id: ConversationId) -> bool {
        let Some(index) = self.position(id) else {
            debug!("Delete ignored, unknown conversation {}", id.short());
            return false;
        };

        self.state.conversations.remove(index);
        if self.state.active_conversation_id == Some(id) {
            self.state.active_conversation_id = self.state.conversations.first().map(|c| c.id);
        }

        info!("Deleted conversation {}", id.short());
        true
    }

    /// Rename a conversation. Blank titles and unknown ids are ignored.
    pub fn rename_conversation(&mut self, id: ConversationId, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            debug!("Rename ignored, blank title for {}", id.short());
            return false;
        }

        let Some(conversation) = self.conversation_mut(id) else {
            debug!("Rename ignored, unknown conversation {}", id.short());
            return false;
        };

        conversation.title = title.to_string();
        conversation.touch(Utc::now());
        true
    }

    /// Append a message. Returns `None` if the conversation does not exist.
    pub fn append_message(&mut self, id: ConversationId, message: NewMessage) -> Option<MessageId> {
        let title = self.title.clone();
        let Some(conversation) = self.conversation_mut(id) else {
            debug!("Append ignored, unknown conversation {}", id.short());
            return None;
        };

        Some(conversation.push(message, &title, Utc::now()))
    }

    /// Remove every message of a conversation, keeping its title.
    pub fn clear_messages(&mut self, id: ConversationId) -> bool {
        let Some(conversation) = self.conversation_mut(id) else {
            debug!("Clear ignored, unknown conversation {}", id.short());
            return false;
        };

        conversation.messages.clear();
        conversation.touch(Utc::now());
        true
    }

    /// Select the conversation shown in the main view.
    ///
    /// The id is not checked; callers pass a known id or `None`. A dangling
    /// id reads back as "no active conversation".
    pub const fn set_active_conversation(&mut self, id: Option<ConversationId>) {
        self.state.active_conversation_id = id;
    }

    /// Show or hide the history sidebar.
    pub const fn set_sidebar_visible(&mut self, visible: bool) {
        self.state.sidebar_visible = visible;
    }

    /// Flip sidebar visibility and return the new value.
    pub const fn toggle_sidebar(&mut self) -> bool {
        self.state.sidebar_visible = !self.state.sidebar_visible;
        self.state.sidebar_visible
    }

    /// Pick the response-generation model.
    pub fn set_selected_model(&mut self, model: ModelId) {
        self.state.selected_model = model;
    }

    // ===== Queries ===========================================================

    /// The active conversation, or `None` if unset or no longer present.
    #[must_use]
    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.state
            .active_conversation_id
            .and_then(|id| self.conversation(id))
    }

    /// Look up a conversation by id.
    #[must_use]
    pub fn conversation(&self, id: ConversationId) -> Option<&Conversation> {
        self.state.conversations.iter().find(|c| c.id == id)
    }

    /// All conversations, most recently created first.
    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.state.conversations
    }

    /// Raw active id, which may dangle after misuse of `set_active_conversation`.
    #[must_use]
    pub const fn active_conversation_id(&self) -> Option<ConversationId> {
        self.state.active_conversation_id
    }

    /// Whether the history sidebar is open.
    #[must_use]
    pub const fn sidebar_visible(&self) -> bool {
        self.state.sidebar_visible
    }

    /// Currently selected model.
    #[must_use]
    pub const fn selected_model(&self) -> &ModelId {
        &self.state.selected_model
    }

    /// Snapshot of everything that gets persisted.
    #[must_use]
    pub const fn state(&self) -> &StoreState {
        &self.state
    }

    /// Conversations grouped for the history sidebar.
    #[must_use]
    pub fn history<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<HistoryGroup<'_>> {
        group_by_recency(&self.state.conversations, now)
    }

    fn position(&self, id: ConversationId) -> Option<usize> {
        self.state.conversations.iter().position(|c| c.id == id)
    }

    fn conversation_mut(&mut self, id: ConversationId) -> Option<&mut Conversation> {
        self.state.conversations.iter_mut().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::core::message::Role;

    fn defaults() -> StoreDefaults {
        StoreDefaults {
            title: TitleRule::default(),
            selected_model: ModelId::new("openai/gpt-4o").unwrap(),
            sidebar_visible: true,
        }
    }

    fn store() -> ConversationStore {
        ConversationStore::new(&defaults())
    }

    #[test]
    fn test_defaults_from_config() {
        let config = DefaultsConfig {
            model: "local/llama-3".to_string(),
            sidebar_visible: false,
            ..DefaultsConfig::default()
        };
        let defaults = StoreDefaults::from_config(&config).unwrap();
        assert_eq!(defaults.selected_model.as_str(), "local/llama-3");
        assert!(!defaults.sidebar_visible);
        assert_eq!(defaults.title, TitleRule::default());

        let bad = DefaultsConfig {
            model: "bad\nmodel".to_string(),
            ..DefaultsConfig::default()
        };
        assert!(StoreDefaults::from_config(&bad).is_err());
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = store();
        assert!(store.conversations().is_empty());
        assert!(store.active_conversation().is_none());
        assert!(store.sidebar_visible());
        assert_eq!(store.selected_model().as_str(), "openai/gpt-4o");
    }

    #[test]
    fn test_create_with_seed() {
        let mut store = store();
        let content = "Explain the difference between TCP and UDP please";
        let id = store.create_conversation(Some(NewMessage::user(content)));

        let conv = store.active_conversation().unwrap();
        assert_eq!(conv.id, id);
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].content, content);
        assert_eq!(conv.title, "Explain the difference between...");
    }

    #[test]
    fn test_create_prepends_and_activates() {
        let mut store = store();
        let first = store.create_conversation(None);
        let second = store.create_conversation(None);

        let ids: Vec<_> = store.conversations().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(store.active_conversation_id(), Some(second));
        assert_eq!(store.conversation(first).unwrap().title, "New chat");
    }

    #[test]
    fn test_title_changes_only_on_first_user_message() {
        let mut store = store();
        let id = store.create_conversation(None);

        store.append_message(id, NewMessage::assistant("Hi, how can I help?"));
        store.append_message(id, NewMessage::assistant("Still here."));
        assert_eq!(store.conversation(id).unwrap().title, "New chat");

        store.append_message(id, NewMessage::user("What is Rust?"));
        assert_eq!(store.conversation(id).unwrap().title, "What is Rust?");

        store.append_message(id, NewMessage::assistant("A language."));
        store.append_message(id, NewMessage::user("And Go?"));
        assert_eq!(store.conversation(id).unwrap().title, "What is Rust?");
    }

    #[test]
    fn test_seeded_conversation_keeps_title_on_next_user_message() {
        let mut store = store();
        let id = store.create_conversation(Some(NewMessage::user("Seed")));
        store.append_message(id, NewMessage::user("Another"));
        assert_eq!(store.conversation(id).unwrap().title, "Seed");
    }

    #[test]
    fn test_append_grows_by_one_and_bumps_updated_at() {
        let mut store = store();
        let id = store.create_conversation(None);
        let before = store.conversation(id).unwrap().updated_at;

        let message_id = store.append_message(id, NewMessage::user("hello")).unwrap();

        let conv = store.conversation(id).unwrap();
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].id, message_id);
        assert_eq!(conv.messages[0].role, Role::User);
        assert!(conv.updated_at >= before);
    }

    #[test]
    fn test_append_to_unknown_is_noop() {
        let mut store = store();
        store.create_conversation(None);
        let snapshot = store.state().clone();

        assert!(store.append_message(ConversationId::new(), NewMessage::user("x")).is_none());
        assert_eq!(store.state(), &snapshot);
    }

    #[test]
    fn test_delete_active_selects_newest_remaining() {
        let mut store = store();
        let oldest = store.create_conversation(None);
        let middle = store.create_conversation(None);
        let newest = store.create_conversation(None);

        assert!(store.delete_conversation(newest));
        assert_eq!(store.active_conversation_id(), Some(middle));

        assert!(store.delete_conversation(middle));
        assert_eq!(store.active_conversation_id(), Some(oldest));

        assert!(store.delete_conversation(oldest));
        assert_eq!(store.active_conversation_id(), None);
    }

    #[test]
    fn test_delete_inactive_keeps_selection() {
        let mut store = store();
        let old = store.create_conversation(None);
        let current = store.create_conversation(None);

        assert!(store.delete_conversation(old));
        assert_eq!(store.active_conversation_id(), Some(current));
    }

    #[test]
    fn test_delete_unknown_or_twice_is_noop() {
        let mut store = store();
        let a = store.create_conversation(None);
        let b = store.create_conversation(None);
        store.set_active_conversation(Some(a));

        assert!(store.delete_conversation(b));
        assert!(!store.delete_conversation(b));
        assert!(!store.delete_conversation(ConversationId::new()));
        assert_eq!(store.active_conversation_id(), Some(a));
        assert_eq!(store.conversations().len(), 1);
    }

    #[test]
    fn test_rename() {
        let mut store = store();
        let id = store.create_conversation(None);

        assert!(store.rename_conversation(id, "  Trip ideas  "));
        assert_eq!(store.conversation(id).unwrap().title, "Trip ideas");

        assert!(!store.rename_conversation(id, "   "));
        assert_eq!(store.conversation(id).unwrap().title, "Trip ideas");

        assert!(!store.rename_conversation(ConversationId::new(), "Other"));
    }

    #[test]
    fn test_clear_keeps_identity_and_title() {
        let mut store = store();
        let id = store.create_conversation(Some(NewMessage::user("Keep my title")));
        store.append_message(id, NewMessage::assistant("Sure"));
        let before = store.conversation(id).unwrap().clone();

        assert!(store.clear_messages(id));

        let after = store.conversation(id).unwrap();
        assert!(after.messages.is_empty());
        assert_eq!(after.title, before.title);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.id, before.id);
        assert!(after.updated_at >= before.updated_at);

        assert!(!store.clear_messages(ConversationId::new()));
    }

    #[test]
    fn test_dangling_active_reads_as_none() {
        let mut store = store();
        store.create_conversation(None);
        let ghost = ConversationId::new();

        store.set_active_conversation(Some(ghost));
        assert_eq!(store.active_conversation_id(), Some(ghost));
        assert!(store.active_conversation().is_none());

        store.set_active_conversation(None);
        assert!(store.active_conversation().is_none());
    }

    #[test]
    fn test_flag_setters() {
        let mut store = store();
        assert!(!store.toggle_sidebar());
        assert!(!store.sidebar_visible());
        store.set_sidebar_visible(true);
        assert!(store.sidebar_visible());

        let model = ModelId::new("google/gemini-2.0-flash-exp").unwrap();
        store.set_selected_model(model.clone());
        assert_eq!(store.selected_model(), &model);
    }

    #[test]
    fn test_updated_at_never_before_created_at() {
        let mut store = store();
        let id = store.create_conversation(None);
        store.append_message(id, NewMessage::user("a"));
        store.rename_conversation(id, "b");
        store.clear_messages(id);

        let conv = store.conversation(id).unwrap();
        assert!(conv.updated_at >= conv.created_at);
    }
}
