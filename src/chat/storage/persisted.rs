//! Persistence decorator around the conversation store.
//!
//! `PersistedStore` loads the whole store from one slot of a [`BlobStore`] at
//! startup and writes it back after every command that changed something.
//! The wrapped [`ConversationStore`] never touches I/O.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chat::core::errors::{ChatError, ChatResult};
use crate::chat::core::ids::{ConversationId, MessageId, ModelId};
use crate::chat::core::message::NewMessage;
use crate::chat::storage::blob_store::BlobStore;
use crate::chat::store::state::{ConversationStore, StoreDefaults, StoreState};

/// Version of the persisted envelope understood by this build.
pub const STATE_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    state: &'a StoreState,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    state: StoreState,
}

/// Serialize store state into the persisted JSON envelope.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn encode_state(state: &StoreState) -> ChatResult<Vec<u8>> {
    Ok(serde_json::to_vec(&EnvelopeRef {
        version: STATE_VERSION,
        state,
    })?)
}

/// Parse a persisted JSON envelope.
///
/// # Errors
/// Returns an error if the blob is malformed or has an unknown version.
pub fn decode_state(blob: &[u8]) -> ChatResult<StoreState> {
    let envelope: Envelope = serde_json::from_slice(blob)?;
    if envelope.version != STATE_VERSION {
        return Err(ChatError::UnsupportedStateVersion {
            found: envelope.version,
            expected: STATE_VERSION,
        });
    }
    Ok(envelope.state)
}

/// Conversation store that saves itself after every mutation.
pub struct PersistedStore<B> {
    inner: ConversationStore,
    backend: B,
    slot: String,
    defaults: StoreDefaults,
}

impl<B: BlobStore> PersistedStore<B> {
    /// Load the store from `slot`, falling back to defaults.
    ///
    /// A missing slot starts empty. A backend error, malformed blob or
    /// unknown version is logged and also starts empty; the bad blob is
    /// overwritten by the next save.
    pub fn load(backend: B, slot: impl Into<String>, defaults: StoreDefaults) -> Self {
        let slot = slot.into();
        let inner = match Self::read_state(&backend, &slot) {
            Ok(Some(state)) => {
                info!(
                    "Loaded {} conversations from slot {slot}",
                    state.conversations.len()
                );
                ConversationStore::from_state(heal(state), defaults.title.clone())
            }
            Ok(None) => {
                debug!("Slot {slot} is empty, starting fresh");
                ConversationStore::new(&defaults)
            }
            Err(err) => {
                warn!("Could not restore slot {slot}, starting fresh: {err}");
                ConversationStore::new(&defaults)
            }
        };

        Self {
            inner,
            backend,
            slot,
            defaults,
        }
    }

    fn read_state(backend: &B, slot: &str) -> ChatResult<Option<StoreState>> {
        backend
            .get(slot)?
            .map(|blob| decode_state(&blob))
            .transpose()
    }

    /// Read access to the wrapped store.
    #[must_use]
    pub const fn store(&self) -> &ConversationStore {
        &self.inner
    }

    /// Read access to the storage backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Write the current state to the backend.
    ///
    /// # Errors
    /// Returns an error if serialization or the backend write fails.
    pub fn flush(&mut self) -> ChatResult<()> {
        let blob = encode_state(self.inner.state())?;
        self.backend.put(&self.slot, &blob)
    }

    fn persist(&mut self) {
        if let Err(err) = self.flush() {
            warn!("Failed to save slot {}: {err}", self.slot);
        }
    }

    fn persist_if(&mut self, changed: bool) -> bool {
        if changed {
            self.persist();
        }
        changed
    }

    /// Drop the saved slot and return to an empty store.
    ///
    /// # Errors
    /// Returns an error if the backend cannot remove the slot.
    pub fn clear_slot(&mut self) -> ChatResult<()> {
        self.backend.remove(&self.slot)?;
        self.inner = ConversationStore::new(&self.defaults);
        info!("Cleared slot {}", self.slot);
        Ok(())
    }

    // ===== Commands ==========================================================

    /// See [`ConversationStore::create_conversation`].
    pub fn create_conversation(&mut self, seed: Option<NewMessage>) -> ConversationId {
        let id = self.inner.create_conversation(seed);
        self.persist();
        id
    }

    /// See [`ConversationStore::delete_conversation`].
    pub fn delete_conversation(&mut self, id: ConversationId) -> bool {
        let changed = self.inner.delete_conversation(id);
        self.persist_if(changed)
    }

    /// See [`ConversationStore::rename_conversation`].
    pub fn rename_conversation(&mut self, id: ConversationId, title: &str) -> bool {
        let changed = self.inner.rename_conversation(id, title);
        self.persist_if(changed)
    }

    /// See [`ConversationStore::append_message`].
    pub fn append_message(&mut self, id: ConversationId, message: NewMessage) -> Option<MessageId> {
        let appended = self.inner.append_message(id, message);
        self.persist_if(appended.is_some());
        appended
    }

    /// See [`ConversationStore::clear_messages`].
    pub fn clear_messages(&mut self, id: ConversationId) -> bool {
        let changed = self.inner.clear_messages(id);
        self.persist_if(changed)
    }

    /// See [`ConversationStore::set_active_conversation`].
    pub fn set_active_conversation(&mut self, id: Option<ConversationId>) {
        self.inner.set_active_conversation(id);
        self.persist();
    }

    /// See [`ConversationStore::set_sidebar_visible`].
    pub fn set_sidebar_visible(&mut self, visible: bool) {
        self.inner.set_sidebar_visible(visible);
        self.persist();
    }

    /// See [`ConversationStore::toggle_sidebar`].
    pub fn toggle_sidebar(&mut self) -> bool {
        let visible = self.inner.toggle_sidebar();
        self.persist();
        visible
    }

    /// See [`ConversationStore::set_selected_model`].
    pub fn set_selected_model(&mut self, model: ModelId) {
        self.inner.set_selected_model(model);
        self.persist();
    }
}

// An active id pointing at no stored conversation is reset to none.
fn heal(mut state: StoreState) -> StoreState {
    let dangling = state
        .active_conversation_id
        .filter(|id| !state.conversations.iter().any(|c| c.id == *id));
    if let Some(id) = dangling {
        warn!("Persisted active conversation {} is missing, clearing it", id.short());
        state.active_conversation_id = None;
    }
    state
}
