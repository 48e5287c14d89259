//! Conversation flag cache.
//!
//! A thin write-through store over the persisted flag map. The only
//! cross-store effect — the archived-chats unread badge — is published as a
//! [`ConversationEvent`] and consumed by the notification pump; this module
//! never touches counters.

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use echoroom_shared::conversation::ConversationState;
use echoroom_shared::ConversationId;
use echoroom_store::{SharedDb, StoreError};

use crate::events::ConversationEvent;

#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("Store lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ConversationStore {
    db: SharedDb,
    events: mpsc::UnboundedSender<ConversationEvent>,
}

impl ConversationStore {
    pub fn new(db: SharedDb) -> (Self, mpsc::UnboundedReceiver<ConversationEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        (Self { db, events }, events_rx)
    }

    /// Current flags for a conversation; all-false default when absent.
    pub fn state(&self, id: &ConversationId) -> ConversationState {
        match self.db.lock() {
            Ok(db) => db.conversation_state(id),
            Err(_) => ConversationState::new(id.clone()),
        }
    }

    pub fn set_pinned(&self, id: &ConversationId, pinned: bool) -> Result<ConversationState, ConversationError> {
        self.update(id, |state| state.is_pinned = pinned)
    }

    pub fn set_muted(&self, id: &ConversationId, muted: bool) -> Result<ConversationState, ConversationError> {
        self.update(id, |state| state.is_muted = muted)
    }

    /// Archive or unarchive. The false→true transition publishes
    /// [`ConversationEvent::Archived`] exactly once; re-archiving an
    /// archived conversation is idempotent and publishes nothing.
    pub fn set_archived(&self, id: &ConversationId, archived: bool) -> Result<ConversationState, ConversationError> {
        let mut newly_archived = false;
        let state = self.update(id, |state| {
            if archived {
                newly_archived = state.archive();
            } else {
                state.unarchive();
            }
        })?;

        if newly_archived {
            debug!(conversation = %id, "conversation archived");
            let _ = self.events.send(ConversationEvent::Archived(id.clone()));
        }
        Ok(state)
    }

    /// Leave a conversation. Leave dominates pin/archive: both flags are
    /// cleared and the departure timestamped.
    pub fn leave(&self, id: &ConversationId) -> Result<ConversationState, ConversationError> {
        self.update(id, |state| state.leave(chrono::Utc::now()))
    }

    pub fn rejoin(&self, id: &ConversationId) -> Result<ConversationState, ConversationError> {
        self.update(id, |state| state.rejoin())
    }

    /// Drop the whole cache (logout).
    pub fn clear_all(&self) -> Result<(), ConversationError> {
        let db = self.db.lock().map_err(|_| ConversationError::Poisoned)?;
        db.clear_conversation_states()?;
        Ok(())
    }

    fn update(
        &self,
        id: &ConversationId,
        apply: impl FnOnce(&mut ConversationState),
    ) -> Result<ConversationState, ConversationError> {
        let db = self.db.lock().map_err(|_| ConversationError::Poisoned)?;
        let mut state = db.conversation_state(id);
        apply(&mut state);
        db.save_conversation_state(&state)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echoroom_store::Database;
    use std::sync::{Arc, Mutex};

    fn store() -> (ConversationStore, mpsc::UnboundedReceiver<ConversationEvent>) {
        let db: SharedDb = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        ConversationStore::new(db)
    }

    #[test]
    fn archiving_publishes_exactly_once() {
        let (store, mut events) = store();
        let id = ConversationId::new("c-1");

        store.set_archived(&id, true).unwrap();
        assert_eq!(
            events.try_recv().unwrap(),
            ConversationEvent::Archived(id.clone())
        );

        // idempotent: no second event
        store.set_archived(&id, true).unwrap();
        assert!(events.try_recv().is_err());

        // unarchive then archive again: a fresh transition, a fresh event
        store.set_archived(&id, false).unwrap();
        store.set_archived(&id, true).unwrap();
        assert_eq!(events.try_recv().unwrap(), ConversationEvent::Archived(id));
    }

    #[test]
    fn leave_dominates_and_rejoin_restores() {
        let (store, _events) = store();
        let id = ConversationId::new("c-1");

        store.set_pinned(&id, true).unwrap();
        store.set_archived(&id, true).unwrap();

        let left = store.leave(&id).unwrap();
        assert!(left.is_left && left.left_at.is_some());
        assert!(!left.is_pinned && !left.is_archived);

        let rejoined = store.rejoin(&id).unwrap();
        assert!(!rejoined.is_left && rejoined.left_at.is_none());
    }

    #[test]
    fn state_defaults_and_mutations_persist() {
        let (store, _events) = store();
        let id = ConversationId::new("c-1");

        let state = store.state(&id);
        assert!(!state.is_pinned && !state.is_muted);

        store.set_muted(&id, true).unwrap();
        assert!(store.state(&id).is_muted);

        store.clear_all().unwrap();
        assert!(!store.state(&id).is_muted);
    }
}
