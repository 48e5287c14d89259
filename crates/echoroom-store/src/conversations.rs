//! Persisted per-conversation flag map.

use std::collections::HashMap;

use echoroom_shared::conversation::ConversationState;
use echoroom_shared::ConversationId;

use crate::database::Database;
use crate::error::Result;
use crate::keys;

impl Database {
    /// The whole flag map. Missing or corrupt → empty map.
    pub fn conversation_states(&self) -> HashMap<ConversationId, ConversationState> {
        self.load_or_default(keys::CONVERSATION_STATES)
    }

    /// State for one conversation; all-false default when absent.
    pub fn conversation_state(&self, id: &ConversationId) -> ConversationState {
        self.conversation_states()
            .remove(id)
            .unwrap_or_else(|| ConversationState::new(id.clone()))
    }

    /// Read-modify-write a single conversation's state into the map.
    pub fn save_conversation_state(&self, state: &ConversationState) -> Result<()> {
        let mut states = self.conversation_states();
        states.insert(state.id.clone(), state.clone());
        self.save_document(keys::CONVERSATION_STATES, &states)
    }

    /// Drop the entire map (logout).
    pub fn clear_conversation_states(&self) -> Result<()> {
        self.delete_document(keys::CONVERSATION_STATES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn absent_conversation_defaults_all_false() {
        let db = db();
        let state = db.conversation_state(&ConversationId::new("c1"));
        assert!(!state.is_pinned && !state.is_archived && !state.is_muted && !state.is_left);
    }

    #[test]
    fn save_and_reload_single_state() {
        let db = db();
        let id = ConversationId::new("c1");

        let mut state = db.conversation_state(&id);
        state.is_pinned = true;
        db.save_conversation_state(&state).unwrap();

        let mut state = db.conversation_state(&id);
        state.leave(Utc::now());
        db.save_conversation_state(&state).unwrap();

        let reloaded = db.conversation_state(&id);
        assert!(reloaded.is_left && !reloaded.is_pinned);

        db.clear_conversation_states().unwrap();
        assert!(db.conversation_states().is_empty());
    }
}
