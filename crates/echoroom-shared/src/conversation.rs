//! Per-conversation flag state (pinned / archived / muted / left).
//!
//! A conversation with no stored state behaves as if every flag were false;
//! [`ConversationState::new`] produces exactly that default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ConversationId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    pub id: ConversationId,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub is_muted: bool,
    pub is_left: bool,
    pub left_at: Option<DateTime<Utc>>,
}

impl ConversationState {
    /// The all-false default used when no state is stored for an id.
    pub fn new(id: ConversationId) -> Self {
        Self {
            id,
            is_pinned: false,
            is_archived: false,
            is_muted: false,
            is_left: false,
            left_at: None,
        }
    }

    /// Set the archived flag. Returns `true` only when the flag newly
    /// flipped from false to true, so callers can publish the unread-badge
    /// event exactly once.
    pub fn archive(&mut self) -> bool {
        let newly = !self.is_archived;
        self.is_archived = true;
        newly
    }

    pub fn unarchive(&mut self) {
        self.is_archived = false;
    }

    /// Leave the conversation. Leave dominates pin/archive: both flags are
    /// cleared unconditionally and the departure is timestamped.
    pub fn leave(&mut self, at: DateTime<Utc>) {
        self.is_pinned = false;
        self.is_archived = false;
        self.is_left = true;
        self.left_at = Some(at);
    }

    /// Rejoin a previously left conversation.
    pub fn rejoin(&mut self) {
        self.is_left = false;
        self.left_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ConversationState {
        ConversationState::new(ConversationId::new("conv-1"))
    }

    #[test]
    fn archive_reports_transition_once() {
        let mut s = state();
        assert!(s.archive());
        assert!(!s.archive());
        assert!(s.is_archived);
    }

    #[test]
    fn leave_dominates_pin_and_archive() {
        let mut s = state();
        s.is_pinned = true;
        s.archive();

        s.leave(Utc::now());
        assert!(!s.is_pinned);
        assert!(!s.is_archived);
        assert!(s.is_left);
        assert!(s.left_at.is_some());
    }

    #[test]
    fn rejoin_clears_left_state() {
        let mut s = state();
        s.leave(Utc::now());
        s.rejoin();
        assert!(!s.is_left);
        assert!(s.left_at.is_none());
    }
}
