//! Global unread counters backing the notification badges.

use serde::{Deserialize, Serialize};

/// Unread counters. Incremented by producer events (archiving a chat,
/// recording a call) and reset to zero by explicit mark-as-read actions.
/// Counters are unsigned and increments saturate, so they can never go
/// negative or wrap.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCounts {
    pub archived_chats: u32,
    pub call_history: u32,
}

impl NotificationCounts {
    pub fn bump_archived_chats(&mut self) {
        self.archived_chats = self.archived_chats.saturating_add(1);
    }

    pub fn bump_call_history(&mut self) {
        self.call_history = self.call_history.saturating_add(1);
    }

    pub fn reset_archived_chats(&mut self) {
        self.archived_chats = 0;
    }

    pub fn reset_call_history(&mut self) {
        self.call_history = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_and_reset() {
        let mut c = NotificationCounts::default();
        c.bump_archived_chats();
        c.bump_archived_chats();
        c.bump_call_history();
        assert_eq!(c.archived_chats, 2);
        assert_eq!(c.call_history, 1);

        c.reset_archived_chats();
        assert_eq!(c.archived_chats, 0);
        assert_eq!(c.call_history, 1);
    }

    #[test]
    fn bump_saturates_at_max() {
        let mut c = NotificationCounts {
            archived_chats: u32::MAX,
            call_history: 0,
        };
        c.bump_archived_chats();
        assert_eq!(c.archived_chats, u32::MAX);
    }
}
