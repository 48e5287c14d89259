//! Notification counters and the event pump.
//!
//! The pump is the single consumer of the conversation and call event
//! channels: it turns published store events into counter increments. That
//! keeps the producing stores and this one independently testable — the
//! coupling is a message, not a call.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use echoroom_calls::CallEvent;
use echoroom_shared::notifications::NotificationCounts;
use echoroom_store::SharedDb;

use crate::conversations::ConversationError;
use crate::events::ConversationEvent;

#[derive(Clone)]
pub struct NotificationStore {
    db: SharedDb,
}

impl NotificationStore {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub fn counts(&self) -> NotificationCounts {
        self.db
            .lock()
            .map(|db| db.notification_counts())
            .unwrap_or_default()
    }

    pub fn increment_archived_chats(&self) -> Result<NotificationCounts, ConversationError> {
        self.update(|counts| counts.bump_archived_chats())
    }

    pub fn increment_call_history(&self) -> Result<NotificationCounts, ConversationError> {
        self.update(|counts| counts.bump_call_history())
    }

    /// Mark the archived-chats badge as read (reset to zero).
    pub fn mark_archived_read(&self) -> Result<NotificationCounts, ConversationError> {
        self.update(|counts| counts.reset_archived_chats())
    }

    /// Mark the call-history badge as read (reset to zero).
    pub fn mark_call_history_read(&self) -> Result<NotificationCounts, ConversationError> {
        self.update(|counts| counts.reset_call_history())
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut NotificationCounts),
    ) -> Result<NotificationCounts, ConversationError> {
        let db = self.db.lock().map_err(|_| ConversationError::Poisoned)?;
        let mut counts = db.notification_counts();
        apply(&mut counts);
        db.save_notification_counts(&counts)?;
        Ok(counts)
    }
}

/// Consume store events and apply counter increments until every producer
/// is gone. The returned handle is owned by the [`App`] and aborted on
/// teardown.
///
/// [`App`]: crate::App
pub fn spawn_notification_pump(
    store: NotificationStore,
    mut conversation_events: mpsc::UnboundedReceiver<ConversationEvent>,
    mut call_events: mpsc::UnboundedReceiver<CallEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(event) = conversation_events.recv() => {
                    let ConversationEvent::Archived(id) = event;
                    debug!(conversation = %id, "bumping archived-chats badge");
                    if let Err(e) = store.increment_archived_chats() {
                        warn!(error = %e, "failed to bump archived-chats badge");
                    }
                }

                Some(event) = call_events.recv() => {
                    let CallEvent::Recorded(record) = event;
                    debug!(call = %record.id, "bumping call-history badge");
                    if let Err(e) = store.increment_call_history() {
                        warn!(error = %e, "failed to bump call-history badge");
                    }
                }

                else => break,
            }
        }
        debug!("notification pump stopped");
    })
}
