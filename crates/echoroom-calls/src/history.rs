//! Call history and settings operations.
//!
//! History is a persisted newest-first list; every mutator is a
//! read-modify-write through the store, so the persisted document is the
//! single source of truth.

use chrono::Utc;
use tracing::debug;

use echoroom_shared::call::{CallRecord, CallSettings, CallSettingsPatch, CallStats, ClearTimeframe};
use echoroom_shared::types::CallId;
use echoroom_shared::UserId;

use crate::manager::{CallEvent, CallManager};
use crate::session::CallError;

impl CallManager {
    pub fn history(&self) -> Vec<CallRecord> {
        self.db
            .lock()
            .map(|db| db.call_history())
            .unwrap_or_default()
    }

    /// Prepend a completed record and publish [`CallEvent::Recorded`].
    pub fn add_record(&self, record: CallRecord) -> Result<(), CallError> {
        let db = self.lock_db()?;
        let mut history = db.call_history();
        history.insert(0, record.clone());
        db.save_call_history(&history)?;
        drop(db);

        // the notification layer owns the unread counter
        let _ = self.events.send(CallEvent::Recorded(record));
        Ok(())
    }

    pub fn delete_record(&self, id: CallId) -> Result<(), CallError> {
        let db = self.lock_db()?;
        let mut history = db.call_history();
        history.retain(|record| record.id != id);
        db.save_call_history(&history)?;
        Ok(())
    }

    /// Clear history for a timeframe: records started *before* the cutoff
    /// are dropped, recent ones survive. `All` clears unconditionally.
    pub fn clear_history(&self, timeframe: ClearTimeframe) -> Result<(), CallError> {
        let db = self.lock_db()?;
        let history = match timeframe.cutoff(Utc::now()) {
            None => Vec::new(),
            Some(cutoff) => {
                let mut history = db.call_history();
                history.retain(|record| record.started_at > cutoff);
                history
            }
        };
        debug!(timeframe = ?timeframe, remaining = history.len(), "call history cleared");
        db.save_call_history(&history)?;
        Ok(())
    }

    /// All calls with a given participant, preserving history order.
    pub fn history_for_participant(&self, participant: UserId) -> Vec<CallRecord> {
        self.history()
            .into_iter()
            .filter(|record| record.participant_id == participant)
            .collect()
    }

    pub fn stats(&self) -> CallStats {
        CallStats::from_history(&self.history())
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn settings(&self) -> CallSettings {
        self.db
            .lock()
            .map(|db| db.call_settings())
            .unwrap_or_default()
    }

    /// Merge a partial update into the persisted settings.
    pub fn update_settings(&self, patch: CallSettingsPatch) -> Result<CallSettings, CallError> {
        let db = self.lock_db()?;
        let mut settings = db.call_settings();
        settings.apply(patch);
        db.save_call_settings(&settings)?;
        Ok(settings)
    }
}
