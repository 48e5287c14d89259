//! Persisted call history and call settings.
//!
//! History is newest-first: completed calls are prepended by the call
//! manager. The two documents are independent — settings updates never
//! touch history.

use echoroom_shared::call::{CallRecord, CallSettings};

use crate::database::Database;
use crate::error::Result;
use crate::keys;

impl Database {
    pub fn call_history(&self) -> Vec<CallRecord> {
        self.load_or_default(keys::CALL_HISTORY)
    }

    pub fn save_call_history(&self, history: &[CallRecord]) -> Result<()> {
        self.save_document(keys::CALL_HISTORY, history)
    }

    pub fn call_settings(&self) -> CallSettings {
        self.load_or_default(keys::CALL_SETTINGS)
    }

    pub fn save_call_settings(&self, settings: &CallSettings) -> Result<()> {
        self.save_document(keys::CALL_SETTINGS, settings)
    }
}
