//! Live call state.

use echoroom_shared::call::CallRecord;
use thiserror::Error;

/// The one call currently on screen. Snapshot-able by the UI; the record
/// inside is the draft that gets frozen into history when the call ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCall {
    pub record: CallRecord,
    /// True between `start_call` and the simulated connect.
    pub is_connecting: bool,
    pub is_muted: bool,
    pub is_video_enabled: bool,
    pub is_speaker_on: bool,
    pub duration_secs: u64,
}

#[derive(Error, Debug)]
pub enum CallError {
    #[error("Already in a call")]
    AlreadyInCall,

    #[error("Not in a call")]
    NotInCall,

    #[error("No incoming call")]
    NoIncomingCall,

    #[error("Call state lock poisoned")]
    StatePoisoned,

    #[error(transparent)]
    Store(#[from] echoroom_store::StoreError),
}
