//! Call lifecycle management.
//!
//! The manager owns the single active call plus the two tasks attached to
//! it: the simulated-connect delay and the one-second duration ticker.
//! Both handles are kept and aborted on every transition that makes them
//! irrelevant — a timer outliving its call is a defect.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use echoroom_shared::call::{CallDirection, CallQuality, CallRecord, CallStatus, CallType};
use echoroom_shared::constants::CALL_CONNECT_DELAY_SECS;
use echoroom_shared::types::CallId;
use echoroom_shared::UserId;
use echoroom_store::{Database, SharedDb};

use crate::session::{ActiveCall, CallError};

/// Published whenever a completed call lands in history. Consumed by the
/// notification layer; the manager never touches counters itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    Recorded(CallRecord),
}

pub(crate) struct SessionState {
    pub(crate) active: Option<ActiveCall>,
    connector: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
}

impl SessionState {
    fn abort_timers(&mut self) {
        if let Some(task) = self.connector.take() {
            task.abort();
        }
        if let Some(task) = self.ticker.take() {
            task.abort();
        }
    }
}

pub struct CallManager {
    state: Arc<Mutex<SessionState>>,
    pub(crate) db: SharedDb,
    pub(crate) events: mpsc::UnboundedSender<CallEvent>,
    connect_delay: Duration,
}

impl CallManager {
    pub fn new(db: SharedDb) -> (Self, mpsc::UnboundedReceiver<CallEvent>) {
        Self::with_connect_delay(db, Duration::from_secs(CALL_CONNECT_DELAY_SECS))
    }

    /// Same as [`CallManager::new`] with an explicit simulated connect
    /// delay. Tests use a short or paused-clock delay.
    pub fn with_connect_delay(
        db: SharedDb,
        connect_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<CallEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let manager = Self {
            state: Arc::new(Mutex::new(SessionState {
                active: None,
                connector: None,
                ticker: None,
            })),
            db,
            events,
            connect_delay,
        };
        (manager, events_rx)
    }

    pub(crate) fn lock_state(&self) -> Result<MutexGuard<'_, SessionState>, CallError> {
        self.state.lock().map_err(|_| CallError::StatePoisoned)
    }

    pub(crate) fn lock_db(&self) -> Result<MutexGuard<'_, Database>, CallError> {
        self.db.lock().map_err(|_| CallError::StatePoisoned)
    }

    /// Snapshot of the live call for the UI, if any.
    pub fn snapshot(&self) -> Option<ActiveCall> {
        self.state.lock().ok()?.active.clone()
    }

    pub fn is_in_call(&self) -> bool {
        self.snapshot().is_some()
    }

    // ------------------------------------------------------------------
    // Outgoing
    // ------------------------------------------------------------------

    /// Start an outgoing call. The call spends `connect_delay` in the
    /// connecting phase, then flips to connected with quality `excellent`
    /// and the duration ticker running.
    pub fn start_call(
        &self,
        participant_id: UserId,
        participant_name: &str,
        call_type: CallType,
    ) -> Result<ActiveCall, CallError> {
        let settings = self.lock_db()?.call_settings();

        let mut state = self.lock_state()?;
        if state.active.is_some() {
            return Err(CallError::AlreadyInCall);
        }

        let record = CallRecord::draft(
            participant_id,
            participant_name,
            call_type,
            CallDirection::Outgoing,
            Utc::now(),
        );
        let call_id = record.id;

        let active = ActiveCall {
            record,
            is_connecting: true,
            is_muted: false,
            is_video_enabled: matches!(call_type, CallType::Video),
            is_speaker_on: settings.speaker_on_by_default,
            duration_secs: 0,
        };
        state.active = Some(active.clone());

        info!(call = %call_id, participant = participant_name, "call started");

        let shared = Arc::clone(&self.state);
        let delay = self.connect_delay;
        state.connector = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            connect(&shared, call_id);
        }));

        Ok(active)
    }

    // ------------------------------------------------------------------
    // Incoming
    // ------------------------------------------------------------------

    /// Register a ringing incoming call.
    pub fn receive_incoming(
        &self,
        participant_id: UserId,
        participant_name: &str,
        call_type: CallType,
    ) -> Result<ActiveCall, CallError> {
        let settings = self.lock_db()?.call_settings();

        let mut state = self.lock_state()?;
        if state.active.is_some() {
            return Err(CallError::AlreadyInCall);
        }

        let record = CallRecord::draft(
            participant_id,
            participant_name,
            call_type,
            CallDirection::Incoming,
            Utc::now(),
        );

        let active = ActiveCall {
            record,
            is_connecting: false,
            is_muted: false,
            is_video_enabled: matches!(call_type, CallType::Video),
            is_speaker_on: settings.speaker_on_by_default,
            duration_secs: 0,
        };
        state.active = Some(active.clone());

        info!(participant = participant_name, "incoming call ringing");
        Ok(active)
    }

    /// Answer the ringing incoming call: connected immediately, ticker on.
    pub fn answer_call(&self) -> Result<ActiveCall, CallError> {
        let mut state = self.lock_state()?;
        let active = state.active.as_mut().ok_or(CallError::NoIncomingCall)?;
        if active.record.status != CallStatus::Incoming {
            return Err(CallError::NoIncomingCall);
        }

        active.record.status = CallStatus::Connected;
        active.record.quality = CallQuality::Excellent;
        let call_id = active.record.id;
        let snapshot = active.clone();

        info!(call = %call_id, "incoming call answered");
        state.ticker = Some(spawn_ticker(Arc::clone(&self.state), call_id));

        Ok(snapshot)
    }

    /// Decline the ringing incoming call. Produces a zero-duration
    /// `declined` history record.
    pub fn decline_call(&self) -> Result<CallRecord, CallError> {
        self.finish_incoming(CallStatus::Declined)
    }

    /// Record a ring that was never answered (remote hung up or timed
    /// out). Produces a zero-duration `missed` history record.
    pub fn mark_missed(&self) -> Result<CallRecord, CallError> {
        self.finish_incoming(CallStatus::Missed)
    }

    fn finish_incoming(&self, status: CallStatus) -> Result<CallRecord, CallError> {
        let active = {
            let mut state = self.lock_state()?;
            match &state.active {
                Some(active) if active.record.status == CallStatus::Incoming => {}
                _ => return Err(CallError::NoIncomingCall),
            }
            state.abort_timers();
            state.active.take().ok_or(CallError::NoIncomingCall)?
        };

        let mut record = active.record;
        record.status = status;
        record.ended_at = Some(Utc::now());
        record.duration_secs = 0;

        debug!(call = %record.id, status = ?status, "incoming call finished");
        self.add_record(record.clone())?;
        Ok(record)
    }

    // ------------------------------------------------------------------
    // Termination
    // ------------------------------------------------------------------

    /// End the active call: freeze its final duration and flags into a
    /// completed record, prepend it to history, reset live state. With no
    /// active call this is a no-op returning `None`.
    pub fn end_call(&self) -> Result<Option<CallRecord>, CallError> {
        let active = {
            let mut state = self.lock_state()?;
            state.abort_timers();
            match state.active.take() {
                Some(active) => active,
                None => return Ok(None),
            }
        };

        let mut record = active.record;
        record.status = CallStatus::Ended;
        record.ended_at = Some(Utc::now());
        record.duration_secs = active.duration_secs;
        record.was_muted = active.is_muted;
        record.was_video_enabled = active.is_video_enabled;

        info!(call = %record.id, duration = record.duration_secs, "call ended");
        self.add_record(record.clone())?;
        Ok(Some(record))
    }

    // ------------------------------------------------------------------
    // In-call toggles
    // ------------------------------------------------------------------

    pub fn toggle_mute(&self) -> Result<bool, CallError> {
        self.toggle(|active| {
            active.is_muted = !active.is_muted;
            active.is_muted
        })
    }

    pub fn toggle_video(&self) -> Result<bool, CallError> {
        self.toggle(|active| {
            active.is_video_enabled = !active.is_video_enabled;
            active.is_video_enabled
        })
    }

    pub fn toggle_speaker(&self) -> Result<bool, CallError> {
        self.toggle(|active| {
            active.is_speaker_on = !active.is_speaker_on;
            active.is_speaker_on
        })
    }

    fn toggle(&self, apply: impl FnOnce(&mut ActiveCall) -> bool) -> Result<bool, CallError> {
        let mut state = self.lock_state()?;
        let active = state.active.as_mut().ok_or(CallError::NotInCall)?;
        Ok(apply(active))
    }
}

impl Drop for CallManager {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.abort_timers();
        }
    }
}

/// Flip the call to connected once the simulated connect delay elapses,
/// and hand it a running ticker. Guarded by call id: if the call was
/// already ended (and a new one possibly started), this does nothing.
fn connect(state: &Arc<Mutex<SessionState>>, call_id: CallId) {
    let Ok(mut guard) = state.lock() else {
        return;
    };

    let still_current = matches!(
        &guard.active,
        Some(active) if active.record.id == call_id && active.is_connecting
    );
    if !still_current {
        return;
    }

    if let Some(active) = guard.active.as_mut() {
        active.is_connecting = false;
        active.record.status = CallStatus::Connected;
        active.record.quality = CallQuality::Excellent;
        debug!(call = %call_id, "call connected");
    }
    guard.ticker = Some(spawn_ticker(Arc::clone(state), call_id));
}

/// One-second duration ticker. Stops itself the moment the active call is
/// gone, replaced, or no longer connected; `end_call` additionally aborts
/// it so no tick can land mid-teardown.
fn spawn_ticker(state: Arc<Mutex<SessionState>>, call_id: CallId) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;

            let Ok(mut guard) = state.lock() else {
                break;
            };
            match guard.active.as_mut() {
                Some(active)
                    if active.record.id == call_id
                        && active.record.status == CallStatus::Connected =>
                {
                    active.duration_secs += 1;
                }
                _ => break,
            }
        }
    })
}
