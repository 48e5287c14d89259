//! Call records, settings, and history timeframes.
//!
//! A [`CallRecord`] is built as a draft when a call starts and frozen when
//! the call terminates; once it lands in history it is never mutated.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CallId, UserId};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Voice,
    Video,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallDirection {
    Outgoing,
    Incoming,
}

/// Terminal and in-flight call statuses. `Outgoing`/`Incoming` only ever
/// appear on the live draft; history records carry one of the terminal
/// variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Outgoing,
    Incoming,
    Connected,
    Ended,
    Missed,
    Declined,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallQuality {
    Excellent,
    Good,
    Poor,
    Unknown,
}

// ---------------------------------------------------------------------------
// CallRecord
// ---------------------------------------------------------------------------

/// A call summary. Immutable once it enters the history list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub id: CallId,
    pub participant_id: UserId,
    pub participant_name: String,
    pub call_type: CallType,
    pub status: CallStatus,
    pub direction: CallDirection,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: u64,
    pub was_muted: bool,
    pub was_video_enabled: bool,
    pub quality: CallQuality,
}

impl CallRecord {
    /// Draft for a call that is just starting.
    pub fn draft(
        participant_id: UserId,
        participant_name: impl Into<String>,
        call_type: CallType,
        direction: CallDirection,
        started_at: DateTime<Utc>,
    ) -> Self {
        let status = match direction {
            CallDirection::Outgoing => CallStatus::Outgoing,
            CallDirection::Incoming => CallStatus::Incoming,
        };

        Self {
            id: CallId::new(),
            participant_id,
            participant_name: participant_name.into(),
            call_type,
            status,
            direction,
            started_at,
            ended_at: None,
            duration_secs: 0,
            was_muted: false,
            was_video_enabled: matches!(call_type, CallType::Video),
            quality: CallQuality::Unknown,
        }
    }
}

/// Aggregate history counts, computed in a single pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallStats {
    pub total: usize,
    pub voice: usize,
    pub video: usize,
    pub missed: usize,
}

impl CallStats {
    pub fn from_history(history: &[CallRecord]) -> Self {
        let mut stats = Self::default();
        for record in history {
            stats.total += 1;
            match record.call_type {
                CallType::Voice => stats.voice += 1,
                CallType::Video => stats.video += 1,
            }
            if record.status == CallStatus::Missed {
                stats.missed += 1;
            }
        }
        stats
    }
}

// ---------------------------------------------------------------------------
// Timeframes
// ---------------------------------------------------------------------------

/// History-clearing timeframe. `cutoff` yields the instant before which
/// records are discarded; `All` has no cutoff and clears unconditionally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClearTimeframe {
    Day,
    Week,
    Month,
    All,
}

impl ClearTimeframe {
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Day => Some(now - Duration::hours(24)),
            Self::Week => Some(now - Duration::days(7)),
            // One calendar month back; clamped by chrono at month ends
            Self::Month => now.checked_sub_months(Months::new(1)),
            Self::All => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallSettings {
    pub speaker_on_by_default: bool,
    pub video_on_by_default: bool,
    pub ringtone: String,
    pub vibrate: bool,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            speaker_on_by_default: false,
            video_on_by_default: true,
            ringtone: "classic".into(),
            vibrate: true,
        }
    }
}

/// Partial update for [`CallSettings`]; unset fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSettingsPatch {
    pub speaker_on_by_default: Option<bool>,
    pub video_on_by_default: Option<bool>,
    pub ringtone: Option<String>,
    pub vibrate: Option<bool>,
}

impl CallSettings {
    pub fn apply(&mut self, patch: CallSettingsPatch) {
        if let Some(v) = patch.speaker_on_by_default {
            self.speaker_on_by_default = v;
        }
        if let Some(v) = patch.video_on_by_default {
            self.video_on_by_default = v;
        }
        if let Some(v) = patch.ringtone {
            self.ringtone = v;
        }
        if let Some(v) = patch.vibrate {
            self.vibrate = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_single_pass_counts() {
        let now = Utc::now();
        let mut a = CallRecord::draft(
            UserId::new(),
            "ada",
            CallType::Voice,
            CallDirection::Outgoing,
            now,
        );
        a.status = CallStatus::Ended;
        let mut b = CallRecord::draft(
            UserId::new(),
            "bo",
            CallType::Video,
            CallDirection::Incoming,
            now,
        );
        b.status = CallStatus::Missed;

        let stats = CallStats::from_history(&[a, b]);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.voice, 1);
        assert_eq!(stats.video, 1);
        assert_eq!(stats.missed, 1);
    }

    #[test]
    fn timeframe_cutoffs() {
        let now = Utc::now();
        assert_eq!(ClearTimeframe::Day.cutoff(now), Some(now - Duration::hours(24)));
        assert_eq!(ClearTimeframe::Week.cutoff(now), Some(now - Duration::days(7)));
        assert!(ClearTimeframe::Month.cutoff(now).unwrap() < now - Duration::days(27));
        assert_eq!(ClearTimeframe::All.cutoff(now), None);
    }

    #[test]
    fn settings_patch_merges_partially() {
        let mut settings = CallSettings::default();
        settings.apply(CallSettingsPatch {
            ringtone: Some("chime".into()),
            vibrate: Some(false),
            ..Default::default()
        });

        assert_eq!(settings.ringtone, "chime");
        assert!(!settings.vibrate);
        // untouched fields keep their defaults
        assert!(settings.video_on_by_default);
        assert!(!settings.speaker_on_by_default);
    }
}
