//! Events published by the stores.
//!
//! Cross-store couplings are explicit messages on these channels rather
//! than direct calls, so each store stays independently testable. The UI
//! shell consumes [`SessionEvent`]s (e.g. to apply the dark-mode class);
//! the notification pump consumes [`ConversationEvent`]s.

use echoroom_shared::{ConversationId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The authenticated identity changed (`None` on logout).
    AuthChanged { user: Option<UserId> },
    /// Dark mode flipped; the shell applies the presentation flag.
    DarkModeChanged(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    /// A conversation transitioned from unarchived to archived.
    /// Published exactly once per transition.
    Archived(ConversationId),
}
