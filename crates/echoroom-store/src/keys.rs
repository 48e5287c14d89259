//! Namespaced document keys.
//!
//! Every persisted document lives under one of these constants; ad-hoc key
//! strings elsewhere in the codebase are a bug.

pub const CURRENT_USER: &str = "echoroom.current_user";
pub const USERS: &str = "echoroom.users";
pub const AUTH_TOKEN: &str = "echoroom.auth_token";
pub const DARK_MODE: &str = "echoroom.dark_mode";
pub const LANGUAGE: &str = "echoroom.language";
pub const JOINED_ROOMS: &str = "echoroom.joined_rooms";
pub const CONVERSATION_STATES: &str = "echoroom.conversation_states";
pub const NOTIFICATION_COUNTS: &str = "echoroom.notification_counts";
pub const CALL_HISTORY: &str = "echoroom.call_history";
pub const CALL_SETTINGS: &str = "echoroom.call_settings";

/// Per-user photos are stored one document each: `echoroom.photo.<uuid>`.
pub const PHOTO_PREFIX: &str = "echoroom.photo";
