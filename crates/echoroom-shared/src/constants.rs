/// Application name
pub const APP_NAME: &str = "EchoRoom";

/// Longest edge allowed for a stored profile photo, in pixels.
/// Larger images are downscaled before encoding.
pub const MAX_PHOTO_DIMENSION: u32 = 1024;

/// JPEG quality used when re-encoding photos for storage.
pub const PHOTO_JPEG_QUALITY: u8 = 80;

/// Maximum size of a single persisted document in bytes (256 KiB).
/// Writes above this are rejected with a quota error.
pub const MAX_DOCUMENT_SIZE: usize = 262_144;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Username length bounds.
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 24;

/// Simulated connect delay for outgoing calls, in seconds.
pub const CALL_CONNECT_DELAY_SECS: u64 = 2;

/// Default interval between update-manifest checks, in seconds.
pub const UPDATE_CHECK_INTERVAL_SECS: u64 = 60 * 60;
