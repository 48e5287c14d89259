use thiserror::Error;

/// Errors produced by the store layer.
///
/// Note that *loads* never surface errors at all — corrupt or missing
/// documents degrade to defaults inside the helpers. Only writes and
/// environment failures reach callers.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document write exceeded the per-document quota, or the backing
    /// store itself reported it is full.
    #[error("Storage quota exceeded for key '{key}' ({size} bytes)")]
    QuotaExceeded { key: String, size: usize },

    /// Serialization failure on write.
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
