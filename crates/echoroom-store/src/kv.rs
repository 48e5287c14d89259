//! Generic JSON document access.
//!
//! Contract: `load` never fails past this boundary — a missing or corrupt
//! document yields `None` (or the default) with a logged warning. `save` is
//! write-through and converts quota conditions into
//! [`StoreError::QuotaExceeded`] rather than leaking the driver error.

use chrono::Utc;
use rusqlite::params;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use echoroom_shared::constants::MAX_DOCUMENT_SIZE;

use crate::database::Database;
use crate::error::{Result, StoreError};

impl Database {
    /// Fetch a document's raw JSON, if the key exists and is readable.
    pub(crate) fn raw_document(&self, key: &str) -> Option<String> {
        match self.conn().query_row(
            "SELECT json FROM documents WHERE key = ?1",
            params![key],
            |row| row.get(0),
        ) {
            Ok(json) => Some(json),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                warn!(key, error = %e, "document read failed");
                None
            }
        }
    }

    /// Load and deserialize a document. Missing key or corrupt JSON both
    /// yield `None`; corruption is logged.
    pub fn load_document<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.raw_document(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "corrupt document, using default");
                None
            }
        }
    }

    /// Load a document, falling back to the type's default.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.load_document(key).unwrap_or_default()
    }

    /// Serialize and persist a document under `key`.
    ///
    /// Payloads above [`MAX_DOCUMENT_SIZE`] are rejected with
    /// [`StoreError::QuotaExceeded`]; a full backing store maps to the same
    /// variant so callers have a single quota signal.
    pub fn save_document<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json =
            serde_json::to_string(value).map_err(|e| StoreError::Serialize(e.to_string()))?;

        if json.len() > MAX_DOCUMENT_SIZE {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                size: json.len(),
            });
        }

        let size = json.len();
        self.conn()
            .execute(
                "INSERT INTO documents (key, json, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET json = excluded.json, updated_at = excluded.updated_at",
                params![key, json, Utc::now().to_rfc3339()],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::DiskFull =>
                {
                    StoreError::QuotaExceeded {
                        key: key.to_string(),
                        size,
                    }
                }
                other => StoreError::Sqlite(other),
            })?;

        Ok(())
    }

    /// Remove a document. Removing a missing key is not an error.
    pub fn delete_document(&self, key: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM documents WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        n: u32,
        s: String,
    }

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn save_then_load_round_trips() {
        let db = db();
        let doc = Doc { n: 7, s: "x".into() };
        db.save_document("test.doc", &doc).unwrap();
        assert_eq!(db.load_document::<Doc>("test.doc"), Some(doc));
    }

    #[test]
    fn missing_key_loads_default() {
        let db = db();
        assert_eq!(db.load_or_default::<Doc>("test.absent"), Doc::default());
    }

    #[test]
    fn corrupt_json_loads_default_without_error() {
        let db = db();
        db.conn()
            .execute(
                "INSERT INTO documents (key, json, updated_at) VALUES ('test.bad', '{not json', '')",
                [],
            )
            .unwrap();
        assert_eq!(db.load_or_default::<Doc>("test.bad"), Doc::default());
        assert_eq!(db.load_document::<Doc>("test.bad"), None);
    }

    #[test]
    fn oversized_document_is_rejected_with_quota_error() {
        let db = db();
        let blob = "a".repeat(MAX_DOCUMENT_SIZE + 1);
        let err = db.save_document("test.big", &blob).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        // nothing was written
        assert_eq!(db.load_document::<String>("test.big"), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let db = db();
        db.save_document("test.doc", &Doc::default()).unwrap();
        db.delete_document("test.doc").unwrap();
        db.delete_document("test.doc").unwrap();
        assert_eq!(db.load_document::<Doc>("test.doc"), None);
    }
}
