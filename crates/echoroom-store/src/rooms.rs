//! Joined-rooms list.
//!
//! The one key with self-healing semantics: a corrupt document is reset to
//! an empty list *and persisted back immediately*, so every later reader —
//! including other browsing contexts — sees the healed value.

use tracing::warn;

use echoroom_shared::RoomId;

use crate::database::Database;
use crate::error::Result;
use crate::keys;

impl Database {
    /// Load the joined-rooms list.
    ///
    /// Missing key → empty list. Corrupt JSON → empty list, persisted back
    /// so the corruption does not survive.
    pub fn joined_rooms(&self) -> Vec<RoomId> {
        let Some(raw) = self.raw_document(keys::JOINED_ROOMS) else {
            return Vec::new();
        };

        match serde_json::from_str(&raw) {
            Ok(rooms) => rooms,
            Err(e) => {
                warn!(error = %e, "joined rooms document corrupt, resetting");
                if let Err(e) = self.save_joined_rooms(&[]) {
                    warn!(error = %e, "failed to persist healed joined rooms");
                }
                Vec::new()
            }
        }
    }

    pub fn save_joined_rooms(&self, rooms: &[RoomId]) -> Result<()> {
        self.save_document(keys::JOINED_ROOMS, rooms)
    }

    pub fn clear_joined_rooms(&self) -> Result<()> {
        self.delete_document(keys::JOINED_ROOMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn round_trip() {
        let db = db();
        assert!(db.joined_rooms().is_empty());

        let rooms = vec![RoomId::new("lobby"), RoomId::new("dating-tips")];
        db.save_joined_rooms(&rooms).unwrap();
        assert_eq!(db.joined_rooms(), rooms);
    }

    #[test]
    fn corrupt_list_is_healed_in_storage() {
        let db = db();
        db.conn()
            .execute(
                "INSERT INTO documents (key, json, updated_at) VALUES (?1, '[[broken', '')",
                params![keys::JOINED_ROOMS],
            )
            .unwrap();

        assert!(db.joined_rooms().is_empty());

        // the stored document itself was reset, not just the returned value
        let raw: String = db
            .conn()
            .query_row(
                "SELECT json FROM documents WHERE key = ?1",
                params![keys::JOINED_ROOMS],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(raw, "[]");
    }
}
