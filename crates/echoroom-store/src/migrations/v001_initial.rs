//! v001 -- Initial schema creation.
//!
//! Creates the single `documents` table backing the key-value store.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Documents (key-value JSON store)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS documents (
    key        TEXT PRIMARY KEY NOT NULL,   -- namespaced key, e.g. 'echoroom.current_user'
    json       TEXT NOT NULL,               -- serialized document
    updated_at TEXT NOT NULL                -- ISO-8601 / RFC-3339
);
"#;

pub fn up(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(UP_SQL)
}
