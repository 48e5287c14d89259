//! # echoroom-store
//!
//! Local persistence for the EchoRoom client, backed by SQLite.
//!
//! The store is a key-value document table: every key maps to one JSON
//! document (the current user, the joined-rooms list, the call history,
//! ...). The crate exposes a synchronous [`Database`] handle with typed
//! helpers per domain. Loads never fail past this boundary: a missing or
//! corrupt document degrades to the key's documented default with a logged
//! warning. Saves are write-through and reject oversized payloads with a
//! distinguishable quota error.

pub mod calls;
pub mod conversations;
pub mod database;
pub mod keys;
pub mod kv;
pub mod migrations;
pub mod notifications;
pub mod photos;
pub mod prefs;
pub mod rooms;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;

/// The store handle as shared across stores and background tasks.
pub type SharedDb = std::sync::Arc<std::sync::Mutex<Database>>;
