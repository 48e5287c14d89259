//! Session and auth state.
//!
//! Holds the current user, language, dark-mode flag and joined-rooms list.
//! `is_authenticated` is *derived* from the user — there is deliberately no
//! independent setter for it, so the two can never diverge.
//!
//! Room mutations are write-ahead: the storage write happens before the
//! in-memory update, and a failed write leaves memory untouched, keeping
//! both copies equal at every step.

use std::sync::MutexGuard;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use echoroom_shared::user::User;
use echoroom_shared::validation::{RegistrationForm, ValidationIssue};
use echoroom_shared::{RoomId, UserId};
use echoroom_store::{Database, SharedDb, StoreError};

use crate::events::SessionEvent;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation failed ({} issue(s))", .0.len())]
    Invalid(Vec<ValidationIssue>),

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Unknown user")]
    UnknownUser,

    #[error("Store lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct SessionStore {
    db: SharedDb,
    user: Option<User>,
    language: String,
    dark_mode: bool,
    joined_rooms: Vec<RoomId>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionStore {
    /// Read persisted session state once at startup. A malformed
    /// joined-rooms document is reset to an empty list by the store helper
    /// (self-healing), so initialization itself cannot fail on bad data.
    pub fn initialize(db: SharedDb) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();

        let (user, language, dark_mode, joined_rooms) = match db.lock() {
            Ok(guard) => (
                guard.current_user(),
                guard.language(),
                guard.dark_mode(),
                guard.joined_rooms(),
            ),
            Err(_) => {
                warn!("store lock poisoned during session init, starting empty");
                (None, "en".to_string(), false, Vec::new())
            }
        };

        let store = Self {
            db,
            user,
            language,
            dark_mode,
            joined_rooms,
            events,
        };
        (store, events_rx)
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>, AuthError> {
        self.db.lock().map_err(|_| AuthError::Poisoned)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Derived, never stored: authenticated iff a user is present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn joined_rooms(&self) -> &[RoomId] {
        &self.joined_rooms
    }

    /// Bearer token for the signaling connection, read from storage so the
    /// connect path always sees the latest value.
    pub fn auth_token(&self) -> Option<String> {
        self.db.lock().ok()?.auth_token()
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// Register a new local user and sign them in.
    pub fn register(&mut self, form: &RegistrationForm) -> Result<User, AuthError> {
        let report = form.validate();
        if !report.ok {
            return Err(AuthError::Invalid(report.issues));
        }

        {
            let db = self.db()?;
            if db.find_user_by_username(&form.username).is_some() {
                return Err(AuthError::UsernameTaken);
            }
        }

        let user = User::new(
            form.username.clone(),
            form.email.clone(),
            form.gender,
            form.orientation.clone(),
        );

        {
            let db = self.db()?;
            db.upsert_user(&user)?;
        }
        self.sign_in(user.clone())?;

        info!(username = %user.username, "user registered");
        Ok(user)
    }

    /// Sign in an existing local user by username.
    pub fn login(&mut self, username: &str) -> Result<User, AuthError> {
        let user = self
            .db()?
            .find_user_by_username(username)
            .ok_or(AuthError::UnknownUser)?;

        self.sign_in(user.clone())?;
        info!(username = %user.username, "user signed in");
        Ok(user)
    }

    fn sign_in(&mut self, user: User) -> Result<(), AuthError> {
        // locally issued bearer token; a real auth backend would hand one out
        let token = format!("local-{}", Uuid::new_v4());
        {
            let db = self.db()?;
            db.set_auth_token(&token)?;
            db.set_current_user(&user)?;
        }

        let id = user.id;
        self.user = Some(user);
        self.emit(SessionEvent::AuthChanged { user: Some(id) });
        Ok(())
    }

    /// Replace (or clear) the current user directly, e.g. after a profile
    /// edit.
    pub fn set_user(&mut self, user: Option<User>) -> Result<(), AuthError> {
        {
            let db = self.db()?;
            match &user {
                Some(user) => db.set_current_user(user)?,
                None => db.clear_current_user()?,
            }
        }

        let id = user.as_ref().map(|u| u.id);
        self.user = user;
        self.emit(SessionEvent::AuthChanged { user: id });
        Ok(())
    }

    /// Clear the session: user, token, joined rooms (memory and storage)
    /// and the conversation flag cache.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        {
            let db = self.db()?;
            db.clear_current_user()?;
            db.clear_auth_token()?;
            db.clear_joined_rooms()?;
            db.clear_conversation_states()?;
        }

        self.user = None;
        self.joined_rooms.clear();
        self.emit(SessionEvent::AuthChanged { user: None });

        info!("session cleared");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Preferences
    // ------------------------------------------------------------------

    pub fn toggle_dark_mode(&mut self) -> Result<bool, AuthError> {
        let next = !self.dark_mode;
        self.db()?.set_dark_mode(next)?;
        self.dark_mode = next;
        self.emit(SessionEvent::DarkModeChanged(next));
        Ok(next)
    }

    pub fn set_language(&mut self, language: &str) -> Result<(), AuthError> {
        self.db()?.set_language(language)?;
        self.language = language.to_string();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rooms
    // ------------------------------------------------------------------

    /// Join a room. Duplicates are ignored; the storage write lands before
    /// the in-memory update.
    pub fn join_room(&mut self, room: &RoomId) -> Result<(), AuthError> {
        if self.joined_rooms.contains(room) {
            return Ok(());
        }

        let mut next = self.joined_rooms.clone();
        next.push(room.clone());

        self.db()?.save_joined_rooms(&next)?;
        self.joined_rooms = next;
        Ok(())
    }

    pub fn leave_room(&mut self, room: &RoomId) -> Result<(), AuthError> {
        if !self.joined_rooms.contains(room) {
            return Ok(());
        }

        let next: Vec<RoomId> = self
            .joined_rooms
            .iter()
            .filter(|r| *r != room)
            .cloned()
            .collect();

        self.db()?.save_joined_rooms(&next)?;
        self.joined_rooms = next;
        Ok(())
    }

    /// Apply a joined-rooms payload written by another browsing context.
    /// Malformed payloads are logged and ignored; well-formed ones replace
    /// the in-memory list without another storage write.
    pub fn apply_external_rooms_update(&mut self, raw: &str) {
        match serde_json::from_str::<Vec<RoomId>>(raw) {
            Ok(rooms) => {
                self.joined_rooms = rooms;
            }
            Err(e) => warn!(error = %e, "ignoring malformed external rooms update"),
        }
    }

    pub fn current_user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echoroom_shared::user::GenderIdentity;
    use std::sync::{Arc, Mutex};

    fn store() -> (SessionStore, mpsc::UnboundedReceiver<SessionEvent>) {
        let db: SharedDb = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        SessionStore::initialize(db)
    }

    fn form(username: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.into(),
            email: format!("{username}@example.com"),
            password: "Sup3rSecret".into(),
            gender: GenderIdentity::Female,
            orientation: "heterosexual".into(),
        }
    }

    fn persisted_rooms(store: &SessionStore) -> Vec<RoomId> {
        store.db.lock().unwrap().joined_rooms()
    }

    #[test]
    fn authenticated_iff_user_present() {
        let (mut store, mut events) = store();
        assert!(!store.is_authenticated());

        let user = store.register(&form("ada")).unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.user().map(|u| u.id), Some(user.id));
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::AuthChanged {
                user: Some(user.id)
            }
        );

        store.logout().unwrap();
        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
    }

    #[test]
    fn registration_derives_attraction_and_persists() {
        let (mut store, _events) = store();
        let user = store.register(&form("ada")).unwrap();
        assert_eq!(user.attracted_to, vec![GenderIdentity::Male]);
        assert!(store.auth_token().is_some());

        // reinitializing from the same database restores the session
        let db = Arc::clone(&store.db);
        let (restored, _rx) = SessionStore::initialize(db);
        assert!(restored.is_authenticated());
        assert_eq!(restored.user().unwrap().username, "ada");
    }

    #[test]
    fn duplicate_username_and_invalid_form_are_rejected() {
        let (mut store, _events) = store();
        store.register(&form("ada")).unwrap();

        assert!(matches!(
            store.register(&form("ada")),
            Err(AuthError::UsernameTaken)
        ));

        let mut bad = form("x");
        bad.password = "short".into();
        assert!(matches!(store.register(&bad), Err(AuthError::Invalid(_))));
        // failed registration signs nobody in
        assert_eq!(store.user().unwrap().username, "ada");
    }

    #[test]
    fn login_finds_registered_user() {
        let (mut store, _events) = store();
        store.register(&form("ada")).unwrap();
        store.logout().unwrap();

        assert!(matches!(store.login("bo"), Err(AuthError::UnknownUser)));
        let user = store.login("ada").unwrap();
        assert_eq!(user.username, "ada");
        assert!(store.is_authenticated());
    }

    #[test]
    fn rooms_stay_in_sync_and_deduplicated() {
        let (mut store, _events) = store();
        let lobby = RoomId::new("lobby");
        let tips = RoomId::new("dating-tips");

        store.join_room(&lobby).unwrap();
        store.join_room(&tips).unwrap();
        store.join_room(&lobby).unwrap(); // dedup

        assert_eq!(store.joined_rooms(), &[lobby.clone(), tips.clone()]);
        assert_eq!(persisted_rooms(&store), store.joined_rooms());

        store.leave_room(&lobby).unwrap();
        assert_eq!(store.joined_rooms(), &[tips.clone()]);
        assert_eq!(persisted_rooms(&store), store.joined_rooms());

        store.leave_room(&lobby).unwrap(); // absent: no-op
        assert_eq!(persisted_rooms(&store), store.joined_rooms());
    }

    #[test]
    fn logout_clears_rooms_everywhere() {
        let (mut store, _events) = store();
        store.register(&form("ada")).unwrap();
        store.join_room(&RoomId::new("lobby")).unwrap();

        store.logout().unwrap();
        assert!(store.joined_rooms().is_empty());
        assert!(persisted_rooms(&store).is_empty());
        assert!(store.auth_token().is_none());
    }

    #[test]
    fn external_rooms_update_replaces_in_memory_list() {
        let (mut store, _events) = store();
        store.join_room(&RoomId::new("lobby")).unwrap();

        store.apply_external_rooms_update(r#"["espresso","lobby"]"#);
        assert_eq!(
            store.joined_rooms(),
            &[RoomId::new("espresso"), RoomId::new("lobby")]
        );

        // malformed payload: logged and ignored
        store.apply_external_rooms_update("{nope");
        assert_eq!(store.joined_rooms().len(), 2);
    }

    #[test]
    fn dark_mode_toggle_persists_and_notifies() {
        let (mut store, mut events) = store();
        assert!(store.toggle_dark_mode().unwrap());
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::DarkModeChanged(true)
        );

        let (restored, _rx) = SessionStore::initialize(Arc::clone(&store.db));
        assert!(restored.dark_mode());
    }

    #[test]
    fn language_round_trips() {
        let (mut store, _events) = store();
        assert_eq!(store.language(), "en");
        store.set_language("fr").unwrap();

        let (restored, _rx) = SessionStore::initialize(Arc::clone(&store.db));
        assert_eq!(restored.language(), "fr");
    }
}
