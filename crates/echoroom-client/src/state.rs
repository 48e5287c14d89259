//! Root application object.
//!
//! [`App`] is the explicit, root-owned composition of every store. The UI
//! shell constructs one at startup and hands references down the tree —
//! there is no ambient singleton. It is also the only place that routes
//! session changes into the connection manager: login connects, logout
//! disconnects, nothing else touches the socket lifecycle.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use echoroom_calls::CallManager;
use echoroom_net::{ConnectionManager, WsDialer};
use echoroom_shared::constants::UPDATE_CHECK_INTERVAL_SECS;
use echoroom_shared::user::User;
use echoroom_shared::validation::RegistrationForm;
use echoroom_store::{Database, SharedDb};

use crate::conversations::ConversationStore;
use crate::events::SessionEvent;
use crate::notifications::{spawn_notification_pump, NotificationStore};
use crate::session::{AuthError, SessionStore};
use crate::updater::{UpdateEvent, UpdatePoller};

pub struct AppConfig {
    /// WebSocket URL of the signaling endpoint.
    pub signal_url: String,
    /// Update-manifest URL; `None` disables the poller.
    pub update_manifest_url: Option<String>,
    /// Explicit database path. `None` uses the platform data directory.
    pub db_path: Option<PathBuf>,
}

pub struct App {
    pub session: SessionStore,
    pub conversations: ConversationStore,
    pub notifications: NotificationStore,
    pub calls: CallManager,
    pub connection: ConnectionManager<WsDialer>,
    session_events: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    update_events: Option<mpsc::UnboundedReceiver<UpdateEvent>>,
    updater: Option<UpdatePoller>,
    pump: JoinHandle<()>,
}

impl App {
    /// Open the store and wire every component together. Must be called
    /// from within a tokio runtime; a persisted session reconnects
    /// immediately.
    pub fn bootstrap(config: AppConfig) -> anyhow::Result<Self> {
        let database = match &config.db_path {
            Some(path) => Database::open_at(path)?,
            None => Database::new()?,
        };
        let db: SharedDb = Arc::new(Mutex::new(database));

        let (session, session_events) = SessionStore::initialize(Arc::clone(&db));
        let (conversations, conversation_events) = ConversationStore::new(Arc::clone(&db));
        let notifications = NotificationStore::new(Arc::clone(&db));
        let (calls, call_events) = CallManager::new(Arc::clone(&db));

        let pump = spawn_notification_pump(
            notifications.clone(),
            conversation_events,
            call_events,
        );

        let connection = ConnectionManager::new(WsDialer, config.signal_url.clone());

        let (updater, update_events) = match config.update_manifest_url {
            Some(url) => {
                let (poller, events) = UpdatePoller::spawn(
                    url,
                    env!("CARGO_PKG_VERSION").to_string(),
                    Duration::from_secs(UPDATE_CHECK_INTERVAL_SECS),
                );
                (Some(poller), Some(events))
            }
            None => (None, None),
        };

        let mut app = Self {
            session,
            conversations,
            notifications,
            calls,
            connection,
            session_events: Some(session_events),
            update_events,
            updater,
            pump,
        };

        // a persisted session from the last run reconnects right away
        app.sync_connection();

        info!(authenticated = app.session.is_authenticated(), "app bootstrapped");
        Ok(app)
    }

    // ------------------------------------------------------------------
    // Auth orchestration
    // ------------------------------------------------------------------

    pub fn register(&mut self, form: &RegistrationForm) -> Result<User, AuthError> {
        let user = self.session.register(form)?;
        self.sync_connection();
        Ok(user)
    }

    pub fn login(&mut self, username: &str) -> Result<User, AuthError> {
        let user = self.session.login(username)?;
        self.sync_connection();
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.session.logout()?;
        self.sync_connection();
        Ok(())
    }

    /// Reconcile the signaling connection with the session. The connection
    /// manager reacts only to this — it never inspects stores itself.
    pub fn sync_connection(&mut self) {
        let user = self.session.current_user_id();
        let token = self.session.auth_token();
        self.connection.sync_session(user, token.as_deref());
    }

    // ------------------------------------------------------------------
    // Event streams for the UI shell
    // ------------------------------------------------------------------

    /// Take the session event stream (dark-mode flips, auth changes).
    /// Yields the receiver once; subsequent calls return `None`.
    pub fn take_session_events(&mut self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
        self.session_events.take()
    }

    pub fn take_update_events(&mut self) -> Option<mpsc::UnboundedReceiver<UpdateEvent>> {
        self.update_events.take()
    }

    /// Force an update-manifest check outside the regular cadence.
    pub fn check_for_update(&self) {
        if let Some(updater) = &self.updater {
            updater.check_now();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echoroom_shared::user::GenderIdentity;
    use echoroom_shared::RoomId;

    fn config(dir: &tempfile::TempDir) -> AppConfig {
        AppConfig {
            // unroutable: connection attempts fail quietly in the background
            signal_url: "ws://127.0.0.1:9/signal".into(),
            update_manifest_url: None,
            db_path: Some(dir.path().join("app.db")),
        }
    }

    fn form() -> RegistrationForm {
        RegistrationForm {
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "Difference1".into(),
            gender: GenderIdentity::Female,
            orientation: "heterosexual".into(),
        }
    }

    #[tokio::test]
    async fn bootstrap_register_logout_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::bootstrap(config(&dir)).unwrap();
        assert!(!app.session.is_authenticated());

        let mut session_events = app.take_session_events().expect("first take");
        assert!(app.take_session_events().is_none());

        app.register(&form()).unwrap();
        assert!(app.session.is_authenticated());
        assert!(matches!(
            session_events.try_recv(),
            Ok(SessionEvent::AuthChanged { user: Some(_) })
        ));

        app.session.join_room(&RoomId::new("lobby")).unwrap();
        app.logout().unwrap();
        assert!(!app.session.is_authenticated());
        assert!(app.session.joined_rooms().is_empty());
    }

    #[tokio::test]
    async fn persisted_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut app = App::bootstrap(config(&dir)).unwrap();
            app.register(&form()).unwrap();
        }

        let app = App::bootstrap(config(&dir)).unwrap();
        assert!(app.session.is_authenticated());
        assert_eq!(app.session.user().unwrap().username, "ada");
    }

    #[tokio::test]
    async fn archive_and_call_flow_feed_the_badges() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::bootstrap(config(&dir)).unwrap();

        app.conversations
            .set_archived(&echoroom_shared::ConversationId::new("c-1"), true)
            .unwrap();
        app.calls
            .start_call(
                echoroom_shared::UserId::new(),
                "bo",
                echoroom_shared::call::CallType::Voice,
            )
            .unwrap();
        app.calls.end_call().unwrap();

        // pump applies both increments
        for _ in 0..50 {
            let counts = app.notifications.counts();
            if counts.archived_chats == 1 && counts.call_history == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let counts = app.notifications.counts();
        assert_eq!((counts.archived_chats, counts.call_history), (1, 1));
    }
}
