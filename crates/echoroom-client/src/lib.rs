//! # echoroom-client
//!
//! Application wiring for the EchoRoom client core: the session/auth
//! store, conversation flags, notification counters, the update poller,
//! and the [`App`] root object that ties them to the call manager and the
//! signaling connection.

pub mod conversations;
pub mod events;
pub mod notifications;
pub mod session;
pub mod state;
pub mod updater;

use tracing_subscriber::{fmt, EnvFilter};

pub use state::{App, AppConfig};

/// Initialize the global tracing subscriber. Call once at startup; the
/// `RUST_LOG` environment variable overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "echoroom_client=debug,echoroom_net=debug,echoroom_store=info,echoroom_calls=info,warn",
        )
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
