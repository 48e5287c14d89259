// Realtime signaling layer: one connection per authenticated session.

pub mod connection;
pub mod signaling;
pub mod transport;

mod error;

pub use connection::{ConnectionManager, ConnectionStatus};
pub use error::NetError;
pub use signaling::SignalFrame;
pub use transport::{Dialer, SignalSocket, WsDialer};
