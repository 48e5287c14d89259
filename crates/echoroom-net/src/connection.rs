//! Connection lifecycle management.
//!
//! The manager owns at most one live signaling connection, keyed to the
//! authenticated identity. The connection event loop runs in a dedicated
//! tokio task; the manager talks to it through a frame channel, and the
//! task reports lifecycle transitions through a watch channel.
//!
//! Status writes are generation-gated: a task that has been replaced or
//! shut down can no longer move the published status.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use echoroom_shared::{ConversationId, UserId};

use crate::signaling::SignalFrame;
use crate::transport::{Dialer, SignalSocket};

/// Capacity of the outbound frame channel. Signals are fire-and-forget;
/// overflow while the socket is stalled drops the signal, never blocks.
const CMD_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

struct Link {
    user: UserId,
    cmd_tx: mpsc::Sender<SignalFrame>,
    task: JoinHandle<()>,
}

/// Owns the single signaling connection for the active session.
pub struct ConnectionManager<D: Dialer> {
    dialer: Arc<D>,
    url: String,
    link: Option<Link>,
    status_tx: watch::Sender<ConnectionStatus>,
    generation: Arc<AtomicU64>,
}

impl<D: Dialer> ConnectionManager<D> {
    pub fn new(dialer: D, url: impl Into<String>) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::Disconnected);
        Self {
            dialer: Arc::new(dialer),
            url: url.into(),
            link: None,
            status_tx,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status_tx.borrow()
    }

    /// Subscribe to status transitions.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    /// Reconcile the connection with the session state.
    ///
    /// An authenticated user with a token gets exactly one connection;
    /// anything else tears the connection down. Calling this repeatedly
    /// with an unchanged session is a no-op.
    pub fn sync_session(&mut self, user: Option<UserId>, token: Option<&str>) {
        // Reap a link whose task already exited (failed handshake, server
        // close) so the next session change can reconnect.
        if self.link.as_ref().is_some_and(|l| l.task.is_finished()) {
            self.link = None;
        }

        match (user, token) {
            (Some(user), Some(token)) => {
                if let Some(link) = &self.link {
                    if link.user == user {
                        return;
                    }
                }
                // no connection yet, or the identity changed under us
                self.close_link();
                self.open(user, token);
            }
            _ => self.close_link(),
        }
    }

    // ------------------------------------------------------------------
    // Signaling operations
    // ------------------------------------------------------------------
    //
    // All of these are fire-and-forget: while disconnected they are silent
    // no-ops, never errors.

    pub fn join_conversation(&self, id: &ConversationId) {
        self.signal(SignalFrame::JoinConversation {
            conversation_id: id.clone(),
        });
    }

    pub fn leave_conversation(&self, id: &ConversationId) {
        self.signal(SignalFrame::LeaveConversation {
            conversation_id: id.clone(),
        });
    }

    pub fn typing_start(&self, id: &ConversationId) {
        self.signal(SignalFrame::TypingStart {
            conversation_id: id.clone(),
        });
    }

    pub fn typing_stop(&self, id: &ConversationId) {
        self.signal(SignalFrame::TypingStop {
            conversation_id: id.clone(),
        });
    }

    fn signal(&self, frame: SignalFrame) {
        match &self.link {
            Some(link) => {
                if link.cmd_tx.try_send(frame).is_err() {
                    debug!("signal dropped, connection closing or backlogged");
                }
            }
            None => debug!("signal ignored while disconnected"),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    fn open(&mut self, user: UserId, token: &str) {
        let gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let gate = StatusGate {
            current: Arc::clone(&self.generation),
            gen,
            tx: self.status_tx.clone(),
        };
        gate.set(ConnectionStatus::Connecting);

        let (cmd_tx, cmd_rx) = mpsc::channel(CMD_CHANNEL_CAPACITY);
        let dialer = Arc::clone(&self.dialer);
        let url = self.url.clone();
        let token = token.to_string();

        info!(user = %user, "opening signaling connection");
        let task = tokio::spawn(run_connection(dialer, url, token, cmd_rx, gate));

        self.link = Some(Link { user, cmd_tx, task });
    }

    fn close_link(&mut self) {
        if let Some(link) = self.link.take() {
            // Silence the task's status writes, then let it notice the
            // dropped channel and close the socket gracefully.
            self.generation.fetch_add(1, Ordering::SeqCst);
            drop(link.cmd_tx);
            let _ = self.status_tx.send(ConnectionStatus::Disconnected);
            info!("signaling connection closed");
        }
    }
}

impl<D: Dialer> Drop for ConnectionManager<D> {
    fn drop(&mut self) {
        self.close_link();
    }
}

/// Generation-gated status writer handed to the connection task.
struct StatusGate {
    current: Arc<AtomicU64>,
    gen: u64,
    tx: watch::Sender<ConnectionStatus>,
}

impl StatusGate {
    fn set(&self, status: ConnectionStatus) {
        if self.current.load(Ordering::SeqCst) == self.gen {
            let _ = self.tx.send(status);
        }
    }
}

async fn run_connection<D: Dialer>(
    dialer: Arc<D>,
    url: String,
    token: String,
    mut cmd_rx: mpsc::Receiver<SignalFrame>,
    status: StatusGate,
) {
    let mut socket = match dialer.dial(&url).await {
        Ok(socket) => socket,
        Err(e) => {
            warn!(error = %e, "signaling dial failed");
            status.set(ConnectionStatus::Failed);
            status.set(ConnectionStatus::Disconnected);
            return;
        }
    };

    // Handshake: hello with the bearer token, wait for the ack.
    if let Err(e) = socket.send_frame(SignalFrame::Hello { token }).await {
        warn!(error = %e, "signaling hello failed");
        socket.close().await;
        status.set(ConnectionStatus::Failed);
        status.set(ConnectionStatus::Disconnected);
        return;
    }

    match socket.next_frame().await {
        Some(Ok(SignalFrame::HelloAck)) => {
            info!("signaling handshake acknowledged");
            status.set(ConnectionStatus::Connected);
        }
        reply => {
            warn!(reply = ?reply, "signaling handshake rejected");
            socket.close().await;
            status.set(ConnectionStatus::Failed);
            status.set(ConnectionStatus::Disconnected);
            return;
        }
    }

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(frame) => {
                        if let Err(e) = socket.send_frame(frame).await {
                            warn!(error = %e, "signal send failed");
                            status.set(ConnectionStatus::Failed);
                            break;
                        }
                    }
                    None => {
                        debug!("manager released connection, closing socket");
                        break;
                    }
                }
            }

            frame = socket.next_frame() => {
                match frame {
                    // Server pushes are not consumed at this layer yet.
                    Some(Ok(frame)) => debug!(frame = ?frame, "ignoring server frame"),
                    Some(Err(e)) => {
                        warn!(error = %e, "signaling transport error");
                        status.set(ConnectionStatus::Failed);
                        break;
                    }
                    None => {
                        debug!("server closed signaling socket");
                        break;
                    }
                }
            }
        }
    }

    socket.close().await;
    status.set(ConnectionStatus::Disconnected);
}
