//! Transport seam for the signaling connection.
//!
//! The connection manager is generic over a [`Dialer`] so tests can swap the
//! real WebSocket for a channel-backed mock. Production uses [`WsDialer`]
//! over `tokio-tungstenite`.

use std::future::Future;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::NetError;
use crate::signaling::SignalFrame;

/// A live, framed signaling socket.
pub trait SignalSocket: Send + 'static {
    fn send_frame(&mut self, frame: SignalFrame)
        -> impl Future<Output = Result<(), NetError>> + Send;

    /// Next decoded frame. `None` means the peer closed the socket.
    fn next_frame(&mut self)
        -> impl Future<Output = Option<Result<SignalFrame, NetError>>> + Send;

    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Opens signaling sockets. One dial per connection attempt.
pub trait Dialer: Send + Sync + 'static {
    type Socket: SignalSocket;

    fn dial(&self, url: &str) -> impl Future<Output = Result<Self::Socket, NetError>> + Send;
}

// ---------------------------------------------------------------------------
// WebSocket implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct WsDialer;

pub struct WsSocket {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Dialer for WsDialer {
    type Socket = WsSocket;

    fn dial(&self, url: &str) -> impl Future<Output = Result<WsSocket, NetError>> + Send {
        let url = url.to_string();
        async move {
            let (inner, _response) = connect_async(url.as_str())
                .await
                .map_err(|e| NetError::Connect(e.to_string()))?;
            debug!(url = %url, "signaling socket open");
            Ok(WsSocket { inner })
        }
    }
}

impl SignalSocket for WsSocket {
    fn send_frame(
        &mut self,
        frame: SignalFrame,
    ) -> impl Future<Output = Result<(), NetError>> + Send {
        async move {
            let json = frame.to_json()?;
            self.inner
                .send(Message::Text(json.into()))
                .await
                .map_err(|e| NetError::Transport(e.to_string()))
        }
    }

    fn next_frame(
        &mut self,
    ) -> impl Future<Output = Option<Result<SignalFrame, NetError>>> + Send {
        async move {
            while let Some(msg) = self.inner.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        return Some(SignalFrame::from_json(text.as_str()))
                    }
                    // tungstenite answers pings internally; nothing to do
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                    Ok(Message::Close(_)) => return None,
                    Ok(_) => continue,
                    Err(e) => return Some(Err(NetError::Transport(e.to_string()))),
                }
            }
            None
        }
    }

    fn close(&mut self) -> impl Future<Output = ()> + Send {
        async move {
            let _ = self.inner.close(None).await;
        }
    }
}
