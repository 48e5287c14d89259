use thiserror::Error;

/// Errors produced by the signaling layer.
///
/// None of these reach the UI as exceptions — the connection manager demotes
/// them to a `Failed` status transition and a log line.
#[derive(Error, Debug)]
pub enum NetError {
    #[error("Connect failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Handshake rejected: {0}")]
    Handshake(String),

    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
