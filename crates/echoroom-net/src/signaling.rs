//! Wire frames for the signaling connection.
//!
//! Everything on the socket is a JSON-encoded [`SignalFrame`]. The client
//! opens with `hello` carrying the bearer token; the server answers
//! `hello_ack` to complete the handshake. After that only fire-and-forget
//! conversation signals flow; no payload beyond the conversation id is
//! defined at this layer.

use serde::{Deserialize, Serialize};

use echoroom_shared::ConversationId;

use crate::error::NetError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalFrame {
    Hello { token: String },
    HelloAck,
    JoinConversation { conversation_id: ConversationId },
    LeaveConversation { conversation_id: ConversationId },
    TypingStart { conversation_id: ConversationId },
    TypingStop { conversation_id: ConversationId },
}

impl SignalFrame {
    pub fn to_json(&self) -> Result<String, NetError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, NetError> {
        Ok(serde_json::from_str(raw)?)
    }
}
