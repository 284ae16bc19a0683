use crate::error::ProtocolError;
use crate::model::connection::ConnectionId;
use crate::model::room::RoomId;
use crate::model::signaling::{IceServerConfig, SignalEnvelope};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events a client sends over its signaling connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    JoinRoom {
        room_id: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        self_id: Option<ConnectionId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_name: Option<String>,
    },
    Signal(SignalEnvelope),
    SendChatMessage {
        room_id: RoomId,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_name: Option<String>,
    },
}

/// A signal as seen by its recipient. `signal` and `metadata` are exactly
/// what the caller sent; peers decode them with
/// [`Signal::from_value`](crate::Signal::from_value) and
/// [`SignalMetadata::from_value`](crate::SignalMetadata::from_value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedSignal {
    pub signal: Value,
    pub caller_id: ConnectionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Events the server pushes to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    Welcome {
        connection_id: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
    },
    UserConnected {
        connection_id: ConnectionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_name: Option<String>,
    },
    UserDisconnected {
        connection_id: ConnectionId,
    },
    Signal(RelayedSignal),
    ReceiveChatMessage {
        message: String,
        sender_id: ConnectionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_name: Option<String>,
    },
}

impl ClientEvent {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerEvent {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Welcome { .. } => "welcome",
            ServerEvent::UserConnected { .. } => "user-connected",
            ServerEvent::UserDisconnected { .. } => "user-disconnected",
            ServerEvent::Signal(_) => "signal",
            ServerEvent::ReceiveChatMessage { .. } => "receive-chat-message",
        }
    }
}
