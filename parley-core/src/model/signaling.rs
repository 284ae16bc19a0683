use crate::error::ProtocolError;
use crate::model::connection::ConnectionId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default, rename = "sdpMLineIndex")]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

/// WebRTC negotiation payload as peers understand it.
///
/// The relay never decodes this; it only travels inside envelopes as an
/// opaque JSON value. Peers decode it once on receipt with
/// [`Signal::from_value`]. Session descriptions use the browser `{type, sdp}`
/// shape. Candidates are written with `type: "candidate"` but also accepted
/// untagged, as produced by `RTCIceCandidate.toJSON()`. The SDP and candidate
/// strings are never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSignal", into = "RawSignal")]
pub enum Signal {
    Offer { sdp: String },
    Answer { sdp: String },
    IceCandidate(IceCandidate),
}

impl Signal {
    pub fn kind(&self) -> &'static str {
        match self {
            Signal::Offer { .. } => "offer",
            Signal::Answer { .. } => "answer",
            Signal::IceCandidate(_) => "candidate",
        }
    }

    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSignal {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sdp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    candidate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sdp_mid: Option<String>,
    #[serde(default, rename = "sdpMLineIndex", skip_serializing_if = "Option::is_none")]
    sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username_fragment: Option<String>,
}

impl TryFrom<RawSignal> for Signal {
    type Error = ProtocolError;

    fn try_from(raw: RawSignal) -> Result<Self, Self::Error> {
        match raw.kind.as_deref() {
            Some("offer") => raw
                .sdp
                .map(|sdp| Signal::Offer { sdp })
                .ok_or(ProtocolError::MissingField {
                    kind: "offer",
                    field: "sdp",
                }),
            Some("answer") => raw
                .sdp
                .map(|sdp| Signal::Answer { sdp })
                .ok_or(ProtocolError::MissingField {
                    kind: "answer",
                    field: "sdp",
                }),
            Some("candidate") | None => match raw.candidate {
                Some(candidate) => Ok(Signal::IceCandidate(IceCandidate {
                    candidate,
                    sdp_mid: raw.sdp_mid,
                    sdp_m_line_index: raw.sdp_m_line_index,
                    username_fragment: raw.username_fragment,
                })),
                None if raw.kind.is_some() => Err(ProtocolError::MissingField {
                    kind: "candidate",
                    field: "candidate",
                }),
                None => Err(ProtocolError::UnrecognisedSignal),
            },
            Some(other) => Err(ProtocolError::UnknownSignalType(other.to_owned())),
        }
    }
}

impl From<Signal> for RawSignal {
    fn from(signal: Signal) -> Self {
        let empty = RawSignal {
            kind: None,
            sdp: None,
            candidate: None,
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        };

        match signal {
            Signal::Offer { sdp } => RawSignal {
                kind: Some("offer".to_owned()),
                sdp: Some(sdp),
                ..empty
            },
            Signal::Answer { sdp } => RawSignal {
                kind: Some("answer".to_owned()),
                sdp: Some(sdp),
                ..empty
            },
            Signal::IceCandidate(c) => RawSignal {
                kind: Some("candidate".to_owned()),
                candidate: Some(c.candidate),
                sdp_mid: c.sdp_mid,
                sdp_m_line_index: c.sdp_m_line_index,
                username_fragment: c.username_fragment,
                ..empty
            },
        }
    }
}

/// Which local media stream a peer link carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamRole {
    #[default]
    User,
    Screen,
}

/// Peer-supplied hints travelling with a signal, as a peer reads them. Fields
/// it does not know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalMetadata {
    #[serde(rename = "type", default)]
    pub role: StreamRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_user: Option<ConnectionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignalMetadata {
    pub fn user(user_name: Option<String>) -> Self {
        Self {
            user_name,
            ..Self::default()
        }
    }

    pub fn screen(parent_user: ConnectionId, user_name: Option<String>) -> Self {
        Self {
            role: StreamRole::Screen,
            parent_user: Some(parent_user),
            user_name,
            extra: Map::new(),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value, ProtocolError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A signal addressed to one connection.
///
/// Only `target` is read by the relay. `signal` and `metadata` are opaque
/// JSON forwarded unchanged, key order included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalEnvelope {
    pub target: ConnectionId,
    /// Ignored by the relay, which stamps the sender's own id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_id: Option<ConnectionId>,
    pub signal: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl SignalEnvelope {
    pub fn new(
        target: ConnectionId,
        signal: &Signal,
        metadata: Option<&SignalMetadata>,
    ) -> Result<Self, ProtocolError> {
        Ok(Self {
            target,
            caller_id: None,
            signal: signal.to_value()?,
            metadata: metadata.map(SignalMetadata::to_value).transpose()?,
        })
    }

    pub fn with_caller_id(mut self, caller_id: ConnectionId) -> Self {
        self.caller_id = Some(caller_id);
        self
    }
}
