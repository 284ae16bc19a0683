use thiserror::Error;

/// Failures decoding a frame from the signaling transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{kind} signal is missing `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("unknown signal type `{0}`")]
    UnknownSignalType(String),

    #[error("signal is neither a session description nor an ICE candidate")]
    UnrecognisedSignal,
}
