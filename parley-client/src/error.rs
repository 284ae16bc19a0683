use crate::negotiation::NegotiationState;
use parley_core::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("cannot move peer link from {from:?} to {to:?}")]
    InvalidTransition {
        from: NegotiationState,
        to: NegotiationState,
    },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("expected welcome as first event, got {0}")]
    UnexpectedHandshake(String),

    #[error("signaling connection closed")]
    Closed,

    #[error("peer backend failed: {0}")]
    Backend(#[from] anyhow::Error),
}
