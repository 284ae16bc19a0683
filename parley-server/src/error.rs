use parley_core::ConnectionId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("connection limit of {limit} reached")]
    CapacityReached { limit: usize },

    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("signaling hub has stopped")]
    Stopped,
}
