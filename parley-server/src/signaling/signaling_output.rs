use parley_core::{ConnectionId, ServerEvent};

/// Outcome of handing one event to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No connection with that id is registered.
    UnknownTarget,
    /// Still registered, but its writer has already gone away.
    Closed,
}

impl Delivery {
    pub fn is_sent(self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

/// Whatever can push server events to live connections by id.
///
/// Implementations must not block: the hub calls this from its dispatch loop.
pub trait SignalingOutput {
    fn deliver(&self, to: &ConnectionId, event: ServerEvent) -> Delivery;
}
