use crate::error::HubError;
use crate::registry::Outbox;
use parley_core::{ClientEvent, ConnectionId};
use serde::Serialize;
use tokio::sync::oneshot;

/// Work items for the hub, sent by the transport layer.
#[derive(Debug)]
pub enum HubCommand {
    /// A transport opened. The reply tells the transport whether to keep it.
    Connect {
        connection_id: ConnectionId,
        outbox: Outbox,
        reply: oneshot::Sender<Result<(), HubError>>,
    },

    /// A decoded event arrived on an open connection.
    Event {
        connection_id: ConnectionId,
        event: ClientEvent,
    },

    /// The transport closed; triggers leave for every joined room.
    Disconnect { connection_id: ConnectionId },

    Stats { reply: oneshot::Sender<HubStats> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HubStats {
    pub connections: usize,
    pub rooms: usize,
}
