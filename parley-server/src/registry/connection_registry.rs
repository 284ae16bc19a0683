use crate::error::HubError;
use crate::signaling::{Delivery, SignalingOutput};
use parley_core::{ConnectionId, RoomId, ServerEvent};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::mpsc;
use tracing::debug;

/// Sending half of a connection's outbound queue.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

struct ConnectionEntry {
    outbox: Outbox,
    rooms: BTreeSet<RoomId>,
}

/// Live connections and the rooms each one has joined.
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    max_connections: Option<usize>,
}

impl ConnectionRegistry {
    pub fn new(max_connections: Option<usize>) -> Self {
        Self {
            connections: HashMap::new(),
            max_connections,
        }
    }

    pub fn register(&mut self, connection_id: ConnectionId, outbox: Outbox) -> Result<(), HubError> {
        if self.connections.contains_key(&connection_id) {
            return Err(HubError::DuplicateConnection(connection_id));
        }
        if let Some(limit) = self.max_connections {
            if self.connections.len() >= limit {
                return Err(HubError::CapacityReached { limit });
            }
        }

        self.connections.insert(
            connection_id,
            ConnectionEntry {
                outbox,
                rooms: BTreeSet::new(),
            },
        );
        Ok(())
    }

    /// Drops the connection and returns the rooms it had joined.
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<Vec<RoomId>> {
        self.connections
            .remove(connection_id)
            .map(|entry| entry.rooms.into_iter().collect())
    }

    /// Records that the connection joined `room_id`. Returns `false` for an
    /// unknown connection.
    pub fn note_joined(&mut self, connection_id: &ConnectionId, room_id: RoomId) -> bool {
        let Some(entry) = self.connections.get_mut(connection_id) else {
            return false;
        };
        entry.rooms.insert(room_id);
        true
    }

    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        self.connections
            .get(connection_id)
            .map(|entry| entry.rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_registered(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl SignalingOutput for ConnectionRegistry {
    fn deliver(&self, to: &ConnectionId, event: ServerEvent) -> Delivery {
        let Some(entry) = self.connections.get(to) else {
            debug!("Dropping {} for unknown connection {}", event.name(), to);
            return Delivery::UnknownTarget;
        };

        match entry.outbox.send(event) {
            Ok(()) => Delivery::Sent,
            Err(err) => {
                debug!("Dropping {} for closed connection {}", err.0.name(), to);
                Delivery::Closed
            }
        }
    }
}
