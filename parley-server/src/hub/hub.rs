use crate::config::ServerConfig;
use crate::error::HubError;
use crate::hub::{HubCommand, HubStats};
use crate::registry::{ConnectionRegistry, Outbox};
use crate::room::RoomMembership;
use crate::signaling::{ChatRelay, PresenceNotifier, SignalingOutput, SignalingRelay};
use parley_core::{ClientEvent, ConnectionId, IceServerConfig, RoomId, ServerEvent};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Owner of all relay state.
///
/// Commands are applied one at a time, so every join, leave, relay and
/// broadcast observes a consistent registry and member set without locks.
pub struct SignalingHub {
    registry: ConnectionRegistry,
    rooms: RoomMembership,
    ice_servers: Vec<IceServerConfig>,
}

impl SignalingHub {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            registry: ConnectionRegistry::new(config.max_connections),
            rooms: RoomMembership::new(),
            ice_servers: config.ice_servers.clone(),
        }
    }

    pub async fn run(mut self, mut command_rx: mpsc::Receiver<HubCommand>) {
        info!("Signaling hub started");

        while let Some(cmd) = command_rx.recv().await {
            self.handle_command(cmd);
        }

        info!("Command channel closed. Signaling hub stopped.");
    }

    pub fn handle_command(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Connect {
                connection_id,
                outbox,
                reply,
            } => {
                let _ = reply.send(self.connect(connection_id, outbox));
            }

            HubCommand::Event {
                connection_id,
                event,
            } => self.handle_event(&connection_id, event),

            HubCommand::Disconnect { connection_id } => self.disconnect(&connection_id),

            HubCommand::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
        }
    }

    pub fn connect(&mut self, connection_id: ConnectionId, outbox: Outbox) -> Result<(), HubError> {
        self.registry.register(connection_id.clone(), outbox)?;
        info!("Connection {} registered", connection_id);

        self.registry.deliver(
            &connection_id,
            ServerEvent::Welcome {
                connection_id: connection_id.clone(),
                ice_servers: self.ice_servers.clone(),
            },
        );
        Ok(())
    }

    pub fn disconnect(&mut self, connection_id: &ConnectionId) {
        let Some(rooms) = self.registry.unregister(connection_id) else {
            return;
        };
        info!(
            "Connection {} disconnected from {} room(s)",
            connection_id,
            rooms.len()
        );

        for room_id in rooms {
            let remaining = self.rooms.leave(&room_id, connection_id);
            PresenceNotifier::announce_departure(&self.registry, &remaining, connection_id);
        }
    }

    pub fn handle_event(&mut self, connection_id: &ConnectionId, event: ClientEvent) {
        if !self.registry.is_registered(connection_id) {
            warn!("Ignoring event from unregistered connection {}", connection_id);
            return;
        }

        match event {
            ClientEvent::JoinRoom {
                room_id,
                self_id,
                user_name,
            } => {
                if let Some(claimed) = self_id.filter(|claimed| claimed != connection_id) {
                    warn!(
                        "{} joined {} claiming id {}, using transport id",
                        connection_id, room_id, claimed
                    );
                }
                self.join(room_id, connection_id, user_name.as_deref());
            }

            ClientEvent::Signal(envelope) => {
                SignalingRelay::relay(&self.registry, connection_id, envelope);
            }

            ClientEvent::SendChatMessage {
                room_id,
                message,
                user_name,
            } => {
                let members = self.rooms.members_of(&room_id);
                ChatRelay::broadcast(
                    &self.registry,
                    &members,
                    connection_id,
                    &message,
                    user_name.as_deref(),
                );
            }
        }
    }

    fn join(&mut self, room_id: RoomId, connection_id: &ConnectionId, user_name: Option<&str>) {
        info!(
            "{} ({}) joining room {}",
            connection_id,
            user_name.unwrap_or("anonymous"),
            room_id
        );

        let others = self.rooms.join(&room_id, connection_id);
        self.registry.note_joined(connection_id, room_id);
        PresenceNotifier::announce_arrival(&self.registry, &others, connection_id, user_name);
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            connections: self.registry.len(),
            rooms: self.rooms.room_count(),
        }
    }

    pub fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms.members_of(room_id)
    }

    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        self.registry.rooms_of(connection_id)
    }
}
