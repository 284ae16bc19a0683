use parley_core::{ConnectionId, RoomId};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Member sets per room. Rooms appear on first join and are pruned once
/// their last member leaves.
#[derive(Default)]
pub struct RoomMembership {
    rooms: HashMap<RoomId, BTreeSet<ConnectionId>>,
}

impl RoomMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `connection_id` to the room and returns the other members,
    /// i.e. everyone who should hear about the arrival.
    ///
    /// Rejoining leaves the set unchanged but still reports the other members.
    pub fn join(&mut self, room_id: &RoomId, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        let members = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            info!("Creating new room: {}", room_id);
            BTreeSet::new()
        });

        if !members.insert(connection_id.clone()) {
            debug!("{} rejoined room {}", connection_id, room_id);
        }

        members
            .iter()
            .filter(|member| *member != connection_id)
            .cloned()
            .collect()
    }

    /// Removes `connection_id` from the room and returns who is left.
    pub fn leave(&mut self, room_id: &RoomId, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        let Some(members) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };

        members.remove(connection_id);
        if members.is_empty() {
            self.rooms.remove(room_id);
            info!("Room {} is empty, dropping it", room_id);
            return Vec::new();
        }

        members.iter().cloned().collect()
    }

    pub fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|members| members.contains(connection_id))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
