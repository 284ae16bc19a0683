use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::mpsc;

use parley_core::{ClientEvent, ConnectionId, RoomId, ServerEvent, SignalEnvelope};
use parley_server::HubHandle;

/// Timeout for a single expected event (ms).
pub const EVENT_TIMEOUT_MS: u64 = 1000;

/// An in-process connection to a running hub, standing in for a WebSocket.
pub struct TestConnection {
    pub id: ConnectionId,
    hub: HubHandle,
    rx: mpsc::UnboundedReceiver<ServerEvent>,
}

impl TestConnection {
    /// Register a new connection and consume its `welcome`.
    pub async fn open(hub: &HubHandle) -> Result<Self> {
        let id = ConnectionId::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        hub.connect(id.clone(), tx)
            .await
            .context("Hub refused connection")?;

        match rx.recv().await {
            Some(ServerEvent::Welcome { connection_id, .. }) if connection_id == id => {}
            other => bail!("Expected welcome, got {:?}", other),
        }

        Ok(Self {
            id,
            hub: hub.clone(),
            rx,
        })
    }

    pub async fn send(&self, event: ClientEvent) -> Result<()> {
        self.hub
            .dispatch(self.id.clone(), event)
            .await
            .context("Failed to dispatch event")
    }

    pub async fn join(&self, room: &str) -> Result<()> {
        self.send(ClientEvent::JoinRoom {
            room_id: RoomId::from(room),
            self_id: Some(self.id.clone()),
            user_name: None,
        })
        .await
    }

    pub async fn signal(
        &self,
        target: &ConnectionId,
        signal: Value,
        caller_id: Option<ConnectionId>,
        metadata: Option<Value>,
    ) -> Result<()> {
        self.send(ClientEvent::Signal(SignalEnvelope {
            target: target.clone(),
            caller_id,
            signal,
            metadata,
        }))
        .await
    }

    pub async fn chat(&self, room: &str, message: &str) -> Result<()> {
        self.send(ClientEvent::SendChatMessage {
            room_id: RoomId::from(room),
            message: message.to_owned(),
            user_name: None,
        })
        .await
    }

    pub async fn disconnect(self) -> Result<()> {
        self.hub
            .disconnect(self.id.clone())
            .await
            .context("Failed to disconnect")
    }

    /// Wait for the next event pushed to this connection.
    pub async fn next_event(&mut self) -> Result<ServerEvent> {
        match tokio::time::timeout(Duration::from_millis(EVENT_TIMEOUT_MS), self.rx.recv()).await {
            Ok(Some(event)) => Ok(event),
            Ok(None) => bail!("Outbox closed"),
            Err(_) => bail!("Timeout waiting for event on {}", self.id),
        }
    }

    /// Everything already queued. Call [`settle`] first so the hub has
    /// processed prior commands.
    pub fn pending(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Round-trips the hub so every earlier command has been applied.
pub async fn settle(hub: &HubHandle) {
    let _ = hub.stats().await;
}

pub fn offer(sdp: &str) -> Value {
    json!({"type": "offer", "sdp": sdp})
}

pub fn answer(sdp: &str) -> Value {
    json!({"type": "answer", "sdp": sdp})
}
