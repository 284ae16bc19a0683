use crate::config::ServerConfig;
use crate::error::HubError;
use crate::hub::{HubCommand, HubStats, SignalingHub};
use crate::registry::Outbox;
use parley_core::{ClientEvent, ConnectionId};
use tokio::sync::{mpsc, oneshot};

/// Cloneable front door to a running [`SignalingHub`].
#[derive(Clone)]
pub struct HubHandle {
    command_tx: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Starts a hub on the current runtime.
    pub fn spawn(config: &ServerConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        tokio::spawn(SignalingHub::new(config).run(command_rx));
        Self { command_tx }
    }

    pub async fn connect(&self, connection_id: ConnectionId, outbox: Outbox) -> Result<(), HubError> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::Connect {
            connection_id,
            outbox,
            reply,
        })
        .await?;
        response.await.map_err(|_| HubError::Stopped)?
    }

    pub async fn dispatch(&self, connection_id: ConnectionId, event: ClientEvent) -> Result<(), HubError> {
        self.send(HubCommand::Event {
            connection_id,
            event,
        })
        .await
    }

    pub async fn disconnect(&self, connection_id: ConnectionId) -> Result<(), HubError> {
        self.send(HubCommand::Disconnect { connection_id }).await
    }

    pub async fn stats(&self) -> Result<HubStats, HubError> {
        let (reply, response) = oneshot::channel();
        self.send(HubCommand::Stats { reply }).await?;
        response.await.map_err(|_| HubError::Stopped)
    }

    async fn send(&self, cmd: HubCommand) -> Result<(), HubError> {
        self.command_tx.send(cmd).await.map_err(|_| HubError::Stopped)
    }
}
