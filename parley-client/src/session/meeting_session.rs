use crate::backend::RtcBackend;
use crate::error::ClientError;
use crate::negotiation::{DEFAULT_NEGOTIATION_TIMEOUT, Negotiator, NegotiatorConfig};
use crate::session::{NegotiationTask, SessionEvent};
use crate::signaling::SignalingClient;
use parley_core::{ConnectionId, RoomId, ServerEvent, SignalMetadata};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::info;
use webrtc::track::track_local::TrackLocal;

/// Local media is supplied by the embedding application: it creates the
/// tracks, hands them in here and writes samples to them. Without tracks the
/// links carry only the data channel.
#[derive(Clone)]
pub struct SessionConfig {
    /// Relay WebSocket endpoint, e.g. `ws://localhost:3000/ws`.
    pub url: String,
    pub room_id: RoomId,
    pub user_name: Option<String>,
    pub negotiation_timeout: Duration,
    /// Sent to every peer of the primary connection.
    pub camera_tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
    /// Sent to every peer of the screen-share connection.
    pub screen_tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
}

impl SessionConfig {
    pub fn new(url: impl Into<String>, room_id: impl Into<RoomId>) -> Self {
        Self {
            url: url.into(),
            room_id: room_id.into(),
            user_name: None,
            negotiation_timeout: DEFAULT_NEGOTIATION_TIMEOUT,
            camera_tracks: Vec::new(),
            screen_tracks: Vec::new(),
        }
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    pub fn with_camera_track(mut self, track: Arc<dyn TrackLocal + Send + Sync>) -> Self {
        self.camera_tracks.push(track);
        self
    }

    pub fn with_screen_track(mut self, track: Arc<dyn TrackLocal + Send + Sync>) -> Self {
        self.screen_tracks.push(track);
        self
    }
}

struct ScreenShare {
    client: SignalingClient,
    task: NegotiationTask,
}

/// A participant in one room: the primary stream plus an optional screen
/// share.
///
/// The screen share is a second signaling connection with its own id and its
/// own negotiator, whose signals carry `type: "screen"` and point back at the
/// primary connection through `parentUser`. The two connections ignore each
/// other.
pub struct MeetingSession {
    config: SessionConfig,
    primary: SignalingClient,
    primary_task: NegotiationTask,
    screen: Option<ScreenShare>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl MeetingSession {
    pub async fn join(
        config: SessionConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SessionEvent>), ClientError> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let (primary, inbound) = SignalingClient::connect(&config.url).await?;
        let metadata = SignalMetadata::user(config.user_name.clone());
        let primary_task = start_negotiation(
            &primary,
            inbound,
            metadata,
            &config.camera_tracks,
            &config,
            events_tx.clone(),
        )?;

        primary.join_room(config.room_id.clone(), config.user_name.clone())?;
        info!("Joined room {} as {}", config.room_id, primary.connection_id());

        Ok((
            Self {
                config,
                primary,
                primary_task,
                screen: None,
                events_tx,
            },
            events_rx,
        ))
    }

    pub fn local_id(&self) -> &ConnectionId {
        self.primary.connection_id()
    }

    pub fn screen_id(&self) -> Option<&ConnectionId> {
        self.screen.as_ref().map(|s| s.client.connection_id())
    }

    pub fn send_chat(&self, message: impl Into<String>) -> Result<(), ClientError> {
        self.primary.send_chat(
            self.config.room_id.clone(),
            message,
            self.config.user_name.clone(),
        )
    }

    /// Opens the screen-share connection and joins it to the room. Returns
    /// its connection id; calling it again while sharing is a no-op.
    pub async fn start_screen_share(&mut self) -> Result<ConnectionId, ClientError> {
        if let Some(id) = self.screen_id() {
            return Ok(id.clone());
        }

        let (client, inbound) = SignalingClient::connect(&self.config.url).await?;
        let screen_id = client.connection_id().clone();
        self.primary_task.ignore_peer(screen_id.clone());

        let metadata = SignalMetadata::screen(self.local_id().clone(), self.config.user_name.clone());
        let task = start_negotiation(
            &client,
            inbound,
            metadata,
            &self.config.screen_tracks,
            &self.config,
            self.events_tx.clone(),
        )?;
        task.ignore_peer(self.local_id().clone());

        client.join_room(self.config.room_id.clone(), self.config.user_name.clone())?;
        info!("Sharing screen in room {} as {}", self.config.room_id, screen_id);

        self.screen = Some(ScreenShare { client, task });
        Ok(screen_id)
    }

    /// Closes the screen-share links and its signaling connection, which
    /// makes the relay announce its departure.
    pub async fn stop_screen_share(&mut self) {
        let Some(ScreenShare { client, task }) = self.screen.take() else {
            return;
        };
        task.shutdown().await;
        info!("Stopped screen share {}", client.connection_id());
    }

    pub async fn leave(mut self) {
        self.stop_screen_share().await;
        self.primary_task.shutdown().await;
        info!("Left room {}", self.config.room_id);
    }
}

fn start_negotiation(
    client: &SignalingClient,
    inbound: mpsc::UnboundedReceiver<ServerEvent>,
    metadata: SignalMetadata,
    tracks: &[Arc<dyn TrackLocal + Send + Sync>],
    config: &SessionConfig,
    session_tx: mpsc::UnboundedSender<SessionEvent>,
) -> Result<NegotiationTask, ClientError> {
    let (mut backend, candidates) = RtcBackend::new(client.ice_servers())?;
    for track in tracks {
        backend = backend.with_local_track(Arc::clone(track));
    }
    let (negotiation_tx, negotiation_rx) = mpsc::unbounded_channel();

    let negotiator = Negotiator::new(
        client.connection_id().clone(),
        NegotiatorConfig {
            metadata,
            negotiation_timeout: config.negotiation_timeout,
        },
        Arc::new(backend),
        client.sender(),
        negotiation_tx,
    );

    Ok(NegotiationTask::spawn(
        negotiator,
        negotiation_rx,
        inbound,
        candidates,
        session_tx,
    ))
}
