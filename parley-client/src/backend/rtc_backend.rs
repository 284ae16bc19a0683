use crate::negotiation::{LocalCandidate, PeerBackend};
use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use parley_core::{ConnectionId, IceCandidate, IceServerConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::{API, APIBuilder};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_local::TrackLocal;

/// Label of the data channel the offering side opens on every link.
pub const DATA_CHANNEL_LABEL: &str = "parley";

struct PeerEntry {
    connection: Arc<RTCPeerConnection>,
    generation: u64,
}

/// [`PeerBackend`] on top of the `webrtc` crate, one `RTCPeerConnection` per
/// remote connection id.
///
/// Local tracks registered with [`RtcBackend::with_local_track`] are added to
/// every peer connection, so offers and answers carry their media sections.
/// Capturing and writing samples is left to whoever owns the tracks.
pub struct RtcBackend {
    api: API,
    rtc_config: RTCConfiguration,
    local_tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
    peers: DashMap<ConnectionId, PeerEntry>,
    next_generation: AtomicU64,
    candidate_tx: mpsc::UnboundedSender<LocalCandidate>,
}

impl RtcBackend {
    /// Builds the backend and returns the stream of locally gathered
    /// candidates that must be trickled to peers.
    pub fn new(
        ice_servers: &[IceServerConfig],
    ) -> Result<(Self, mpsc::UnboundedReceiver<LocalCandidate>)> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;

        let mut registry = Registry::new();
        registry = register_default_interceptors(registry, &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers.iter().map(to_rtc_ice_server).collect(),
            ..Default::default()
        };

        let (candidate_tx, candidate_rx) = mpsc::unbounded_channel();

        Ok((
            Self {
                api,
                rtc_config,
                local_tracks: Vec::new(),
                peers: DashMap::new(),
                next_generation: AtomicU64::new(0),
                candidate_tx,
            },
            candidate_rx,
        ))
    }

    pub fn with_local_track(mut self, track: Arc<dyn TrackLocal + Send + Sync>) -> Self {
        self.local_tracks.push(track);
        self
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    async fn open_peer(&self, remote: &ConnectionId) -> Result<Arc<RTCPeerConnection>> {
        if let Some((_, previous)) = self.peers.remove(remote) {
            debug!(
                "Replacing peer connection for {} (generation {})",
                remote, previous.generation
            );
            if let Err(e) = previous.connection.close().await {
                warn!("Failed to close old peer connection for {}: {:?}", remote, e);
            }
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let peer_connection = Arc::new(
            self.api
                .new_peer_connection(self.rtc_config.clone())
                .await
                .context("Failed to create peer connection")?,
        );

        for track in &self.local_tracks {
            let sender = peer_connection
                .add_track(Arc::clone(track))
                .await
                .with_context(|| format!("Failed to add track {}", track.id()))?;
            tokio::spawn(drain_rtcp(sender));
        }

        let remote_state = remote.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                let remote = remote_state.clone();
                Box::pin(async move {
                    debug!("Peer connection to {} is {:?}", remote, state);
                })
            },
        ));

        let candidate_tx = self.candidate_tx.clone();
        let remote_ice = remote.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = candidate_tx.clone();
            let remote = remote_ice.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("Failed to serialize local candidate for {}: {:?}", remote, e);
                        return;
                    }
                };
                let _ = tx.send(LocalCandidate {
                    remote,
                    candidate: from_rtc_candidate(init),
                    generation,
                });
            })
        }));

        let remote_dc = remote.clone();
        peer_connection.on_data_channel(Box::new(move |dc| {
            let remote = remote_dc.clone();
            Box::pin(async move {
                info!("Data channel '{}' opened by {}", dc.label(), remote);
            })
        }));

        self.peers.insert(
            remote.clone(),
            PeerEntry {
                connection: Arc::clone(&peer_connection),
                generation,
            },
        );
        Ok(peer_connection)
    }

    fn peer(&self, remote: &ConnectionId) -> Result<Arc<RTCPeerConnection>> {
        self.peers
            .get(remote)
            .map(|entry| Arc::clone(&entry.connection))
            .with_context(|| format!("No peer connection for {remote}"))
    }
}

#[async_trait]
impl PeerBackend for RtcBackend {
    async fn create_offer(&self, remote: &ConnectionId) -> Result<String> {
        let peer_connection = self.open_peer(remote).await?;

        peer_connection
            .create_data_channel(DATA_CHANNEL_LABEL, None)
            .await
            .context("Failed to create data channel")?;

        let offer = peer_connection.create_offer(None).await?;
        peer_connection
            .set_local_description(offer.clone())
            .await
            .context("Failed to set local description")?;

        Ok(offer.sdp)
    }

    async fn accept_offer(&self, remote: &ConnectionId, sdp: String) -> Result<String> {
        let peer_connection = self.open_peer(remote).await?;

        peer_connection
            .set_remote_description(RTCSessionDescription::offer(sdp)?)
            .await
            .context("Failed to set remote description")?;

        let answer = peer_connection.create_answer(None).await?;
        peer_connection
            .set_local_description(answer.clone())
            .await
            .context("Failed to set local description")?;

        Ok(answer.sdp)
    }

    async fn accept_answer(&self, remote: &ConnectionId, sdp: String) -> Result<()> {
        self.peer(remote)?
            .set_remote_description(RTCSessionDescription::answer(sdp)?)
            .await
            .context("Failed to set remote description")?;
        Ok(())
    }

    async fn add_ice_candidate(&self, remote: &ConnectionId, candidate: IceCandidate) -> Result<()> {
        self.peer(remote)?
            .add_ice_candidate(to_rtc_candidate(candidate))
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    async fn close(&self, remote: &ConnectionId) {
        let Some((_, entry)) = self.peers.remove(remote) else {
            return;
        };
        if let Err(e) = entry.connection.close().await {
            warn!("Failed to close peer connection for {}: {:?}", remote, e);
        }
    }

    fn is_current(&self, candidate: &LocalCandidate) -> bool {
        self.peers
            .get(&candidate.remote)
            .is_some_and(|entry| entry.generation == candidate.generation)
    }
}

/// Reads incoming RTCP for a sender until its connection closes, so
/// interceptors keep processing receiver reports.
async fn drain_rtcp(sender: Arc<RTCRtpSender>) {
    let mut buf = vec![0u8; 1500];
    while sender.read(&mut buf).await.is_ok() {}
}

fn to_rtc_ice_server(server: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn to_rtc_candidate(candidate: IceCandidate) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.candidate,
        sdp_mid: candidate.sdp_mid,
        sdp_mline_index: candidate.sdp_m_line_index,
        username_fragment: candidate.username_fragment,
    }
}

fn from_rtc_candidate(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}
