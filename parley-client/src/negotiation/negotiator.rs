use crate::negotiation::{
    CloseReason, LinkSide, LocalCandidate, NegotiationEvent, NegotiationState, PeerBackend,
    PeerLink,
};
use parley_core::{
    ClientEvent, ConnectionId, IceCandidate, RelayedSignal, ServerEvent, Signal, SignalEnvelope,
    SignalMetadata, StreamRole,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const DEFAULT_NEGOTIATION_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct NegotiatorConfig {
    /// Attached to every signal this negotiator sends.
    pub metadata: SignalMetadata,
    pub negotiation_timeout: Duration,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            metadata: SignalMetadata::default(),
            negotiation_timeout: DEFAULT_NEGOTIATION_TIMEOUT,
        }
    }
}

/// Drives the offer/answer handshake with every peer of one signaling
/// connection.
///
/// A negotiator is parameterised by the metadata it sends, so the primary
/// camera stream and a screen share run the same machine with a different
/// [`StreamRole`]. Signals go out through `outbound`; link lifecycle changes
/// are published on `events`.
pub struct Negotiator<B> {
    local_id: ConnectionId,
    config: NegotiatorConfig,
    backend: Arc<B>,
    links: HashMap<ConnectionId, PeerLink>,
    ignored: HashSet<ConnectionId>,
    outbound: mpsc::UnboundedSender<ClientEvent>,
    events: mpsc::UnboundedSender<NegotiationEvent>,
}

impl<B: PeerBackend> Negotiator<B> {
    pub fn new(
        local_id: ConnectionId,
        config: NegotiatorConfig,
        backend: Arc<B>,
        outbound: mpsc::UnboundedSender<ClientEvent>,
        events: mpsc::UnboundedSender<NegotiationEvent>,
    ) -> Self {
        Self {
            local_id,
            config,
            backend,
            links: HashMap::new(),
            ignored: HashSet::new(),
            outbound,
            events,
        }
    }

    pub fn local_id(&self) -> &ConnectionId {
        &self.local_id
    }

    pub fn role(&self) -> StreamRole {
        self.config.metadata.role
    }

    /// Never negotiate with `remote`, e.g. our own screen-share connection.
    pub fn ignore_peer(&mut self, remote: ConnectionId) {
        self.ignored.insert(remote);
    }

    pub fn link_state(&self, remote: &ConnectionId) -> Option<NegotiationState> {
        self.links.get(remote).map(PeerLink::state)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub async fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::UserConnected {
                connection_id,
                user_name,
            } => self.on_user_connected(connection_id, user_name).await,
            ServerEvent::UserDisconnected { connection_id } => {
                self.on_user_disconnected(&connection_id).await
            }
            ServerEvent::Signal(signal) => self.on_signal(signal).await,
            other => debug!("Negotiator ignoring {} event", other.name()),
        }
    }

    pub async fn on_user_connected(&mut self, remote: ConnectionId, user_name: Option<String>) {
        if self.is_ignored(&remote) {
            return;
        }

        if self.links.contains_key(&remote) {
            info!("Peer {} rejoined, restarting link", remote);
            self.close_link(&remote, CloseReason::Restarted).await;
        }

        let mut link = PeerLink::new(remote.clone(), LinkSide::Caller, Instant::now());
        if user_name.is_some() {
            link.set_remote_metadata(Some(SignalMetadata::user(user_name)));
        }
        self.links.insert(remote.clone(), link);

        if !self.advance(&remote, NegotiationState::Offering) {
            return;
        }

        match self.backend.create_offer(&remote).await {
            Ok(sdp) => {
                if self.advance(&remote, NegotiationState::AwaitingAnswer) {
                    self.send_signal(&remote, Signal::Offer { sdp });
                }
            }
            Err(e) => warn!("Failed to create offer for {}: {:?}", remote, e),
        }
    }

    pub async fn on_signal(&mut self, relayed: RelayedSignal) {
        let RelayedSignal {
            signal,
            caller_id: remote,
            metadata,
        } = relayed;

        if self.is_ignored(&remote) {
            debug!("Ignoring signal from ignored peer {}", remote);
            return;
        }

        let signal = match Signal::from_value(signal) {
            Ok(signal) => signal,
            Err(e) => {
                warn!("Ignoring undecodable signal from {}: {}", remote, e);
                return;
            }
        };
        let metadata = metadata.and_then(|value| match SignalMetadata::from_value(value) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!("Ignoring undecodable metadata from {}: {}", remote, e);
                None
            }
        });

        match signal {
            Signal::Offer { sdp } => self.on_offer(remote, sdp, metadata).await,
            Signal::Answer { sdp } => self.on_answer(remote, sdp, metadata).await,
            Signal::IceCandidate(candidate) => self.on_remote_candidate(remote, candidate).await,
        }
    }

    pub async fn on_user_disconnected(&mut self, remote: &ConnectionId) {
        if self.links.contains_key(remote) {
            self.close_link(remote, CloseReason::RemoteLeft).await;
        }
    }

    /// Trickles a locally gathered candidate to its peer. Candidates gathered
    /// by a peer connection that has since been replaced are dropped.
    pub fn send_local_candidate(&mut self, local: LocalCandidate) {
        if !self.backend.is_current(&local) {
            debug!(
                "Dropping candidate from superseded connection to {} (generation {})",
                local.remote, local.generation
            );
            return;
        }

        match self.link_state(&local.remote) {
            Some(state) if state != NegotiationState::Closed => {
                self.send_signal(&local.remote, Signal::IceCandidate(local.candidate));
            }
            _ => debug!("Dropping local candidate for unknown peer {}", local.remote),
        }
    }

    /// Closes every link whose handshake did not finish within the configured
    /// timeout. Returns the expired peers.
    pub async fn expire_stale(&mut self, now: Instant) -> Vec<ConnectionId> {
        let timeout = self.config.negotiation_timeout;
        let stale: Vec<ConnectionId> = self
            .links
            .values()
            .filter(|link| link.is_stale(now, timeout))
            .map(|link| link.remote().clone())
            .collect();

        for remote in &stale {
            warn!("Negotiation with {} timed out", remote);
            self.close_link(remote, CloseReason::TimedOut).await;
        }

        stale
    }

    pub async fn close_all(&mut self) {
        let remotes: Vec<ConnectionId> = self.links.keys().cloned().collect();
        for remote in &remotes {
            self.close_link(remote, CloseReason::LocalShutdown).await;
        }
    }

    async fn on_offer(&mut self, remote: ConnectionId, sdp: String, metadata: Option<SignalMetadata>) {
        match self.link_state(&remote) {
            Some(NegotiationState::Offering | NegotiationState::AwaitingAnswer) => {
                if self.local_id > remote {
                    warn!("Offer glare with {}, keeping our own offer", remote);
                    return;
                }
                info!("Offer glare with {}, answering theirs", remote);
                self.close_link(&remote, CloseReason::Restarted).await;
            }
            Some(_) => {
                info!("Peer {} sent a new offer, restarting link", remote);
                self.close_link(&remote, CloseReason::Restarted).await;
            }
            None => {}
        }

        let mut link = PeerLink::new(remote.clone(), LinkSide::Callee, Instant::now());
        link.set_remote_metadata(metadata);
        self.links.insert(remote.clone(), link);

        if !self.advance(&remote, NegotiationState::ReceivedOffer) {
            return;
        }

        let answer = match self.backend.accept_offer(&remote, sdp).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Failed to answer offer from {}: {:?}", remote, e);
                return;
            }
        };

        let pending = self.take_pending(&remote);
        if !self.advance(&remote, NegotiationState::Answering) {
            return;
        }
        self.send_signal(&remote, Signal::Answer { sdp: answer });
        self.apply_candidates(&remote, pending).await;

        if self.advance(&remote, NegotiationState::Connected) {
            self.announce_established(&remote);
        }
    }

    async fn on_answer(&mut self, remote: ConnectionId, sdp: String, metadata: Option<SignalMetadata>) {
        let Some(link) = self.links.get_mut(&remote) else {
            warn!("Ignoring answer from unknown peer {}", remote);
            return;
        };
        if link.state() != NegotiationState::AwaitingAnswer {
            warn!("Ignoring answer from {} in state {:?}", remote, link.state());
            return;
        }
        link.set_remote_metadata(metadata);

        if let Err(e) = self.backend.accept_answer(&remote, sdp).await {
            warn!("Failed to apply answer from {}: {:?}", remote, e);
            return;
        }

        let pending = self.take_pending(&remote);
        self.apply_candidates(&remote, pending).await;

        if self.advance(&remote, NegotiationState::Connected) {
            self.announce_established(&remote);
        }
    }

    async fn on_remote_candidate(&mut self, remote: ConnectionId, candidate: IceCandidate) {
        let Some(link) = self.links.get_mut(&remote) else {
            debug!("Dropping candidate from unknown peer {}", remote);
            return;
        };
        if !link.state().accepts_candidates() {
            debug!("Dropping candidate from {} in state {:?}", remote, link.state());
            return;
        }
        if !link.has_remote_description() {
            link.buffer_candidate(candidate);
            debug!(
                "Buffered candidate from {} ({} pending)",
                remote,
                link.pending_candidates()
            );
            return;
        }

        if let Err(e) = self.backend.add_ice_candidate(&remote, candidate).await {
            warn!("Failed to add candidate from {}: {:?}", remote, e);
        }
    }

    fn is_ignored(&self, remote: &ConnectionId) -> bool {
        *remote == self.local_id || self.ignored.contains(remote)
    }

    fn advance(&mut self, remote: &ConnectionId, to: NegotiationState) -> bool {
        let Some(link) = self.links.get_mut(remote) else {
            return false;
        };
        match link.transition(to) {
            Ok(()) => true,
            Err(e) => {
                warn!("Peer {}: {}", remote, e);
                false
            }
        }
    }

    fn take_pending(&mut self, remote: &ConnectionId) -> Vec<IceCandidate> {
        self.links
            .get_mut(remote)
            .map(PeerLink::remote_description_applied)
            .unwrap_or_default()
    }

    async fn apply_candidates(&self, remote: &ConnectionId, candidates: Vec<IceCandidate>) {
        for candidate in candidates {
            if let Err(e) = self.backend.add_ice_candidate(remote, candidate).await {
                warn!("Failed to add buffered candidate from {}: {:?}", remote, e);
            }
        }
    }

    async fn close_link(&mut self, remote: &ConnectionId, reason: CloseReason) {
        let Some(mut link) = self.links.remove(remote) else {
            return;
        };
        link.close();
        self.backend.close(remote).await;
        info!("Closed link to {} ({:?})", remote, reason);

        let _ = self.events.send(NegotiationEvent::LinkClosed {
            remote: remote.clone(),
            reason,
        });
    }

    fn announce_established(&self, remote: &ConnectionId) {
        let Some(link) = self.links.get(remote) else {
            return;
        };
        let metadata = link.remote_metadata();
        info!("Link to {} established as {:?}", remote, link.side());

        let _ = self.events.send(NegotiationEvent::LinkEstablished {
            remote: remote.clone(),
            remote_role: metadata.map(|m| m.role).unwrap_or_default(),
            parent_user: metadata.and_then(|m| m.parent_user.clone()),
            user_name: metadata.and_then(|m| m.user_name.clone()),
        });
    }

    fn send_signal(&self, remote: &ConnectionId, signal: Signal) {
        let kind = signal.kind();
        let envelope = match SignalEnvelope::new(remote.clone(), &signal, Some(&self.config.metadata)) {
            Ok(envelope) => envelope.with_caller_id(self.local_id.clone()),
            Err(e) => {
                error!("Failed to encode {} for {}: {}", kind, remote, e);
                return;
            }
        };

        if self.outbound.send(ClientEvent::Signal(envelope)).is_err() {
            warn!("Signaling channel closed, dropping {} for {}", kind, remote);
        } else {
            debug!("Sent {} to {}", kind, remote);
        }
    }
}
