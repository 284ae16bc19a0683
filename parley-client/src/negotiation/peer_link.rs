use crate::error::NegotiationError;
use crate::negotiation::NegotiationState;
use parley_core::{ConnectionId, IceCandidate, SignalMetadata};
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSide {
    /// We sent the offer.
    Caller,
    /// We answered an offer.
    Callee,
}

/// Local view of the handshake with one remote connection.
#[derive(Debug)]
pub struct PeerLink {
    remote: ConnectionId,
    side: LinkSide,
    state: NegotiationState,
    has_remote_description: bool,
    pending_candidates: Vec<IceCandidate>,
    remote_metadata: Option<SignalMetadata>,
    started_at: Instant,
}

impl PeerLink {
    pub fn new(remote: ConnectionId, side: LinkSide, started_at: Instant) -> Self {
        Self {
            remote,
            side,
            state: NegotiationState::Idle,
            has_remote_description: false,
            pending_candidates: Vec::new(),
            remote_metadata: None,
            started_at,
        }
    }

    pub fn remote(&self) -> &ConnectionId {
        &self.remote
    }

    pub fn side(&self) -> LinkSide {
        self.side
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn transition(&mut self, to: NegotiationState) -> Result<(), NegotiationError> {
        if !self.state.can_transition(to) {
            return Err(NegotiationError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    pub fn close(&mut self) {
        self.state = NegotiationState::Closed;
        self.pending_candidates.clear();
    }

    pub fn has_remote_description(&self) -> bool {
        self.has_remote_description
    }

    /// Marks the remote description applied and hands back every candidate
    /// that arrived before it, in arrival order.
    pub fn remote_description_applied(&mut self) -> Vec<IceCandidate> {
        self.has_remote_description = true;
        std::mem::take(&mut self.pending_candidates)
    }

    pub fn buffer_candidate(&mut self, candidate: IceCandidate) {
        self.pending_candidates.push(candidate);
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn remote_metadata(&self) -> Option<&SignalMetadata> {
        self.remote_metadata.as_ref()
    }

    pub fn set_remote_metadata(&mut self, metadata: Option<SignalMetadata>) {
        if metadata.is_some() {
            self.remote_metadata = metadata;
        }
    }

    /// True when the handshake has not completed within `timeout` of its start.
    pub fn is_stale(&self, now: Instant, timeout: Duration) -> bool {
        !matches!(
            self.state,
            NegotiationState::Connected | NegotiationState::Closed
        ) && now.saturating_duration_since(self.started_at) >= timeout
    }
}
