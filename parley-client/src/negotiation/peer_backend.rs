use async_trait::async_trait;
use parley_core::{ConnectionId, IceCandidate};

/// A candidate gathered locally that must be trickled to `remote`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCandidate {
    pub remote: ConnectionId,
    pub candidate: IceCandidate,
    /// Which peer connection toward `remote` gathered it. Bumped every time
    /// the backend replaces that connection.
    pub generation: u64,
}

/// The media stack behind the negotiation state machine, one peer
/// connection per remote id.
#[async_trait]
pub trait PeerBackend: Send + Sync {
    /// Create a connection toward `remote`, commit and return a local offer.
    async fn create_offer(&self, remote: &ConnectionId) -> anyhow::Result<String>;

    /// Create a connection for an incoming offer, commit both descriptions and
    /// return the local answer.
    async fn accept_offer(&self, remote: &ConnectionId, sdp: String) -> anyhow::Result<String>;

    async fn accept_answer(&self, remote: &ConnectionId, sdp: String) -> anyhow::Result<()>;

    async fn add_ice_candidate(&self, remote: &ConnectionId, candidate: IceCandidate) -> anyhow::Result<()>;

    async fn close(&self, remote: &ConnectionId);

    /// Whether `candidate` came from the live peer connection toward its
    /// remote, as opposed to one closed by a restart or glare.
    fn is_current(&self, _candidate: &LocalCandidate) -> bool {
        true
    }
}
