use crate::negotiation::{LocalCandidate, NegotiationEvent, Negotiator, PeerBackend};
use parley_core::{ConnectionId, ServerEvent, StreamRole};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// How often stalled negotiations are checked for expiry.
pub const EXPIRE_INTERVAL: Duration = Duration::from_secs(1);

/// What a running session reports to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Negotiation {
        /// Local stream whose negotiator produced the event.
        role: StreamRole,
        event: NegotiationEvent,
    },
    Chat {
        message: String,
        sender_id: ConnectionId,
        user_name: Option<String>,
    },
    /// The signaling connection for `role` was lost.
    Disconnected { role: StreamRole },
}

enum TaskControl {
    IgnorePeer(ConnectionId),
    Shutdown,
}

/// A negotiator running on its own task, fed by one signaling connection.
pub struct NegotiationTask {
    control: mpsc::UnboundedSender<TaskControl>,
    handle: JoinHandle<()>,
}

impl NegotiationTask {
    pub fn spawn<B: PeerBackend + 'static>(
        negotiator: Negotiator<B>,
        negotiation_events: mpsc::UnboundedReceiver<NegotiationEvent>,
        inbound: mpsc::UnboundedReceiver<ServerEvent>,
        candidates: mpsc::UnboundedReceiver<LocalCandidate>,
        session_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let (control, control_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(
            negotiator,
            control_rx,
            negotiation_events,
            inbound,
            candidates,
            session_tx,
        ));

        Self { control, handle }
    }

    pub fn ignore_peer(&self, remote: ConnectionId) {
        let _ = self.control.send(TaskControl::IgnorePeer(remote));
    }

    /// Closes every link and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.control.send(TaskControl::Shutdown);
        if let Err(e) = self.handle.await {
            warn!("Negotiation task ended abnormally: {:?}", e);
        }
    }
}

async fn run<B: PeerBackend>(
    mut negotiator: Negotiator<B>,
    mut control: mpsc::UnboundedReceiver<TaskControl>,
    mut negotiation_events: mpsc::UnboundedReceiver<NegotiationEvent>,
    mut inbound: mpsc::UnboundedReceiver<ServerEvent>,
    mut candidates: mpsc::UnboundedReceiver<LocalCandidate>,
    session_tx: mpsc::UnboundedSender<SessionEvent>,
) {
    let role = negotiator.role();
    let mut expiry = tokio::time::interval(EXPIRE_INTERVAL);
    expiry.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Negotiation loop started for {} ({:?})", negotiator.local_id(), role);

    loop {
        tokio::select! {
            biased;

            cmd = control.recv() => match cmd {
                Some(TaskControl::IgnorePeer(remote)) => negotiator.ignore_peer(remote),
                Some(TaskControl::Shutdown) | None => break,
            },

            event = inbound.recv() => match event {
                Some(ServerEvent::ReceiveChatMessage { message, sender_id, user_name }) => {
                    if role == StreamRole::User {
                        let _ = session_tx.send(SessionEvent::Chat { message, sender_id, user_name });
                    }
                }
                Some(event) => negotiator.handle_server_event(event).await,
                None => {
                    warn!("Signaling connection {} lost", negotiator.local_id());
                    let _ = session_tx.send(SessionEvent::Disconnected { role });
                    break;
                }
            },

            Some(candidate) = candidates.recv() => negotiator.send_local_candidate(candidate),

            Some(event) = negotiation_events.recv() => {
                let _ = session_tx.send(SessionEvent::Negotiation { role, event });
            }

            _ = expiry.tick() => {
                let expired = negotiator.expire_stale(Instant::now()).await;
                if !expired.is_empty() {
                    debug!("Expired {} stalled links", expired.len());
                }
            }
        }
    }

    negotiator.close_all().await;
    while let Ok(event) = negotiation_events.try_recv() {
        let _ = session_tx.send(SessionEvent::Negotiation { role, event });
    }

    info!("Negotiation loop finished for {}", negotiator.local_id());
}
