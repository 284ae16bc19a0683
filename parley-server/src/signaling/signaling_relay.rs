use crate::signaling::{Delivery, SignalingOutput};
use parley_core::{ConnectionId, RelayedSignal, ServerEvent, SignalEnvelope};
use tracing::{debug, warn};

/// Point-to-point forwarding of negotiation messages.
///
/// Holds no state of its own: each call is one lookup and at most one
/// delivery. `signal` and `metadata` are moved through as opaque JSON and
/// never decoded; negotiation correctness belongs to the peers.
pub struct SignalingRelay;

impl SignalingRelay {
    /// Forwards `envelope` to its target with the caller id stamped from
    /// `sender`. A missing or closed target is a silent drop.
    pub fn relay(
        output: &dyn SignalingOutput,
        sender: &ConnectionId,
        envelope: SignalEnvelope,
    ) -> Delivery {
        let SignalEnvelope {
            target,
            caller_id,
            signal,
            metadata,
        } = envelope;

        if let Some(claimed) = caller_id.filter(|claimed| claimed != sender) {
            warn!("{} claimed caller id {}, overwriting", sender, claimed);
        }

        let delivery = output.deliver(
            &target,
            ServerEvent::Signal(RelayedSignal {
                signal,
                caller_id: sender.clone(),
                metadata,
            }),
        );

        debug!("Relayed signal {} -> {}: {:?}", sender, target, delivery);
        delivery
    }
}
