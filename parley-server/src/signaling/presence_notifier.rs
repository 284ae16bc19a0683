use crate::signaling::SignalingOutput;
use parley_core::{ConnectionId, ServerEvent};
use tracing::debug;

/// Arrival and departure broadcasts. Each recipient is an independent
/// delivery; a dead recipient is skipped and the rest still go out.
pub struct PresenceNotifier;

impl PresenceNotifier {
    /// Sends `user-connected` to `recipients`. Returns how many were delivered.
    pub fn announce_arrival(
        output: &dyn SignalingOutput,
        recipients: &[ConnectionId],
        newcomer: &ConnectionId,
        user_name: Option<&str>,
    ) -> usize {
        let delivered = recipients
            .iter()
            .filter(|recipient| *recipient != newcomer)
            .filter(|recipient| {
                output
                    .deliver(
                        recipient,
                        ServerEvent::UserConnected {
                            connection_id: newcomer.clone(),
                            user_name: user_name.map(str::to_owned),
                        },
                    )
                    .is_sent()
            })
            .count();

        debug!(
            "Announced arrival of {} to {}/{} members",
            newcomer,
            delivered,
            recipients.len()
        );
        delivered
    }

    /// Sends `user-disconnected` to `recipients`. Returns how many were delivered.
    pub fn announce_departure(
        output: &dyn SignalingOutput,
        recipients: &[ConnectionId],
        departed: &ConnectionId,
    ) -> usize {
        let delivered = recipients
            .iter()
            .filter(|recipient| *recipient != departed)
            .filter(|recipient| {
                output
                    .deliver(
                        recipient,
                        ServerEvent::UserDisconnected {
                            connection_id: departed.clone(),
                        },
                    )
                    .is_sent()
            })
            .count();

        debug!(
            "Announced departure of {} to {}/{} members",
            departed,
            delivered,
            recipients.len()
        );
        delivered
    }
}
