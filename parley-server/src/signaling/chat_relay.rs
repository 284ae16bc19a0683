use crate::signaling::SignalingOutput;
use parley_core::{ConnectionId, ServerEvent};
use tracing::debug;

/// Room-scoped text broadcast. Nothing is stored.
pub struct ChatRelay;

impl ChatRelay {
    /// Sends `receive-chat-message` to every recipient except the sender.
    /// Returns how many were delivered.
    pub fn broadcast(
        output: &dyn SignalingOutput,
        recipients: &[ConnectionId],
        sender: &ConnectionId,
        message: &str,
        user_name: Option<&str>,
    ) -> usize {
        let delivered = recipients
            .iter()
            .filter(|recipient| *recipient != sender)
            .filter(|recipient| {
                output
                    .deliver(
                        recipient,
                        ServerEvent::ReceiveChatMessage {
                            message: message.to_owned(),
                            sender_id: sender.clone(),
                            user_name: user_name.map(str::to_owned),
                        },
                    )
                    .is_sent()
            })
            .count();

        debug!("Chat from {} delivered to {} members", sender, delivered);
        delivered
    }
}
