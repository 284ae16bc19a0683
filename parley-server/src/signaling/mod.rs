mod chat_relay;
mod presence_notifier;
mod signaling_output;
mod signaling_relay;

pub use chat_relay::*;
pub use presence_notifier::*;
pub use signaling_output::*;
pub use signaling_relay::*;
