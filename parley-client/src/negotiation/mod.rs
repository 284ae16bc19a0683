mod negotiation_event;
mod negotiation_state;
mod negotiator;
mod peer_backend;
mod peer_link;

pub use negotiation_event::*;
pub use negotiation_state::*;
pub use negotiator::*;
pub use peer_backend::*;
pub use peer_link::*;
