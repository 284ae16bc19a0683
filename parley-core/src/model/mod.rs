mod connection;
mod event;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use event::{ClientEvent, RelayedSignal, ServerEvent};
pub use room::RoomId;
pub use signaling::{IceCandidate, IceServerConfig, Signal, SignalEnvelope, SignalMetadata, StreamRole};
