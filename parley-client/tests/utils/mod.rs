pub mod session_events;

pub use fake_backend::*;
pub use session_events::*;

pub const EVENT_TIMEOUT_MS: u64 = 5000;
