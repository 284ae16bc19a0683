mod backend;
mod error;
mod negotiation;
mod session;
mod signaling;

pub use backend::*;
pub use error::*;
pub use negotiation::*;
pub use session::*;
pub use signaling::*;
