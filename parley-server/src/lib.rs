mod config;
mod error;
mod hub;
mod registry;
mod room;
mod signaling;
mod transport;

pub use config::*;
pub use error::*;
pub use hub::*;
pub use registry::*;
pub use room::*;
pub use signaling::*;
pub use transport::*;
