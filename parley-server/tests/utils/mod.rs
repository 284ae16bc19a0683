pub mod test_connection;

pub use test_connection::*;
pub use ws_client::*;
