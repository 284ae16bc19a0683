pub mod presence_tests;

use std::net::SocketAddr;
use tracing::Level;

use parley_server::{HubHandle, ServerConfig, serve};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn spawn_hub() -> HubHandle {
    HubHandle::spawn(&ServerConfig::default())
}

/// Start a full HTTP server on an ephemeral port.
pub async fn spawn_server(config: ServerConfig) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        if let Err(e) = serve(listener, config, std::future::pending()).await {
            tracing::error!("Test server failed: {}", e);
        }
    });

    addr
}
