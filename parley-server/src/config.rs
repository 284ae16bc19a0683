use parley_core::IceServerConfig;
use parley_core::utils::DEFAULT_STUN_ADDR;
use std::net::{Ipv4Addr, SocketAddr};

/// Settings for one relay process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Live connections beyond this are refused at upgrade time. `None` means unbounded.
    pub max_connections: Option<usize>,
    /// Advertised to every client in its `welcome` event.
    pub ice_servers: Vec<IceServerConfig>,
    /// Largest inbound WebSocket frame accepted, in bytes.
    pub max_message_size: usize,
    pub command_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000)),
            max_connections: None,
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)],
            max_message_size: 64 * 1024,
            command_buffer: 256,
        }
    }
}

impl ServerConfig {
    pub fn with_turn(
        mut self,
        url: impl Into<String>,
        username: Option<String>,
        credential: Option<String>,
    ) -> Self {
        self.ice_servers.push(IceServerConfig {
            urls: vec![url.into()],
            username,
            credential,
        });
        self
    }
}
