use anyhow::{Context, Result};
use colored::*;
use parley_core::utils::DEFAULT_STUN_ADDR;
use parley_core::IceServerConfig;
use parley_server::{ServerConfig, serve};
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tracing::info;

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Refuse connections beyond this many.
    #[arg(long, env = "PARLEY_MAX_CONNECTIONS")]
    max_connections: Option<usize>,

    #[arg(long, env = "STUN_URL", default_value = DEFAULT_STUN_ADDR)]
    stun_url: String,

    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME", requires = "turn_url")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL", requires = "turn_url")]
    turn_credential: Option<String>,

    /// Largest accepted frame in bytes.
    #[arg(long, default_value_t = 64 * 1024)]
    max_message_size: usize,
}

impl ServeArgs {
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig {
            bind: SocketAddr::new(self.host, self.port),
            max_connections: self.max_connections,
            ice_servers: vec![IceServerConfig::stun(self.stun_url)],
            max_message_size: self.max_message_size,
            ..ServerConfig::default()
        };

        if let Some(url) = self.turn_url {
            config = config.with_turn(url, self.turn_username, self.turn_credential);
        }
        config
    }
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let config = args.into_config();
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    println!(
        "{} {}",
        "📡 Parley relay on".green().bold(),
        format!("ws://{}/ws", listener.local_addr()?).cyan()
    );

    serve(listener, config, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown requested");
    })
    .await
}
