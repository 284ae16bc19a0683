use crate::error::ClientError;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parley_core::{ClientEvent, ConnectionId, IceServerConfig, RoomId, ServerEvent};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One signaling connection to a relay.
///
/// The socket is driven by two background tasks: a writer draining the
/// outbound queue and a reader publishing decoded [`ServerEvent`]s. The
/// connection closes once every outbound sender is dropped, and the inbound
/// receiver ends when the relay goes away.
pub struct SignalingClient {
    connection_id: ConnectionId,
    ice_servers: Vec<IceServerConfig>,
    outbound: mpsc::UnboundedSender<ClientEvent>,
}

impl SignalingClient {
    /// Connects to `url` (e.g. `ws://localhost:3000/ws`) and waits for the
    /// relay's `welcome`.
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerEvent>), ClientError> {
        let (stream, _) = connect_async(url).await?;
        let (sink, mut stream) = stream.split();

        let (connection_id, ice_servers) = wait_for_welcome(&mut stream).await?;
        info!("Signaling connection {} established to {}", connection_id, url);

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(write_loop(sink, outbound_rx, connection_id.clone()));
        tokio::spawn(read_loop(stream, inbound_tx, connection_id.clone()));

        Ok((
            Self {
                connection_id,
                ice_servers,
                outbound: outbound_tx,
            },
            inbound_rx,
        ))
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<ClientEvent> {
        self.outbound.clone()
    }

    pub fn send(&self, event: ClientEvent) -> Result<(), ClientError> {
        self.outbound.send(event).map_err(|_| ClientError::Closed)
    }

    pub fn join_room(&self, room_id: RoomId, user_name: Option<String>) -> Result<(), ClientError> {
        self.send(ClientEvent::JoinRoom {
            room_id,
            self_id: Some(self.connection_id.clone()),
            user_name,
        })
    }

    pub fn send_chat(
        &self,
        room_id: RoomId,
        message: impl Into<String>,
        user_name: Option<String>,
    ) -> Result<(), ClientError> {
        self.send(ClientEvent::SendChatMessage {
            room_id,
            message: message.into(),
            user_name,
        })
    }
}

async fn wait_for_welcome(
    stream: &mut SplitStream<WsStream>,
) -> Result<(ConnectionId, Vec<IceServerConfig>), ClientError> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                return match ServerEvent::from_json(text.as_str())? {
                    ServerEvent::Welcome {
                        connection_id,
                        ice_servers,
                    } => Ok((connection_id, ice_servers)),
                    other => Err(ClientError::UnexpectedHandshake(other.name().to_owned())),
                };
            }
            Some(Ok(Message::Close(frame))) => {
                warn!("Relay refused connection: {:?}", frame);
                return Err(ClientError::Closed);
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
            None => return Err(ClientError::Closed),
        }
    }
}

async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut outbound: mpsc::UnboundedReceiver<ClientEvent>,
    connection_id: ConnectionId,
) {
    while let Some(event) = outbound.recv().await {
        let json = match event.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize outbound event: {:?}", e);
                continue;
            }
        };
        if let Err(e) = sink.send(Message::text(json)).await {
            warn!("Signaling connection {} write failed: {}", connection_id, e);
            return;
        }
    }

    debug!("Closing signaling connection {}", connection_id);
    let _ = sink.close().await;
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    inbound: mpsc::UnboundedSender<ServerEvent>,
    connection_id: ConnectionId,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match ServerEvent::from_json(text.as_str()) {
                Ok(event) => {
                    if inbound.send(event).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("Undecodable frame on {}: {}", connection_id, e),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Signaling connection {} read failed: {}", connection_id, e);
                break;
            }
        }
    }

    info!("Signaling connection {} closed", connection_id);
}
