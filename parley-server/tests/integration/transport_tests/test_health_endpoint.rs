use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use parley_core::{ClientEvent, RoomId};
use parley_server::ServerConfig;

use crate::integration::{init_tracing, spawn_server};
use crate::utils::WsTestClient;

async fn get_health(addr: std::net::SocketAddr) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("tcp connect");
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .expect("write request");

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    response
}

#[tokio::test]
async fn test_health_endpoint() {
    init_tracing();
    let addr = spawn_server(ServerConfig::default()).await;

    let mut client = WsTestClient::connect(addr).await.unwrap();
    client
        .send(&ClientEvent::JoinRoom {
            room_id: RoomId::from("demo"),
            self_id: None,
            user_name: None,
        })
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let response = get_health(addr).await;
    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(
        response.contains(r#"{"status":"ok","connections":1,"rooms":1}"#),
        "{}",
        response
    );
}
