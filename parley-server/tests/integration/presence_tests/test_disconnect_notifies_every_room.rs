use parley_core::ServerEvent;

use crate::integration::{init_tracing, spawn_hub};
use crate::utils::{TestConnection, settle};

#[tokio::test]
async fn test_disconnect_notifies_every_room() {
    init_tracing();
    let hub = spawn_hub();

    let mut x_member = TestConnection::open(&hub).await.unwrap();
    let mut y_member = TestConnection::open(&hub).await.unwrap();
    let leaver = TestConnection::open(&hub).await.unwrap();

    x_member.join("x").await.unwrap();
    y_member.join("y").await.unwrap();
    leaver.join("x").await.unwrap();
    leaver.join("y").await.unwrap();
    settle(&hub).await;
    x_member.pending();
    y_member.pending();

    let leaver_id = leaver.id.clone();
    leaver.disconnect().await.unwrap();
    settle(&hub).await;

    let expected = vec![ServerEvent::UserDisconnected {
        connection_id: leaver_id.clone(),
    }];
    assert_eq!(x_member.pending(), expected);
    assert_eq!(y_member.pending(), expected);

    // a later arrival in x is announced to x_member, and nobody sees the leaver again
    let mut late = TestConnection::open(&hub).await.unwrap();
    late.join("x").await.unwrap();
    settle(&hub).await;

    assert_eq!(
        x_member.pending(),
        vec![ServerEvent::UserConnected {
            connection_id: late.id.clone(),
            user_name: None,
        }]
    );
    assert!(late.pending().is_empty());
}
