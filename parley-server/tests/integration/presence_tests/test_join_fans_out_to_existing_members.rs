use parley_core::ServerEvent;

use crate::integration::{init_tracing, spawn_hub};
use crate::utils::{TestConnection, settle};

#[tokio::test]
async fn test_join_fans_out_to_existing_members() {
    init_tracing();
    let hub = spawn_hub();

    let mut members = Vec::new();
    for _ in 0..3 {
        let conn = TestConnection::open(&hub).await.unwrap();
        conn.join("room").await.unwrap();
        members.push(conn);
    }
    settle(&hub).await;
    for member in members.iter_mut() {
        member.pending();
    }

    let mut newcomer = TestConnection::open(&hub).await.unwrap();
    newcomer.join("room").await.unwrap();
    settle(&hub).await;

    let expected = vec![ServerEvent::UserConnected {
        connection_id: newcomer.id.clone(),
        user_name: None,
    }];
    for member in members.iter_mut() {
        assert_eq!(member.pending(), expected);
    }
    assert!(newcomer.pending().is_empty(), "joiner is not told about itself");
}

#[tokio::test]
async fn test_join_does_not_leak_across_rooms() {
    init_tracing();
    let hub = spawn_hub();

    let mut a = TestConnection::open(&hub).await.unwrap();
    let b = TestConnection::open(&hub).await.unwrap();

    a.join("first").await.unwrap();
    b.join("second").await.unwrap();
    settle(&hub).await;

    assert!(a.pending().is_empty());
}
