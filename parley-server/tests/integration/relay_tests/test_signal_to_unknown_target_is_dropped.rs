use parley_core::{ConnectionId, ServerEvent};

use crate::integration::{init_tracing, spawn_hub};
use crate::utils::{TestConnection, offer, settle};

#[tokio::test]
async fn test_signal_to_unknown_target_is_dropped() {
    init_tracing();
    let hub = spawn_hub();

    let mut d = TestConnection::open(&hub).await.unwrap();
    let mut e = TestConnection::open(&hub).await.unwrap();

    d.signal(&ConnectionId::from("z"), offer("lost"), None, None)
        .await
        .unwrap();

    settle(&hub).await;
    assert!(d.pending().is_empty());
    assert!(e.pending().is_empty());

    // d is still usable afterwards
    d.signal(&e.id, offer("found"), None, None).await.unwrap();
    let ServerEvent::Signal(relayed) = e.next_event().await.unwrap() else {
        panic!("expected signal");
    };
    assert_eq!(relayed.caller_id, d.id);
}

#[tokio::test]
async fn test_signal_to_departed_target_is_dropped() {
    init_tracing();
    let hub = spawn_hub();

    let mut a = TestConnection::open(&hub).await.unwrap();
    let b = TestConnection::open(&hub).await.unwrap();
    let b_id = b.id.clone();

    b.disconnect().await.unwrap();
    a.signal(&b_id, offer("late"), None, None).await.unwrap();

    let stats = hub.stats().await.expect("hub still running");
    assert_eq!(stats.connections, 1);
    assert!(a.pending().is_empty());
}
