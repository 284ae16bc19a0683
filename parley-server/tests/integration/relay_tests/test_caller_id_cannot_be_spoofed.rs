use parley_core::ServerEvent;
use serde_json::json;

use crate::integration::{init_tracing, spawn_hub};
use crate::utils::{TestConnection, offer, settle};

#[tokio::test]
async fn test_caller_id_cannot_be_spoofed() {
    init_tracing();
    let hub = spawn_hub();

    let a = TestConnection::open(&hub).await.unwrap();
    let mut b = TestConnection::open(&hub).await.unwrap();
    let mut c = TestConnection::open(&hub).await.unwrap();

    let metadata = json!({"type": "screen", "parentUser": a.id, "userName": "Ana"});
    a.signal(&b.id, offer("x"), Some(c.id.clone()), Some(metadata.clone()))
        .await
        .unwrap();

    let ServerEvent::Signal(relayed) = b.next_event().await.unwrap() else {
        panic!("expected signal");
    };
    assert_eq!(relayed.caller_id, a.id);

    // metadata passes through untouched
    assert_eq!(relayed.metadata, Some(metadata));

    settle(&hub).await;
    assert!(c.pending().is_empty(), "spoofed id must not receive anything");
}
