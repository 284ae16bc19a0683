use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use parley_client::{
    CloseReason, NegotiationEvent, NegotiationTask, Negotiator, NegotiatorConfig, SessionEvent,
    SignalingClient,
};
use parley_core::{RoomId, SignalMetadata, StreamRole};

use crate::integration::{init_tracing, spawn_relay};
use crate::utils::{FakeBackend, wait_for};

struct Participant {
    client: SignalingClient,
    task: NegotiationTask,
    backend: Arc<FakeBackend>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

async fn participant(url: &str, name: &str) -> Participant {
    let (client, inbound) = SignalingClient::connect(url).await.unwrap();
    let backend = Arc::new(FakeBackend::default());
    let (negotiation_tx, negotiation_rx) = mpsc::unbounded_channel();
    let (_candidate_tx, candidates) = mpsc::unbounded_channel();
    let (session_tx, events) = mpsc::unbounded_channel();

    let negotiator = Negotiator::new(
        client.connection_id().clone(),
        NegotiatorConfig {
            metadata: SignalMetadata::user(Some(name.to_owned())),
            ..NegotiatorConfig::default()
        },
        Arc::clone(&backend),
        client.sender(),
        negotiation_tx,
    );
    let task = NegotiationTask::spawn(negotiator, negotiation_rx, inbound, candidates, session_tx);

    client
        .join_room(RoomId::from("demo"), Some(name.to_owned()))
        .unwrap();

    Participant {
        client,
        task,
        backend,
        events,
    }
}

/// Lets the relay process a join before the next participant arrives.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

fn established(event: &SessionEvent) -> bool {
    matches!(
        event,
        SessionEvent::Negotiation {
            event: NegotiationEvent::LinkEstablished { .. },
            ..
        }
    )
}

#[tokio::test]
async fn test_peers_negotiate_through_relay() {
    init_tracing();
    let url = spawn_relay().await;

    let mut ana = participant(&url, "Ana").await;
    settle().await;
    let mut bo = participant(&url, "Bo").await;

    let at_ana = wait_for(&mut ana.events, established).await.unwrap();
    let at_bo = wait_for(&mut bo.events, established).await.unwrap();

    assert_eq!(
        at_ana,
        SessionEvent::Negotiation {
            role: StreamRole::User,
            event: NegotiationEvent::LinkEstablished {
                remote: bo.client.connection_id().clone(),
                remote_role: StreamRole::User,
                parent_user: None,
                user_name: Some("Bo".to_owned()),
            },
        }
    );
    assert_eq!(
        at_bo,
        SessionEvent::Negotiation {
            role: StreamRole::User,
            event: NegotiationEvent::LinkEstablished {
                remote: ana.client.connection_id().clone(),
                remote_role: StreamRole::User,
                parent_user: None,
                user_name: Some("Ana".to_owned()),
            },
        }
    );

    let bo_id = bo.client.connection_id().clone();
    let ana_id = ana.client.connection_id().clone();
    assert_eq!(
        ana.backend.calls(),
        vec![
            format!("create_offer {bo_id}"),
            format!("accept_answer {bo_id} answer-for-{ana_id}"),
        ]
    );
    assert_eq!(
        bo.backend.calls(),
        vec![format!("accept_offer {ana_id} offer-for-{bo_id}")]
    );
}

#[tokio::test]
async fn test_chat_and_departure_reach_the_session() {
    init_tracing();
    let url = spawn_relay().await;

    let mut ana = participant(&url, "Ana").await;
    settle().await;
    let bo = participant(&url, "Bo").await;
    wait_for(&mut ana.events, established).await.unwrap();
    let bo_id = bo.client.connection_id().clone();

    bo.client
        .send_chat(RoomId::from("demo"), "hello", Some("Bo".to_owned()))
        .unwrap();
    let chat = wait_for(&mut ana.events, |e| matches!(e, SessionEvent::Chat { .. }))
        .await
        .unwrap();
    assert_eq!(
        chat,
        SessionEvent::Chat {
            message: "hello".to_owned(),
            sender_id: bo_id.clone(),
            user_name: Some("Bo".to_owned()),
        }
    );

    let Participant { client, task, .. } = bo;
    task.shutdown().await;
    drop(client);

    let closed = wait_for(&mut ana.events, |e| {
        matches!(
            e,
            SessionEvent::Negotiation {
                event: NegotiationEvent::LinkClosed { .. },
                ..
            }
        )
    })
    .await
    .unwrap();
    assert_eq!(
        closed,
        SessionEvent::Negotiation {
            role: StreamRole::User,
            event: NegotiationEvent::LinkClosed {
                remote: bo_id.clone(),
                reason: CloseReason::RemoteLeft,
            },
        }
    );
    assert_eq!(
        ana.backend.calls().last().cloned(),
        Some(format!("close {bo_id}"))
    );
}
