use std::time::Duration;

use parley_client::{
    CloseReason, MeetingSession, NegotiationEvent, SessionConfig, SessionEvent,
};
use parley_core::{ConnectionId, StreamRole};

use crate::integration::{init_tracing, spawn_relay};
use crate::utils::wait_for;

fn established_with(remote: &ConnectionId) -> impl FnMut(&SessionEvent) -> bool + '_ {
    move |event| {
        matches!(
            event,
            SessionEvent::Negotiation {
                event: NegotiationEvent::LinkEstablished { remote: r, .. },
                ..
            } if r == remote
        )
    }
}

#[tokio::test]
async fn test_screen_share_is_labelled() {
    init_tracing();
    let url = spawn_relay().await;

    let (ana, mut ana_events) = MeetingSession::join(SessionConfig::new(&url, "demo").with_user_name("Ana"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let (mut bo, mut bo_events) = MeetingSession::join(SessionConfig::new(&url, "demo").with_user_name("Bo"))
        .await
        .unwrap();

    let bo_id = bo.local_id().clone();
    wait_for(&mut ana_events, established_with(&bo_id)).await.unwrap();
    wait_for(&mut bo_events, established_with(ana.local_id()))
        .await
        .unwrap();

    let screen_id = bo.start_screen_share().await.unwrap();
    assert_eq!(bo.screen_id(), Some(&screen_id));

    let shared = wait_for(&mut ana_events, established_with(&screen_id))
        .await
        .unwrap();
    assert_eq!(
        shared,
        SessionEvent::Negotiation {
            role: StreamRole::User,
            event: NegotiationEvent::LinkEstablished {
                remote: screen_id.clone(),
                remote_role: StreamRole::Screen,
                parent_user: Some(bo_id.clone()),
                user_name: Some("Bo".to_owned()),
            },
        }
    );

    bo.stop_screen_share().await;
    assert_eq!(bo.screen_id(), None);

    let closed = wait_for(&mut ana_events, |e| {
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
                remote: screen_id,
                reason: CloseReason::RemoteLeft,
            },
        }
    );

    bo.leave().await;
    ana.leave().await;
}

#[tokio::test]
async fn test_chat_between_sessions() {
    init_tracing();
    let url = spawn_relay().await;

    let (ana, mut ana_events) = MeetingSession::join(SessionConfig::new(&url, "demo").with_user_name("Ana"))
        .await
        .unwrap();
    let (bo, _bo_events) = MeetingSession::join(SessionConfig::new(&url, "demo").with_user_name("Bo"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    bo.send_chat("hi all").unwrap();

    let chat = wait_for(&mut ana_events, |e| matches!(e, SessionEvent::Chat { .. }))
        .await
        .unwrap();
    assert_eq!(
        chat,
        SessionEvent::Chat {
            message: "hi all".to_owned(),
            sender_id: bo.local_id().clone(),
            user_name: Some("Bo".to_owned()),
        }
    );
}
