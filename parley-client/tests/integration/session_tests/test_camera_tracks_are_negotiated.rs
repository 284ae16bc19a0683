use std::sync::Arc;
use std::time::Duration;

use parley_client::{MeetingSession, NegotiationEvent, SessionConfig, SessionEvent};
use parley_core::ConnectionId;
use webrtc::api::media_engine::MIME_TYPE_VP8;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_rtp::TrackLocalStaticRTP;

use crate::integration::{init_tracing, spawn_relay};
use crate::utils::wait_for;

fn camera(stream: &str) -> Arc<dyn TrackLocal + Send + Sync> {
    Arc::new(TrackLocalStaticRTP::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            clock_rate: 90000,
            ..Default::default()
        },
        "camera".to_owned(),
        stream.to_owned(),
    ))
}

fn established_with(remote: ConnectionId) -> impl FnMut(&SessionEvent) -> bool {
    move |event| {
        matches!(
            event,
            SessionEvent::Negotiation {
                event: NegotiationEvent::LinkEstablished { remote: r, .. },
                ..
            } if *r == remote
        )
    }
}

#[tokio::test]
async fn test_camera_tracks_are_negotiated() {
    init_tracing();
    let url = spawn_relay().await;

    let ana_config = SessionConfig::new(&url, "demo")
        .with_user_name("Ana")
        .with_camera_track(camera("ana"));
    let (ana, mut ana_events) = MeetingSession::join(ana_config).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let bo_config = SessionConfig::new(&url, "demo")
        .with_user_name("Bo")
        .with_camera_track(camera("bo"));
    let (bo, mut bo_events) = MeetingSession::join(bo_config).await.unwrap();

    wait_for(&mut ana_events, established_with(bo.local_id().clone()))
        .await
        .unwrap();
    wait_for(&mut bo_events, established_with(ana.local_id().clone()))
        .await
        .unwrap();

    bo.leave().await;
    ana.leave().await;
}
