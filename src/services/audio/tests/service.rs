use std::{path::Path, sync::Arc, time::Duration};

use futures::{Stream, StreamExt};

use crate::services::audio::{
    error::AudioError,
    port::{
        PortError, PortEvent, SinkReport,
        fake::{FakePort, PortCall},
    },
    service::AudioService,
    state::AudioStatus,
    volume,
};

async fn ready_service(dir: &Path) -> (AudioService, Arc<FakePort>) {
    let port = Arc::new(FakePort::handset());
    let service = AudioService::new(dir);
    service.attach_port(port.clone()).await.unwrap();
    port.clear_calls();
    (service, port)
}

async fn next_status(updates: &mut (impl Stream<Item = AudioStatus> + Unpin)) -> AudioStatus {
    tokio::time::timeout(Duration::from_secs(1), updates.next())
        .await
        .expect("status notification")
        .expect("open stream")
}

#[tokio::test]
async fn operations_before_attach_are_not_ready() {
    let dir = tempfile::tempdir().unwrap();
    let service = AudioService::new(dir.path());

    assert_eq!(service.status(), Err(AudioError::NotReady));
    assert_eq!(service.set_volume(10).await, Err(AudioError::NotReady));
    assert_eq!(service.set_mute(true).await, Err(AudioError::NotReady));
    assert_eq!(service.volume_up().await, Err(AudioError::NotReady));
    assert_eq!(service.volume_down().await, Err(AudioError::NotReady));
    assert_eq!(service.set_call_mode(true, false).await, Err(AudioError::NotReady));
    assert_eq!(service.set_mic_mute(true).await, Err(AudioError::NotReady));
    assert_eq!(
        service.play_feedback("click", None, true).await,
        Err(AudioError::NotReady)
    );
}

#[tokio::test]
async fn early_subscriber_first_sees_the_primed_status() {
    let dir = tempfile::tempdir().unwrap();
    let service = AudioService::new(dir.path());
    let mut updates = Box::pin(service.subscribe());

    service
        .attach_port(Arc::new(FakePort::handset()))
        .await
        .unwrap();

    let status = next_status(&mut updates).await;
    assert_eq!(status.volume, 50);
    assert!(!status.mute);
}

#[tokio::test]
async fn attach_reads_default_sink() {
    let dir = tempfile::tempdir().unwrap();
    let (service, _port) = ready_service(dir.path()).await;

    let state = service.state().snapshot();
    assert_eq!(state.default_sink_name.as_deref(), Some("sink.primary"));
    assert_eq!(service.status().unwrap().volume, 50);
}

#[tokio::test]
async fn set_volume_to_current_value_is_a_noop_error() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;

    let err = service.set_volume(50).await.unwrap_err();

    assert!(matches!(err, AudioError::NoOpRequested(_)));
    assert!(port.calls().is_empty());
}

#[tokio::test]
async fn set_volume_out_of_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;

    for volume in [-1, 101, i32::MAX] {
        let err = service.set_volume(volume).await.unwrap_err();
        assert!(matches!(err, AudioError::Validation { field: "volume", .. }));
    }
    assert!(port.calls().is_empty());
}

#[tokio::test]
async fn set_volume_applies_after_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;
    let mut updates = Box::pin(service.subscribe());

    service.set_volume(70).await.unwrap();

    assert_eq!(
        port.calls(),
        vec![PortCall::SetSinkVolume {
            sink: String::from("sink.primary"),
            volume: volume::percent_to_units(70),
        }]
    );
    assert_eq!(next_status(&mut updates).await.volume, 70);
    assert_eq!(service.state().pending().volume, None);
}

#[tokio::test]
async fn rejected_volume_keeps_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;
    port.fail("set sink volume");

    let err = service.set_volume(70).await.unwrap_err();

    assert!(matches!(err, AudioError::UpstreamFailure(_)));
    assert_eq!(service.status().unwrap().volume, 50);
    assert_eq!(service.state().pending().volume, None);
}

#[tokio::test]
async fn set_mute_to_current_value_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;
    service.set_mute(true).await.unwrap();
    port.clear_calls();
    let mut updates = Box::pin(service.subscribe());

    service.set_mute(true).await.unwrap();
    assert!(port.calls().is_empty());

    service.set_volume(60).await.unwrap();
    let status = next_status(&mut updates).await;
    assert_eq!(status.volume, 60, "no notification for the no-op");
    assert!(status.mute);
}

#[tokio::test]
async fn volume_keys_step_by_eleven() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;

    service.volume_up().await.unwrap();
    assert_eq!(service.status().unwrap().volume, 55);

    service.volume_down().await.unwrap();
    service.volume_down().await.unwrap();
    assert_eq!(service.status().unwrap().volume, 33);
    assert_eq!(port.calls().len(), 3);
}

#[tokio::test]
async fn volume_keys_at_the_limits_do_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;

    service.set_volume(0).await.unwrap();
    port.clear_calls();
    service.volume_down().await.unwrap();
    assert!(port.calls().is_empty());

    service.set_volume(100).await.unwrap();
    port.clear_calls();
    service.volume_up().await.unwrap();
    assert!(port.calls().is_empty());
}

#[tokio::test]
async fn call_mode_updates_state_and_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;
    let mut updates = Box::pin(service.subscribe());

    service.set_call_mode(true, true).await.unwrap();

    let status = next_status(&mut updates).await;
    assert!(status.in_call);
    assert!(status.speaker_mode);
    assert!(!port.mutations().is_empty());
}

#[tokio::test]
async fn repeated_call_mode_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;
    service.set_call_mode(true, false).await.unwrap();
    port.clear_calls();

    service.set_call_mode(true, false).await.unwrap();

    assert!(port.calls().is_empty());
}

#[tokio::test]
async fn failed_cascade_leaves_call_state_alone() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;
    port.set_cards(Vec::new());

    let err = service.set_call_mode(true, false).await.unwrap_err();

    assert!(matches!(err, AudioError::DeviceNotFound(_)));
    assert!(!service.status().unwrap().in_call);
}

#[tokio::test]
async fn mic_mute_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;

    service.set_mic_mute(true).await.unwrap();

    assert!(service.status().unwrap().mic_mute);
    assert!(port.source("source.primary").unwrap().muted);
}

#[tokio::test]
async fn feedback_and_preload_share_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("click.pcm"), [0u8; 32]).unwrap();
    let (service, port) = ready_service(dir.path()).await;

    let cached = service
        .preload(&[String::from("click"), String::from("missing")])
        .await;
    assert_eq!(cached, 1);

    let outcome = service.play_feedback("click", None, true).await.unwrap();
    assert!(!outcome.uploaded);
    assert_eq!(outcome.played_on.as_deref(), Some("sink.primary"));
    assert_eq!(port.uploads(), 1);
}

#[tokio::test]
async fn server_events_update_status() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;
    let mut updates = Box::pin(service.subscribe());

    port.emit(PortEvent::DefaultSinkChanged(SinkReport {
        name: String::from("sink.bluetooth"),
        index: 7,
        volume: volume::percent_to_units(20),
        muted: true,
    }));

    let status = next_status(&mut updates).await;
    assert_eq!(status.volume, 20);
    assert!(status.mute);
    assert_eq!(
        service.state().snapshot().default_sink_name.as_deref(),
        Some("sink.bluetooth")
    );
}

#[tokio::test]
async fn lost_connection_surfaces_as_upstream_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (service, port) = ready_service(dir.path()).await;
    port.disconnect();

    assert_eq!(
        service.set_volume(80).await,
        Err(AudioError::UpstreamFailure(PortError::Disconnected))
    );
    assert_eq!(
        service.set_call_mode(true, false).await,
        Err(AudioError::UpstreamFailure(PortError::Disconnected))
    );
}
