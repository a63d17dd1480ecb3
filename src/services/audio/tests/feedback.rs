use std::{path::Path, sync::Arc};

use crate::services::audio::{
    error::AudioError,
    feedback::{FeedbackPipeline, FeedbackRequest, SampleCache},
    port::{
        FEEDBACK_SAMPLE_FORMAT, MediaRole, PortError,
        fake::{FakePort, PortCall},
    },
    volume::NORM,
};

const CLICK: &[u8] = &[0x01, 0x00, 0xff, 0x7f, 0x00, 0x80, 0x10, 0x00];

fn pipeline(dir: &Path) -> FeedbackPipeline {
    std::fs::write(dir.join("click.pcm"), CLICK).unwrap();
    FeedbackPipeline::new(dir, Arc::new(SampleCache::new()))
}

#[tokio::test]
async fn uploads_once_and_plays_twice() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());
    let port = FakePort::handset();
    let default_sink = Some(String::from("sink.primary"));

    let first = pipeline
        .run(&port, FeedbackRequest::play("click"), default_sink.clone())
        .await
        .unwrap();
    let second = pipeline
        .run(&port, FeedbackRequest::play("click"), default_sink)
        .await
        .unwrap();

    assert!(first.uploaded);
    assert!(!second.uploaded);
    assert_eq!(second.played_on.as_deref(), Some("sink.primary"));
    assert_eq!(port.uploads(), 1);
    assert_eq!(port.plays(), 2);
}

#[tokio::test]
async fn upload_carries_whole_file_in_feedback_format() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());
    let port = FakePort::handset();

    pipeline
        .run(&port, FeedbackRequest::warm_up("click"), None)
        .await
        .unwrap();

    assert_eq!(
        port.calls(),
        vec![PortCall::UploadSample {
            name: String::from("click"),
            format: FEEDBACK_SAMPLE_FORMAT,
            bytes: CLICK.to_vec(),
        }]
    );
    assert!(pipeline.cache().contains("click"));
}

#[tokio::test]
async fn playback_uses_event_role_at_normal_volume() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());
    let port = FakePort::handset();

    pipeline
        .run(
            &port,
            FeedbackRequest::play("click").on_sink("sink.bluetooth"),
            Some(String::from("sink.primary")),
        )
        .await
        .unwrap();

    assert_eq!(
        port.calls().last(),
        Some(&PortCall::PlaySample {
            name: String::from("click"),
            sink: String::from("sink.bluetooth"),
            volume: NORM,
            role: MediaRole::Event,
        })
    );
}

#[tokio::test]
async fn unknown_default_sink_is_asked_from_the_server() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());
    let port = FakePort::handset();

    let outcome = pipeline
        .run(&port, FeedbackRequest::play("click"), None)
        .await
        .unwrap();

    assert_eq!(outcome.played_on.as_deref(), Some("sink.primary"));
    assert!(port.calls().contains(&PortCall::DefaultSinkName));
}

#[tokio::test]
async fn no_sink_at_all_fails_after_upload() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());
    let port = FakePort::handset();
    port.set_default_sink(None);

    let err = pipeline
        .run(&port, FeedbackRequest::play("click"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AudioError::DeviceNotFound(_)));
    assert_eq!(port.plays(), 0);
    assert!(pipeline.cache().contains("click"));
}

#[tokio::test]
async fn missing_sample_file_is_resource_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());
    let port = FakePort::handset();

    let err = pipeline
        .run(&port, FeedbackRequest::play("ring"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AudioError::Resource { .. }));
    assert!(port.calls().is_empty());
    assert!(!pipeline.cache().contains("ring"));
}

#[tokio::test]
async fn rejected_upload_is_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());
    let port = FakePort::handset();
    port.fail("upload sample");

    let err = pipeline
        .run(&port, FeedbackRequest::play("click"), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AudioError::UpstreamFailure(PortError::OperationFailed { .. })
    ));
    assert!(pipeline.cache().is_empty());
    assert_eq!(port.plays(), 0);
}

#[tokio::test]
async fn unsafe_sample_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path());
    let port = FakePort::handset();

    for name in ["", "../click", "sub/click", ".click"] {
        let err = pipeline
            .run(&port, FeedbackRequest::play(name), None)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AudioError::Validation { field: "name", .. }),
            "{name:?} gave {err:?}"
        );
    }
    assert!(port.calls().is_empty());
}
